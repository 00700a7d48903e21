pub mod book;
pub mod book_copy;

pub use book::{Book, is_valid_isbn, normalize_isbn, parse_isbn};
pub use book_copy::{BookCopy, CopyStatus, counter_delta, generate_barcode};
