pub mod book_repo;
pub mod copy_repo;

pub use book_repo::BookRepository;
pub use copy_repo::BookCopyRepository;
