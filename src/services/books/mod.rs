//! 도서 카탈로그, 사본, CSV 일괄 등록 서비스

pub mod book_service;
pub mod copy_service;
pub mod import_service;

pub use book_service::BookService;
pub use copy_service::CopyService;
pub use import_service::BookImportService;
