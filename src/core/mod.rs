//! # Core Framework Module
//!
//! 도서관 백엔드의 공통 기반 기능입니다.
//!
//! - [`registry`]: `ServiceLocator` 기반 싱글톤 의존성 주입 컨테이너.
//!   `#[service]` / `#[repository]` 매크로가 생성한 등록 정보를 `inventory`로 수집합니다.
//! - [`errors`]: 전역 `AppError`와 HTTP 상태 코드 매핑.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use singleton_macro::{repository, service};
//!
//! #[repository(name = "book", collection = "books")]
//! pub struct BookRepository {
//!     db: Arc<Database>,
//!     redis: Arc<RedisClient>,
//! }
//!
//! #[service(name = "book")]
//! pub struct BookService {
//!     book_repo: Arc<BookRepository>,
//! }
//!
//! let books = BookService::instance();
//! ```

pub mod errors;
pub mod registry;

pub use errors::*;
pub use registry::*;
