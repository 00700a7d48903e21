//! # Domain Entities Module
//!
//! MongoDB 문서와 1:1로 매핑되는 영속 엔티티입니다.
//!
//! | 엔티티 | 컬렉션 |
//! |--------|--------|
//! | [`users::User`] | `users` |
//! | [`books::Book`] | `books` |
//! | [`books::BookCopy`] | `book_copies` |
//! | [`circulation::Transaction`] | `transactions` |
//! | [`audit::AuditLog`] | `audit_logs` |
//! | [`settings::SystemConfig`] | `system_config` |
//! | [`feedback::Feedback`] | `feedback` |
//!
//! 모든 엔티티는 `_id`를 `Option<ObjectId>`로 가지며(삽입 전 `None`),
//! 시각은 `bson::DateTime`, 문서 간 참조는 `ObjectId`로 저장합니다.
//! 상태 열거형은 소문자 문자열로 직렬화됩니다.

pub mod audit;
pub mod books;
pub mod circulation;
pub mod feedback;
pub mod settings;
pub mod users;

pub use audit::*;
pub use books::*;
pub use circulation::*;
pub use feedback::*;
pub use settings::*;
pub use users::*;
