//! 사용자 관리 서비스 모듈
//!
//! ```rust,ignore
//! use crate::services::users::UserService;
//!
//! let user_service = UserService::instance();
//! let user = user_service.get_user("507f1f77bcf86cd799439011").await?;
//! ```

pub mod user_service;

pub use user_service::UserService;
