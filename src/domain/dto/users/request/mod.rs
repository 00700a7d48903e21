//! 사용자/인증 요청 DTO
//!
//! 검증 실패 시 `validator::ValidationErrors`는 핸들러에서 `AppError::ValidationError`(400)로 변환됩니다.

pub mod auth_request;
pub mod create_user;

pub use auth_request::{LoginRequest, RefreshTokenRequest, UpdateUserStatusRequest, UserListQuery};
pub use create_user::{CreateUserRequest, RegisterRequest};
