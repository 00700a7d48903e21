//! 인증 및 세션 서비스 모듈
//!
//! # Features
//!
//! - JWT 액세스/리프레시 토큰 발급과 검증 ([`TokenService`])
//! - 로그인, 토큰 갱신, 로그아웃 세션 흐름 ([`SessionService`])
//!
//! # Security
//!
//! - HMAC-SHA256 토큰 서명
//! - 리프레시 토큰은 원문 대신 SHA-256 해시로 저장
//! - 로그아웃된 액세스 토큰은 남은 수명 동안 블랙리스트 유지
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::auth::{SessionService, TokenService};
//!
//! let token_service = TokenService::instance();
//! let tokens = token_service.generate_token_pair(&user)?;
//! ```

pub mod session_service;
pub mod token_service;

pub use session_service::SessionService;
pub use token_service::TokenService;
