//! 미들웨어 모듈
//!
//! ### 인증 미들웨어 (AuthMiddleware)
//! - Bearer 액세스 토큰 추출과 검증
//! - 로그아웃된 토큰(블랙리스트) 거부
//! - 역할 기반 접근 제어 (401/403)
//! - 사용자 정보를 request extension에 저장
//!
//! ```rust,ignore
//! App::new()
//!     .service(
//!         web::scope("/api/v1/circulation")
//!             .wrap(AuthMiddleware::required_with_roles(vec!["admin", "librarian"]))
//!             .service(circulation::issue_book)
//!     )
//! ```

pub mod auth_middleware;
mod auth_inner;

pub use auth_middleware::AuthMiddleware;
