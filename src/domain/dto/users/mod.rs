//! # User Data Transfer Objects Module
//!
//! ```text
//! users/
//! ├── request/
//! │   ├── create_user.rs    # 학생 가입, 관리자 계정 생성
//! │   └── auth_request.rs   # 로그인, 토큰 갱신, 상태 변경, 목록 쿼리
//! └── response/
//!     └── user_response.rs  # 사용자 정보, 로그인 응답
//! ```

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
