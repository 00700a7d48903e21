//! # Domain Models Module
//!
//! 영속되지 않는 도메인 모델과 순수 비즈니스 규칙입니다.
//!
//! ## Entities vs Models
//!
//! - `entities/`: MongoDB 문서로 저장되는 객체 (`Book`, `Transaction` 등)
//! - `models/` (이 모듈): 요청 처리 중에만 존재하는 값 객체와 계산 로직
//!
//! ## 구성
//!
//! - [`auth`]: 인증된 사용자(`AuthenticatedUser`), 미들웨어 모드와 역할 요구사항
//! - [`token`]: JWT 클레임과 토큰 쌍
//! - [`fines`]: 연체 일수/연체료 계산 (DB 접근 없는 순수 함수)
//! - [`book_import`]: 도서 CSV 파싱과 행 단위 검증

pub mod auth;
pub mod book_import;
pub mod fines;
pub mod token;

pub use auth::*;
pub use token::*;
