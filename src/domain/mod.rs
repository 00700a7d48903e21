//! # Domain Layer Module
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── entities  - MongoDB 문서 엔티티 (Book, BookCopy, Transaction, ...)
//! ├── dto       - HTTP 요청/응답 계약
//! └── models    - 인증 모델, 연체료 계산, CSV 파싱
//!      │
//!      ▼
//! Application Layer (services)
//!      │
//!      ▼
//! Infrastructure Layer (repositories, db, caching)
//! ```
//!
//! 엔티티는 저장 형식(`ObjectId`, `bson::DateTime`)을 그대로 유지하고,
//! 응답 DTO는 hex 문자열 ID와 RFC 3339 시각으로 변환해 노출합니다.

pub mod dto;
pub mod entities;
pub mod models;
