//! 도서관 관리 백엔드
//!
//! 도서 카탈로그, 사본 관리, 대출/반납, 연체료, 감사 로그를 제공하는 REST API 서비스입니다.
//! 싱글톤 매크로 기반 의존성 주입으로 저장소와 서비스를 구성합니다.
//!
//! # Features
//!
//! - **카탈로그**: ISBN 정규화/중복 검사, 검색, CSV 일괄 등록
//! - **사본 관리**: 바코드 발급, 상태 전이 규칙, 도서별 대출 가능 수 유지
//! - **대출/반납**: 대출 한도, 미납 연체료 차단, 연장, 분실 처리
//! - **연체료**: UTC 날짜 기준 연체 일수 계산, 납부 처리
//! - **JWT 인증**: 액세스/리프레시 토큰, Redis 세션과 블랙리스트, 역할 기반 접근 제어
//! - **감사 로그**: 모든 변경 작업의 수행자/대상/내용 기록
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← REST API 엔드포인트 + AuthMiddleware
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 비즈니스 로직
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← 데이터 액세스 (조건부 원자적 갱신)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MongoDB + Redis │ ← 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use library_service_backend::services::circulation::CirculationService;
//!
//! let circulation = CirculationService::instance();
//! let loan = circulation.issue_book(request, &actor).await?;
//! ```

pub mod caching;
pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
