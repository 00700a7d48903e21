//! # HTTP Request Handlers Module
//!
//! ```text
//! Handlers (이 모듈)  ← 요청 추출, 입력 검증, 서비스 호출, JSON 응답
//!     │
//!     ▼
//! Services            ← 비즈니스 규칙
//!     │
//!     ▼
//! Repositories        ← MongoDB / Redis
//! ```
//!
//! 모든 핸들러는 `Result<HttpResponse, AppError>`를 반환하며, 오류는
//! `AppError`의 `ResponseError` 구현을 통해 `{"error": "..."}` 본문과 상태 코드로 변환됩니다.
//!
//! ## 공통 패턴
//!
//! ```rust,ignore
//! #[post("", wrap = "AuthMiddleware::staff()")]
//! pub async fn create_book(
//!     actor: Actor,
//!     payload: web::Json<CreateBookRequest>,
//! ) -> Result<HttpResponse, AppError> {
//!     payload.validate()
//!         .map_err(|e| AppError::ValidationError(e.to_string()))?;
//!
//!     let service = BookService::instance();
//!     let book = service.create_book(payload.into_inner(), &actor).await?;
//!     Ok(HttpResponse::Created().json(book))
//! }
//! ```
//!
//! 변경 작업은 감사 로그를 위해 `Actor`(사용자 + 요청 IP)를, 조회 작업은
//! `AuthenticatedUser`를 추출자로 받습니다.
//!
//! ## 모듈 구성
//!
//! - **`auth`**: 가입, 로그인, 토큰 갱신, 로그아웃, 내 정보
//! - **`users`**: 관리자 계정 관리
//! - **`books`**: 카탈로그, CSV 일괄 등록, 사본
//! - **`circulation`**: 대출, 반납, 연장, 분실, 대출 기록
//! - **`fines`**: 연체료 조회/납부
//! - **`admin`**: 운영 정책, 감사 로그
//! - **`feedback`**: 이용자 피드백

pub mod admin;
pub mod auth;
pub mod books;
pub mod circulation;
pub mod feedback;
pub mod fines;
pub mod users;
