//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! `#[service]` 매크로로 싱글톤 등록되며, 의존하는 저장소와 서비스는
//! `ServiceLocator`를 통해 자동 주입됩니다.
//!
//! ```text
//! auth         로그인, 토큰 발급/갱신, 로그아웃
//! users        가입, 계정 생성, 활성 상태 관리
//! books        카탈로그, 사본, CSV 일괄 등록
//! circulation  대출, 반납, 연장, 분실, 연체료
//! settings     운영 정책
//! audit        감사 로그 기록/조회
//! feedback     이용자 피드백
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::services::circulation::CirculationService;
//!
//! let circulation = CirculationService::instance();
//! let loan = circulation.issue_book(request, &actor).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod books;
pub mod circulation;
pub mod feedback;
pub mod settings;
pub mod users;
