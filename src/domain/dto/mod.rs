//! # Data Transfer Objects (DTO) Module
//!
//! HTTP 요청/응답 계약입니다. 요청 DTO는 `serde` 역직렬화와 `validator` 검증을,
//! 응답 DTO는 엔티티를 외부 표현(hex ID, RFC 3339 시각)으로 바꾸는 `From` 구현을 가집니다.
//!
//! ```text
//! dto/
//! ├── common.rs       # 페이지네이션, 메시지 응답
//! ├── users/          # 가입, 로그인, 계정 관리
//! ├── tokens/         # 토큰 갱신 응답
//! ├── books/          # 도서 CRUD, CSV 일괄 등록 결과
//! ├── copies/         # 사본 추가, 상태 변경
//! ├── circulation/    # 대출/반납/연장/분실
//! ├── fines/          # 연체료 목록, 본인 요약
//! ├── audit/          # 감사 로그 조회
//! ├── settings/       # 운영 정책
//! └── feedback/       # 피드백 등록/답변
//! ```

pub mod audit;
pub mod books;
pub mod circulation;
pub mod common;
pub mod copies;
pub mod feedback;
pub mod fines;
pub mod settings;
pub mod tokens;
pub mod users;

pub use common::*;
