//! 공통 유틸리티
//!
//! - [`string_utils`]: 입력 문자열 정리, ObjectId 파싱, 정규식 이스케이프
//! - [`time`]: BSON ↔ chrono 날짜 변환
//! - [`request`]: 클라이언트 IP 추출
//! - [`display_terminal`]: 시작 단계 콘솔 출력

pub mod display_terminal;
pub mod request;
pub mod string_utils;
pub mod time;
