//! 캐시 계층
//!
//! Redis 기반 세션 저장소와 설정 캐시를 제공합니다.

pub mod redis;
