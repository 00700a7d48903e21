//! 세션 토큰 저장소 (Redis)
//!
//! - **Refresh Token 관리**: 사용자별 리프레시 토큰 해시 저장 및 검증
//! - **Access Token Blacklist**: 로그아웃된 토큰의 무효화 관리
//! - **TTL 자동 관리**: Redis TTL을 통한 자동 만료 처리

pub mod token_repository;

pub use token_repository::{BlacklistedTokenInfo, RefreshTokenInfo, TokenRepository, hash_token};
