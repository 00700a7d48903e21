//! JWT 인증 설정

use std::env;
use super::data_config::env_or;

/// HS256 JWT 발급/검증 설정
pub struct JwtConfig;

impl JwtConfig {
    pub fn secret() -> String {
        env::var("JWT_SECRET")
            .unwrap_or_else(|_| {
                log::warn!("JWT_SECRET not set, using default (not secure for production!)");
                "your-secret-key".to_string()
            })
    }

    /// 액세스 토큰 유효 시간 (기본 24시간)
    pub fn expiration_hours() -> i64 {
        env_or("JWT_EXPIRATION_HOURS", 24)
    }

    /// 리프레시 토큰 유효 기간 (기본 7일)
    pub fn refresh_expiration_days() -> i64 {
        env_or("JWT_REFRESH_EXPIRATION_DAYS", 7)
    }

    pub fn issuer() -> String {
        env::var("JWT_ISSUER").unwrap_or_else(|_| "library_service".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_defaults() {
        if env::var("JWT_EXPIRATION_HOURS").is_err() {
            assert_eq!(JwtConfig::expiration_hours(), 24);
        }
        if env::var("JWT_REFRESH_EXPIRATION_DAYS").is_err() {
            assert_eq!(JwtConfig::refresh_expiration_days(), 7);
        }
    }
}
