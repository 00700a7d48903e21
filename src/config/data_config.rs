//! 실행 환경, 서버, 저장소 설정
//!
//! 모든 값은 환경 변수에서 읽으며, 값이 없거나 파싱에 실패하면 기본값을 사용합니다.

use std::env;
use std::str::FromStr;

/// 환경 변수를 파싱하고 실패 시 기본값 사용
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경 변수 기준 현재 환경 (미설정 시 Production)
    pub fn current() -> Self {
        Self::from_str(&env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string()))
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// bcrypt 해싱 비용 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// `BCRYPT_COST`(4-15)가 있으면 사용하고, 없으면 환경별 기본값
    pub fn bcrypt_cost() -> u32 {
        match env::var("BCRYPT_COST").ok().and_then(|v| v.parse::<u32>().ok()) {
            Some(cost) if (4..=15).contains(&cost) => cost,
            _ => Self::bcrypt_cost_for_env(&Environment::current()),
        }
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// HTTP 서버 설정
pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env_or("PORT", 8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string())
    }

    pub fn bind_address() -> String {
        format!("{}:{}", Self::host(), Self::port())
    }

    pub fn workers() -> usize {
        env_or("SERVER_WORKERS", 4).max(1)
    }
}

/// MongoDB / Redis 연결 설정
pub struct DataStoreConfig;

impl DataStoreConfig {
    pub fn mongodb_uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "library_dev".to_string())
    }

    pub fn redis_url() -> String {
        env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }
}

/// actix-governor 토큰 버킷 설정
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        Self {
            per_second: env_or("RATE_LIMIT_PER_SECOND", 100u64).max(1),
            burst_size: env_or("RATE_LIMIT_BURST_SIZE", 200u32).max(1),
        }
    }
}

/// CSV 일괄 등록 제한
pub struct UploadConfig;

impl UploadConfig {
    pub const DEFAULT_MAX_BYTES: usize = 2 * 1024 * 1024;
    pub const DEFAULT_MAX_ROWS: usize = 5000;

    pub fn csv_max_bytes() -> usize {
        env_or("CSV_MAX_BYTES", Self::DEFAULT_MAX_BYTES)
    }

    pub fn csv_max_rows() -> usize {
        env_or("CSV_MAX_ROWS", Self::DEFAULT_MAX_ROWS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_from_string() {
        assert_eq!(Environment::from_str("development"), Environment::Development);
        assert_eq!(Environment::from_str("DEV"), Environment::Development);
        assert_eq!(Environment::from_str("test"), Environment::Test);
        assert_eq!(Environment::from_str("stage"), Environment::Staging);
        assert_eq!(Environment::from_str("unknown"), Environment::Production);
    }

    #[test]
    fn test_bcrypt_cost_for_each_environment() {
        assert_eq!(PasswordConfig::bcrypt_cost_for_env(&Environment::Development), 4);
        assert_eq!(PasswordConfig::bcrypt_cost_for_env(&Environment::Test), 4);
        assert_eq!(PasswordConfig::bcrypt_cost_for_env(&Environment::Staging), 10);
        assert_eq!(PasswordConfig::bcrypt_cost_for_env(&Environment::Production), 12);
    }

    #[test]
    fn test_server_config_defaults() {
        if env::var("PORT").is_err() {
            assert_eq!(ServerConfig::port(), 8080);
        }
        if env::var("HOST").is_err() {
            assert_eq!(ServerConfig::host(), "0.0.0.0");
        }
        if env::var("SERVER_WORKERS").is_err() {
            assert_eq!(ServerConfig::workers(), 4);
        }
    }

    #[test]
    fn test_upload_limits_defaults() {
        if env::var("CSV_MAX_BYTES").is_err() {
            assert_eq!(UploadConfig::csv_max_bytes(), 2 * 1024 * 1024);
        }
        if env::var("CSV_MAX_ROWS").is_err() {
            assert_eq!(UploadConfig::csv_max_rows(), 5000);
        }
    }

    #[test]
    fn test_env_or_falls_back_on_unparsable_value() {
        assert_eq!(env_or("LIBRARY_TEST_SURELY_UNSET_KEY", 42u32), 42);
    }
}
