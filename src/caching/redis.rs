//! # Redis 클라이언트
//!
//! 세션(리프레시 토큰), 액세스 토큰 블랙리스트, 시스템 설정 캐시에 사용하는
//! Redis 래퍼입니다. 값은 JSON 문자열로 직렬화되어 저장됩니다.
//!
//! | 키 패턴 | 용도 | TTL |
//! |---------|------|-----|
//! | `refresh_token:{user_id}` | 리프레시 토큰 해시 | 리프레시 만료 기간 |
//! | `blacklist:{token_hash}` | 로그아웃된 액세스 토큰 | 토큰 잔여 수명 |
//! | `system_config:library` | 운영 정책 캐시 | 5분 |

use redis::{AsyncCommands, Client};
use serde::{Serialize, de::DeserializeOwned};
use crate::config::DataStoreConfig;

#[derive(Clone)]
pub struct RedisClient {
    client: Client,
}

fn serde_failure(context: &'static str, error: serde_json::Error) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, context, error.to_string()))
}

impl RedisClient {
    /// `REDIS_URL`로 연결하고 `PING`으로 서버 가용성을 확인합니다.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let client = Client::open(DataStoreConfig::redis_url())?;

        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<()>(&mut conn).await?;

        log::info!("✅ Redis 연결 성공");

        Ok(Self { client })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|json| serde_json::from_str(&json).map_err(|e| serde_failure("Deserialization failed", e)))
            .transpose()
    }

    pub async fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, seconds: usize) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(value).map_err(|e| serde_failure("Serialization failed", e))?;
        conn.set_ex(key, json, seconds as u64).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.exists(key).await
    }

    pub async fn del(&self, key: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(key).await
    }

    /// 여러 키를 한 번에 삭제합니다. 빈 목록이면 연결 없이 바로 성공합니다.
    ///
    /// 리포지토리 매크로가 생성하는 패턴 무효화(`invalidate_pattern`)가 사용합니다.
    pub async fn del_multiple(&self, keys: &[String]) -> Result<(), redis::RedisError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del(keys).await
    }

    /// 패턴과 일치하는 키 목록 (`KEYS`)
    ///
    /// 블로킹 명령이므로 `user:*`처럼 범위가 좁은 패턴에만 사용합니다.
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.keys(pattern).await
    }
}

impl Default for RedisClient {
    /// 연결 확인 없이 클라이언트만 생성합니다. URL 형식이 잘못되면 패닉합니다.
    fn default() -> Self {
        let client = Client::open(DataStoreConfig::redis_url())
            .expect("Failed to create Redis client with default configuration");

        Self { client }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_del_multiple_with_no_keys_skips_connection() {
        let client = RedisClient {
            client: Client::open("redis://127.0.0.1:1").unwrap(),
        };

        assert!(client.del_multiple(&[]).await.is_ok());
        assert!(client.keys("user:*").await.is_err());
    }
}
