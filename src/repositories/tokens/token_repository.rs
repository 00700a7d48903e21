//! # 세션 토큰 리포지토리
//!
//! Redis에 리프레시 토큰과 액세스 토큰 블랙리스트를 저장합니다.
//! 토큰 원문 대신 SHA-256 해시를 보관합니다.
//!
//! | 키 | 값 | TTL |
//! |----|----|-----|
//! | `refresh_token:{user_id}` | [`RefreshTokenInfo`] | 리프레시 토큰 만료까지 |
//! | `blacklist:{sha256(access_token)}` | [`BlacklistedTokenInfo`] | 액세스 토큰 잔여 수명 |

use std::sync::Arc;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use singleton_macro::repository;
use crate::caching::redis::RedisClient;
use crate::core::errors::AppError;
use crate::core::registry::Repository;

/// 블랙리스트/세션 항목의 최소 TTL (초)
const MIN_TTL_SECONDS: u64 = 60;

#[repository(name = "token", collection = "tokens")]
pub struct TokenRepository {
    redis: Arc<RedisClient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenInfo {
    pub user_id: String,
    pub token_hash: String,
    pub login_at: i64,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_ip: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistedTokenInfo {
    pub jti: String,
    pub user_id: String,
    pub blacklisted_at: i64,
    pub original_exp: i64,
}

/// 토큰 원문의 SHA-256 hex
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn refresh_key(user_id: &str) -> String {
    format!("refresh_token:{}", user_id)
}

fn blacklist_key(token: &str) -> String {
    format!("blacklist:{}", hash_token(token))
}

impl TokenRepository {
    /// 사용자당 하나의 리프레시 토큰을 저장합니다. 다시 로그인하면 이전 토큰은 무효가 됩니다.
    pub async fn store_refresh_token(
        &self,
        user_id: &str,
        refresh_token: &str,
        ttl_seconds: u64,
        login_ip: Option<String>,
    ) -> Result<(), AppError> {
        let safe_ttl = if ttl_seconds < MIN_TTL_SECONDS {
            log::warn!("TTL이 너무 작습니다 ({}초). 최소값 {}초로 설정합니다.", ttl_seconds, MIN_TTL_SECONDS);
            MIN_TTL_SECONDS
        } else {
            ttl_seconds
        };

        let now = Utc::now().timestamp();
        let info = RefreshTokenInfo {
            user_id: user_id.to_string(),
            token_hash: hash_token(refresh_token),
            login_at: now,
            expires_at: now + safe_ttl as i64,
            login_ip,
        };

        self.redis
            .set_with_expiry(&refresh_key(user_id), &info, safe_ttl as usize)
            .await?;

        log::debug!("Refresh token 저장 완료 - user_id: {}, ttl: {}초", user_id, safe_ttl);
        Ok(())
    }

    /// 저장된 리프레시 토큰과 일치하고 만료되지 않았으면 세션 정보를 반환합니다.
    pub async fn find_refresh_token(
        &self,
        user_id: &str,
        refresh_token: &str,
    ) -> Result<Option<RefreshTokenInfo>, AppError> {
        let key = refresh_key(user_id);

        let Some(info) = self.redis.get::<RefreshTokenInfo>(&key).await? else {
            return Ok(None);
        };

        if info.token_hash != hash_token(refresh_token) {
            return Ok(None);
        }

        if info.expires_at <= Utc::now().timestamp() {
            self.redis.del(&key).await?;
            return Ok(None);
        }

        Ok(Some(info))
    }

    pub async fn delete_refresh_token(&self, user_id: &str) -> Result<(), AppError> {
        self.redis.del(&refresh_key(user_id)).await?;
        Ok(())
    }

    /// 액세스 토큰을 남은 수명 동안 블랙리스트에 올립니다.
    pub async fn blacklist_token(
        &self,
        access_token: &str,
        jti: &str,
        user_id: &str,
        original_exp: i64,
    ) -> Result<(), AppError> {
        let remaining = (original_exp - Utc::now().timestamp()).max(0) as u64;
        if remaining == 0 {
            return Ok(());
        }

        let info = BlacklistedTokenInfo {
            jti: jti.to_string(),
            user_id: user_id.to_string(),
            blacklisted_at: Utc::now().timestamp(),
            original_exp,
        };

        self.redis
            .set_with_expiry(&blacklist_key(access_token), &info, remaining.max(MIN_TTL_SECONDS) as usize)
            .await?;

        log::info!("토큰이 블랙리스트에 추가됨 - JTI: {}, 사용자: {}, TTL: {}초", jti, user_id, remaining);
        Ok(())
    }

    pub async fn is_token_blacklisted(&self, access_token: &str) -> Result<bool, AppError> {
        Ok(self.redis.exists(&blacklist_key(access_token)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("header.payload.signature");

        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("header.payload.signature"));
        assert_ne!(hash, hash_token("header.payload.other"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_keys_do_not_contain_raw_token() {
        let key = blacklist_key("secret-token");
        assert!(key.starts_with("blacklist:"));
        assert!(!key.contains("secret-token"));
        assert_eq!(refresh_key("abc"), "refresh_token:abc");
    }
}
