//! # 운영 정책 리포지토리
//!
//! `system_config` 컬렉션의 `key = "library"` 단일 문서를 관리합니다.
//! 읽기 빈도가 높아(모든 대출/반납) Redis에 5분간 캐싱하고, 수정 시 캐시를 삭제합니다.

use std::sync::Arc;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use singleton_macro::repository;
use crate::{
    caching::redis::RedisClient,
    core::{errors::AppError, registry::Repository},
    db::Database,
    domain::entities::settings::SystemConfig,
    repositories::is_duplicate_key,
};

/// 캐시 키: `system_config:library`
pub const CONFIG_CACHE_KEY: &str = "system_config:library";
const CONFIG_CACHE_TTL: usize = 300;

#[repository(name = "systemconfig", collection = "system_config")]
pub struct SystemConfigRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl SystemConfigRepository {
    /// 현재 운영 정책 (캐시 우선)
    pub async fn find_library(&self) -> Result<Option<SystemConfig>, AppError> {
        if let Ok(Some(cached)) = self.redis.get::<SystemConfig>(CONFIG_CACHE_KEY).await {
            return Ok(Some(cached));
        }

        let config = self.collection::<SystemConfig>()
            .find_one(doc! { "key": SystemConfig::LIBRARY_KEY })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Some(ref config) = config {
            let _ = self.redis
                .set_with_expiry(CONFIG_CACHE_KEY, config, CONFIG_CACHE_TTL)
                .await;
        }

        Ok(config)
    }

    /// 문서가 없을 때만 시드 값을 저장합니다. 다른 인스턴스가 먼저 저장한 경우는 무시합니다.
    pub async fn insert_if_absent(&self, config: &SystemConfig) -> Result<(), AppError> {
        match self.collection::<SystemConfig>().insert_one(config).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Ok(()),
            Err(e) => Err(AppError::DatabaseError(e.to_string())),
        }
    }

    pub async fn update(&self, update_doc: Document) -> Result<Option<SystemConfig>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self.collection::<SystemConfig>()
            .find_one_and_update(
                doc! { "key": SystemConfig::LIBRARY_KEY },
                doc! { "$set": update_doc },
            )
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Err(e) = self.redis.del(CONFIG_CACHE_KEY).await {
            log::warn!("운영 정책 캐시 삭제 실패: {}", e);
        }

        Ok(updated)
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let key_index = IndexModel::builder()
            .keys(doc! { "key": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("key_unique".to_string())
                .build())
            .build();

        self.collection::<SystemConfig>()
            .create_index(key_index)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
