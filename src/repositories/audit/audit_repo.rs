//! 감사 로그 리포지토리 (`audit_logs`, 추가 전용)

use std::sync::Arc;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    IndexModel,
};
use singleton_macro::repository;
use crate::{
    caching::redis::RedisClient,
    core::{errors::AppError, registry::Repository},
    db::Database,
    domain::{dto::Pagination, entities::audit::AuditLog},
    repositories::find_paged,
};

#[repository(name = "auditlog", collection = "audit_logs")]
pub struct AuditLogRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl AuditLogRepository {
    pub async fn insert(&self, log: &AuditLog) -> Result<(), AppError> {
        self.collection::<AuditLog>()
            .insert_one(log)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// 최신순 목록
    pub async fn find_page(&self, filter: Document, pagination: Pagination) -> Result<(Vec<AuditLog>, u64), AppError> {
        find_paged(
            &self.collection::<AuditLog>(),
            filter,
            doc! { "created_at": -1, "_id": -1 },
            pagination,
        )
        .await
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<AuditLog>();

        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        let actor_index = IndexModel::builder()
            .keys(doc! { "actor_id": 1, "created_at": -1 })
            .options(IndexOptions::builder()
                .name("actor_created_at".to_string())
                .build())
            .build();

        let entity_index = IndexModel::builder()
            .keys(doc! { "entity_type": 1, "entity_id": 1 })
            .options(IndexOptions::builder()
                .name("entity".to_string())
                .build())
            .build();

        collection
            .create_indexes([created_at_index, actor_index, entity_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
