//! 감사 로그 서비스
//!
//! 기록 실패는 요청을 실패시키지 않고 로그로만 남깁니다.

use std::sync::Arc;
use mongodb::bson::{doc, Document};
use serde_json::Value;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            audit::{AuditLogQuery, AuditLogResponse},
            PagedResponse, Pagination,
        },
        entities::audit::{AuditAction, AuditLog, EntityType},
        models::auth::Actor,
    },
    repositories::audit::AuditLogRepository,
    utils::{string_utils::parse_object_id, time},
};

#[service(name = "audit")]
pub struct AuditService {
    audit_repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Option<String>,
        details: Option<Value>,
    ) {
        let entry = AuditLog {
            id: None,
            actor_id: actor.id,
            action,
            entity_type,
            entity_id,
            details,
            ip_address: actor.ip_address.clone(),
            created_at: time::now(),
        };

        if let Err(e) = self.audit_repo.insert(&entry).await {
            log::error!(
                "감사 로그 기록 실패 - action: {}, actor: {}, 에러: {}",
                action.as_str(),
                actor.id.to_hex(),
                e
            );
        }
    }

    pub async fn list(&self, query: AuditLogQuery) -> Result<PagedResponse<AuditLogResponse>, AppError> {
        let pagination = Pagination::new(query.page, query.limit);
        let filter = audit_filter(&query)?;

        let (logs, total) = self.audit_repo.find_page(filter, pagination).await?;

        Ok(PagedResponse::new(logs, total, pagination).map(AuditLogResponse::from))
    }
}

fn audit_filter(query: &AuditLogQuery) -> Result<Document, AppError> {
    let mut filter = doc! {};

    if let Some(ref actor_id) = query.actor_id {
        filter.insert("actor_id", parse_object_id(actor_id, "actor_id")?);
    }
    if let Some(action) = query.action {
        filter.insert("action", action.as_str());
    }
    if let Some(entity_type) = query.entity_type {
        filter.insert("entity_type", entity_type.as_str());
    }
    if let Some(ref entity_id) = query.entity_id {
        filter.insert("entity_id", entity_id.as_str());
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_filter() {
        let actor = mongodb::bson::oid::ObjectId::new();
        let query = AuditLogQuery {
            actor_id: Some(actor.to_hex()),
            action: Some(AuditAction::BookIssued),
            entity_type: Some(EntityType::Transaction),
            ..Default::default()
        };

        let filter = audit_filter(&query).unwrap();
        assert_eq!(filter.get_object_id("actor_id").unwrap(), actor);
        assert_eq!(filter.get_str("action").unwrap(), "book_issued");
        assert_eq!(filter.get_str("entity_type").unwrap(), "transaction");
        assert!(!filter.contains_key("entity_id"));
    }

    #[test]
    fn test_audit_filter_rejects_bad_actor() {
        let query = AuditLogQuery { actor_id: Some("xyz".to_string()), ..Default::default() };
        assert!(matches!(audit_filter(&query), Err(AppError::ValidationError(_))));
    }
}
