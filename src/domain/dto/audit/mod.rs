//! 감사 로그 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::audit::{AuditAction, AuditLog, EntityType};
use crate::utils::string_utils::deserialize_optional_string;
use crate::utils::time::to_chrono;

/// 감사 로그 조회 쿼리 (관리자)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub actor_id: Option<String>,
    pub action: Option<AuditAction>,
    pub entity_type: Option<EntityType>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub entity_id: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogResponse {
    pub id: String,
    pub actor_id: String,
    pub action: AuditAction,
    pub entity_type: EntityType,
    pub entity_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id.map(|id| id.to_hex()).unwrap_or_default(),
            actor_id: log.actor_id.to_hex(),
            action: log.action,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            details: log.details,
            ip_address: log.ip_address,
            created_at: to_chrono(log.created_at),
        }
    }
}
