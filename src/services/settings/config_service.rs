//! 운영 정책 서비스
//!
//! 대출 기간, 최대 대출 권수, 연체료 등은 `system_config` 문서에서 읽습니다.
//! 문서가 없으면 [`LibraryDefaults`]로 시드합니다.

use std::sync::Arc;
use mongodb::bson::{doc, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    config::LibraryDefaults,
    core::errors::AppError,
    domain::{
        dto::settings::{SystemConfigResponse, UpdateSystemConfigRequest},
        entities::{
            audit::{AuditAction, EntityType},
            settings::SystemConfig,
        },
        models::auth::Actor,
    },
    repositories::settings::SystemConfigRepository,
    services::audit::AuditService,
    utils::time,
};

#[service(name = "config")]
pub struct ConfigService {
    config_repo: Arc<SystemConfigRepository>,
    audit_service: Arc<AuditService>,
}

impl ConfigService {
    /// 정책 문서가 없으면 환경 변수 기본값으로 생성합니다. 기동 시 한 번 호출됩니다.
    pub async fn ensure_seeded(&self) -> Result<SystemConfig, AppError> {
        if let Some(config) = self.config_repo.find_library().await? {
            return Ok(config);
        }

        let seed = SystemConfig::from_defaults(&LibraryDefaults::from_env());
        self.config_repo.insert_if_absent(&seed).await?;
        log::info!(
            "운영 정책 기본값 생성 - 대출 기간: {}일, 최대 대출: {}권, 연체료: {}/일",
            seed.loan_period_days,
            seed.max_books_per_student,
            seed.fine_per_day
        );

        self.config_repo
            .find_library()
            .await?
            .ok_or_else(|| AppError::InternalError("운영 정책을 불러올 수 없습니다".to_string()))
    }

    /// 현재 운영 정책
    pub async fn current(&self) -> Result<SystemConfig, AppError> {
        self.ensure_seeded().await
    }

    pub async fn get_config(&self) -> Result<SystemConfigResponse, AppError> {
        Ok(SystemConfigResponse::from(self.current().await?))
    }

    pub async fn update_config(
        &self,
        request: UpdateSystemConfigRequest,
        actor: &Actor,
    ) -> Result<SystemConfigResponse, AppError> {
        if request.is_empty() {
            return Err(AppError::ValidationError("변경할 항목이 없습니다".to_string()));
        }

        // 문서가 없는 상태에서의 수정도 기본값 위에 적용되도록 보장
        self.ensure_seeded().await?;

        let mut update_doc = config_update_doc(&request);
        update_doc.insert("updated_by", actor.id);
        update_doc.insert("updated_at", time::now());

        let updated = self.config_repo
            .update(update_doc)
            .await?
            .ok_or_else(|| AppError::InternalError("운영 정책을 불러올 수 없습니다".to_string()))?;

        self.audit_service
            .record(
                actor,
                AuditAction::ConfigUpdated,
                EntityType::SystemConfig,
                Some(SystemConfig::LIBRARY_KEY.to_string()),
                Some(json!({
                    "loan_period_days": request.loan_period_days,
                    "max_books_per_student": request.max_books_per_student,
                    "fine_per_day": request.fine_per_day,
                    "lost_book_fee": request.lost_book_fee,
                    "max_renewals": request.max_renewals,
                })),
            )
            .await;

        log::info!("운영 정책 변경 - 수정자: {}", actor.id.to_hex());
        Ok(SystemConfigResponse::from(updated))
    }
}

fn config_update_doc(request: &UpdateSystemConfigRequest) -> Document {
    let mut update = doc! {};

    if let Some(days) = request.loan_period_days {
        update.insert("loan_period_days", days);
    }
    if let Some(max_books) = request.max_books_per_student {
        update.insert("max_books_per_student", max_books);
    }
    if let Some(fine) = request.fine_per_day {
        update.insert("fine_per_day", fine);
    }
    if let Some(fee) = request.lost_book_fee {
        update.insert("lost_book_fee", fee);
    }
    if let Some(renewals) = request.max_renewals {
        update.insert("max_renewals", renewals);
    }

    update
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_doc_contains_only_given_fields() {
        let request = UpdateSystemConfigRequest {
            loan_period_days: Some(21),
            fine_per_day: Some(0.5),
            ..Default::default()
        };

        let update = config_update_doc(&request);
        assert_eq!(update.len(), 2);
        assert_eq!(update.get_i64("loan_period_days").unwrap(), 21);
        assert_eq!(update.get_f64("fine_per_day").unwrap(), 0.5);
    }
}
