//! 운영 정책과 감사 로그 HTTP 핸들러
use actix_web::{get, put, web, HttpResponse};
use validator::Validate;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{audit::AuditLogQuery, settings::UpdateSystemConfigRequest},
        models::auth::Actor,
    },
    middlewares::AuthMiddleware,
    services::{audit::AuditService, settings::ConfigService},
};

/// 현재 운영 정책 (대출 기간, 대출 한도, 연체료, 분실 수수료, 연장 횟수)
#[get("", wrap = "AuthMiddleware::required()")]
pub async fn get_config() -> Result<HttpResponse, AppError> {
    let service = ConfigService::instance();
    let config = service.get_config().await?;

    Ok(HttpResponse::Ok().json(config))
}

/// 보낸 항목만 변경합니다. 변경 내역은 감사 로그에 남습니다.
#[put("", wrap = "AuthMiddleware::admin()")]
pub async fn update_config(
    actor: Actor,
    payload: web::Json<UpdateSystemConfigRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = ConfigService::instance();
    let config = service.update_config(payload.into_inner(), &actor).await?;

    Ok(HttpResponse::Ok().json(config))
}

#[get("")]
pub async fn list_audit_logs(
    query: web::Query<AuditLogQuery>,
) -> Result<HttpResponse, AppError> {
    let service = AuditService::instance();
    let logs = service.list(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(logs))
}
