//! 이용자 피드백 HTTP 핸들러
//!
//! 스코프 전체에 로그인이 필요하며, 답변 등록만 사서/관리자로 제한됩니다.
use actix_web::{get, patch, post, web, HttpResponse};
use validator::Validate;
use crate::{
    core::errors::AppError,
    domain::{
        dto::feedback::{CreateFeedbackRequest, FeedbackListQuery, ReplyFeedbackRequest},
        models::auth::{Actor, AuthenticatedUser},
    },
    middlewares::AuthMiddleware,
    services::feedback::FeedbackService,
};

#[post("", wrap = "AuthMiddleware::required()")]
pub async fn create_feedback(
    actor: Actor,
    payload: web::Json<CreateFeedbackRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = FeedbackService::instance();
    let feedback = service.create_feedback(payload.into_inner(), &actor).await?;

    Ok(HttpResponse::Created().json(feedback))
}

/// 사서/관리자는 전체, 그 외 사용자는 본인 피드백 목록
#[get("", wrap = "AuthMiddleware::required()")]
pub async fn list_feedback(
    user: AuthenticatedUser,
    query: web::Query<FeedbackListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = FeedbackService::instance();
    let feedback = service.list_feedback(query.into_inner(), &user).await?;

    Ok(HttpResponse::Ok().json(feedback))
}

#[get("/{feedback_id}", wrap = "AuthMiddleware::required()")]
pub async fn get_feedback(
    user: AuthenticatedUser,
    feedback_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = FeedbackService::instance();
    let feedback = service.get_feedback(&feedback_id, &user).await?;

    Ok(HttpResponse::Ok().json(feedback))
}

#[post("/{feedback_id}/reply", wrap = "AuthMiddleware::staff()")]
pub async fn reply_feedback(
    actor: Actor,
    feedback_id: web::Path<String>,
    payload: web::Json<ReplyFeedbackRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = FeedbackService::instance();
    let feedback = service
        .reply_feedback(&feedback_id, payload.into_inner(), &actor)
        .await?;

    Ok(HttpResponse::Ok().json(feedback))
}

#[patch("/{feedback_id}/close", wrap = "AuthMiddleware::required()")]
pub async fn close_feedback(
    actor: Actor,
    feedback_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = FeedbackService::instance();
    let feedback = service.close_feedback(&feedback_id, &actor).await?;

    Ok(HttpResponse::Ok().json(feedback))
}
