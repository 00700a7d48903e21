//! 이용자 피드백 서비스

use std::sync::Arc;
use mongodb::bson::{doc, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            feedback::{CreateFeedbackRequest, FeedbackListQuery, FeedbackResponse, ReplyFeedbackRequest},
            PagedResponse, Pagination,
        },
        entities::{
            audit::{AuditAction, EntityType},
            feedback::{Feedback, FeedbackStatus},
        },
        models::auth::{Actor, AuthenticatedUser},
    },
    repositories::feedback::FeedbackRepository,
    services::audit::AuditService,
    utils::{string_utils::parse_object_id, time::now},
};

#[service(name = "feedback")]
pub struct FeedbackService {
    feedback_repo: Arc<FeedbackRepository>,
    audit_service: Arc<AuditService>,
}

/// 사서/관리자는 전체, 그 외에는 본인 피드백만
fn feedback_filter(query: &FeedbackListQuery, user: &AuthenticatedUser) -> Result<Document, AppError> {
    let mut filter = doc! {};

    if !user.is_staff() {
        filter.insert("user_id", user.object_id()?);
    }
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }

    Ok(filter)
}

fn check_access(feedback: &Feedback, user: &AuthenticatedUser) -> Result<(), AppError> {
    if user.is_staff() || feedback.is_owned_by(&user.object_id()?) {
        return Ok(());
    }
    Err(AppError::AuthorizationError("본인의 피드백만 조회할 수 있습니다".to_string()))
}

impl FeedbackService {
    async fn find_feedback(&self, id: &str) -> Result<Feedback, AppError> {
        let object_id = parse_object_id(id, "피드백 ID")?;
        self.feedback_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("피드백을 찾을 수 없습니다".to_string()))
    }

    pub async fn create_feedback(
        &self,
        request: CreateFeedbackRequest,
        actor: &Actor,
    ) -> Result<FeedbackResponse, AppError> {
        let feedback = Feedback::new(
            actor.id,
            request.subject.trim().to_string(),
            request.message.trim().to_string(),
        );

        let created = self.feedback_repo.create(feedback).await?;
        log::info!("피드백 등록 - user_id: {}, 제목: {}", actor.user.user_id, created.subject);

        self.audit_service
            .record(
                actor,
                AuditAction::FeedbackCreated,
                EntityType::Feedback,
                created.id.map(|id| id.to_hex()),
                Some(json!({ "subject": created.subject })),
            )
            .await;

        Ok(FeedbackResponse::from(created))
    }

    pub async fn list_feedback(
        &self,
        query: FeedbackListQuery,
        user: &AuthenticatedUser,
    ) -> Result<PagedResponse<FeedbackResponse>, AppError> {
        let pagination = Pagination::new(query.page, query.limit);
        let filter = feedback_filter(&query, user)?;
        let (items, total) = self.feedback_repo.find_page(filter, pagination).await?;

        Ok(PagedResponse::new(items, total, pagination).map(FeedbackResponse::from))
    }

    pub async fn get_feedback(&self, id: &str, user: &AuthenticatedUser) -> Result<FeedbackResponse, AppError> {
        let feedback = self.find_feedback(id).await?;
        check_access(&feedback, user)?;

        Ok(FeedbackResponse::from(feedback))
    }

    /// 답변 등록 (사서/관리자). 종료된 피드백에는 답변할 수 없습니다.
    pub async fn reply_feedback(
        &self,
        id: &str,
        request: ReplyFeedbackRequest,
        actor: &Actor,
    ) -> Result<FeedbackResponse, AppError> {
        let feedback = self.find_feedback(id).await?;
        let feedback_id = feedback.id
            .ok_or_else(|| AppError::InternalError("피드백 ID가 없습니다".to_string()))?;

        if feedback.status == FeedbackStatus::Closed {
            return Err(AppError::ConflictError("종료된 피드백에는 답변할 수 없습니다".to_string()));
        }

        let updated = self.feedback_repo
            .update(&feedback_id, doc! {
                "reply": request.reply.trim(),
                "replied_by": actor.id,
                "replied_at": now(),
                "status": FeedbackStatus::Replied.as_str(),
            })
            .await?
            .ok_or_else(|| AppError::NotFound("피드백을 찾을 수 없습니다".to_string()))?;

        self.audit_service
            .record(
                actor,
                AuditAction::FeedbackReplied,
                EntityType::Feedback,
                Some(feedback_id.to_hex()),
                Some(json!({ "user_id": feedback.user_id.to_hex(), "subject": feedback.subject })),
            )
            .await;

        Ok(FeedbackResponse::from(updated))
    }

    /// 피드백 종료 (작성자 또는 사서/관리자)
    pub async fn close_feedback(&self, id: &str, actor: &Actor) -> Result<FeedbackResponse, AppError> {
        let feedback = self.find_feedback(id).await?;
        check_access(&feedback, &actor.user)?;

        if feedback.status == FeedbackStatus::Closed {
            return Err(AppError::ConflictError("이미 종료된 피드백입니다".to_string()));
        }

        let feedback_id = feedback.id
            .ok_or_else(|| AppError::InternalError("피드백 ID가 없습니다".to_string()))?;

        let updated = self.feedback_repo
            .update(&feedback_id, doc! { "status": FeedbackStatus::Closed.as_str() })
            .await?
            .ok_or_else(|| AppError::NotFound("피드백을 찾을 수 없습니다".to_string()))?;

        log::info!("피드백 종료 - feedback_id: {}, 처리자: {}", feedback_id, actor.user.user_id);

        self.audit_service
            .record(
                actor,
                AuditAction::FeedbackClosed,
                EntityType::Feedback,
                Some(feedback_id.to_hex()),
                Some(json!({ "user_id": feedback.user_id.to_hex(), "previous_status": feedback.status.as_str() })),
            )
            .await;

        Ok(FeedbackResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn user(role: &str) -> AuthenticatedUser {
        AuthenticatedUser { user_id: ObjectId::new().to_hex(), roles: vec![role.to_string()] }
    }

    #[test]
    fn test_students_only_see_their_own_feedback() {
        let student = user("student");
        let query = FeedbackListQuery { status: Some(FeedbackStatus::Open), ..Default::default() };

        let filter = feedback_filter(&query, &student).unwrap();
        assert_eq!(filter.get_object_id("user_id").unwrap().to_hex(), student.user_id);
        assert_eq!(filter.get_str("status").unwrap(), "open");

        let staff_filter = feedback_filter(&FeedbackListQuery::default(), &user("librarian")).unwrap();
        assert!(staff_filter.is_empty());
    }

    #[test]
    fn test_access_is_owner_or_staff() {
        let owner = user("student");
        let feedback = Feedback::new(owner.object_id().unwrap(), "s".to_string(), "m".to_string());

        assert!(check_access(&feedback, &owner).is_ok());
        assert!(check_access(&feedback, &user("admin")).is_ok());
        assert!(matches!(
            check_access(&feedback, &user("student")),
            Err(AppError::AuthorizationError(_))
        ));
    }
}
