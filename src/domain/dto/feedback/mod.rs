//! 피드백 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::entities::feedback::{Feedback, FeedbackStatus};
use crate::utils::time::to_chrono;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    #[validate(length(min = 1, max = 120, message = "제목은 1-120자 사이여야 합니다"))]
    pub subject: String,

    #[validate(length(min = 1, max = 2000, message = "내용은 1-2000자 사이여야 합니다"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReplyFeedbackRequest {
    #[validate(length(min = 1, max = 2000, message = "답변은 1-2000자 사이여야 합니다"))]
    pub reply: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackListQuery {
    pub status: Option<FeedbackStatus>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub id: String,
    pub user_id: String,
    pub subject: String,
    pub message: String,
    pub status: FeedbackStatus,
    pub reply: Option<String>,
    pub replied_by: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Feedback> for FeedbackResponse {
    fn from(feedback: Feedback) -> Self {
        Self {
            id: feedback.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: feedback.user_id.to_hex(),
            subject: feedback.subject,
            message: feedback.message,
            status: feedback.status,
            reply: feedback.reply,
            replied_by: feedback.replied_by.map(|id| id.to_hex()),
            replied_at: feedback.replied_at.map(to_chrono),
            created_at: to_chrono(feedback.created_at),
            updated_at: to_chrono(feedback.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_lengths() {
        let ok = CreateFeedbackRequest { subject: "대출 기간".to_string(), message: "연장해 주세요".to_string() };
        assert!(ok.validate().is_ok());

        let empty = CreateFeedbackRequest { subject: "".to_string(), message: "x".to_string() };
        assert!(empty.validate().is_err());

        let long = CreateFeedbackRequest { subject: "s".repeat(121), message: "x".to_string() };
        assert!(long.validate().is_err());

        let long_message = CreateFeedbackRequest { subject: "s".to_string(), message: "가".repeat(2001) };
        assert!(long_message.validate().is_err());
    }
}
