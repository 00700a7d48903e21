//! 이용자 피드백 엔티티 (`feedback` 컬렉션)

use std::str::FromStr;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    Open,
    Replied,
    Closed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Open => "open",
            FeedbackStatus::Replied => "replied",
            FeedbackStatus::Closed => "closed",
        }
    }
}

impl FromStr for FeedbackStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(FeedbackStatus::Open),
            "replied" => Ok(FeedbackStatus::Replied),
            "closed" => Ok(FeedbackStatus::Closed),
            other => Err(format!("지원하지 않는 피드백 상태입니다: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub subject: String,
    pub message: String,
    pub status: FeedbackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_by: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Feedback {
    pub fn new(user_id: ObjectId, subject: String, message: String) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            user_id,
            subject,
            message,
            status: FeedbackStatus::Open,
            reply: None,
            replied_by: None,
            replied_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        &self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feedback_is_open() {
        let owner = ObjectId::new();
        let feedback = Feedback::new(owner, "열람실".to_string(), "조명이 어둡습니다".to_string());

        assert_eq!(feedback.status, FeedbackStatus::Open);
        assert!(feedback.is_owned_by(&owner));
        assert!(!feedback.is_owned_by(&ObjectId::new()));
    }
}
