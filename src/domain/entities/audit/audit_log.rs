//! 감사 로그 엔티티 (`audit_logs` 컬렉션)

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 감사 대상 작업 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    BookCreated,
    BookUpdated,
    BookDeleted,
    BooksImported,
    CopiesAdded,
    CopyStatusChanged,
    CopyDeleted,
    BookIssued,
    BookReturned,
    LoanRenewed,
    BookLost,
    FinePaid,
    UserCreated,
    UserStatusChanged,
    ConfigUpdated,
    FeedbackCreated,
    FeedbackReplied,
    FeedbackClosed,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::BookCreated => "book_created",
            AuditAction::BookUpdated => "book_updated",
            AuditAction::BookDeleted => "book_deleted",
            AuditAction::BooksImported => "books_imported",
            AuditAction::CopiesAdded => "copies_added",
            AuditAction::CopyStatusChanged => "copy_status_changed",
            AuditAction::CopyDeleted => "copy_deleted",
            AuditAction::BookIssued => "book_issued",
            AuditAction::BookReturned => "book_returned",
            AuditAction::LoanRenewed => "loan_renewed",
            AuditAction::BookLost => "book_lost",
            AuditAction::FinePaid => "fine_paid",
            AuditAction::UserCreated => "user_created",
            AuditAction::UserStatusChanged => "user_status_changed",
            AuditAction::ConfigUpdated => "config_updated",
            AuditAction::FeedbackCreated => "feedback_created",
            AuditAction::FeedbackReplied => "feedback_replied",
            AuditAction::FeedbackClosed => "feedback_closed",
        }
    }
}

/// 감사 대상 엔티티 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Book,
    BookCopy,
    Transaction,
    User,
    SystemConfig,
    Feedback,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Book => "book",
            EntityType::BookCopy => "book_copy",
            EntityType::Transaction => "transaction",
            EntityType::User => "user",
            EntityType::SystemConfig => "system_config",
            EntityType::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub actor_id: ObjectId,
    pub action: AuditAction,
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization_matches_as_str() {
        for action in [AuditAction::BookIssued, AuditAction::CopyStatusChanged, AuditAction::FinePaid] {
            assert_eq!(serde_json::to_string(&action).unwrap(), format!("\"{}\"", action.as_str()));
        }
        assert_eq!(serde_json::to_string(&EntityType::BookCopy).unwrap(), "\"book_copy\"");
    }

    #[test]
    fn test_feedback_lifecycle_actions() {
        for (action, expected) in [
            (AuditAction::FeedbackCreated, "feedback_created"),
            (AuditAction::FeedbackReplied, "feedback_replied"),
            (AuditAction::FeedbackClosed, "feedback_closed"),
        ] {
            assert_eq!(action.as_str(), expected);
            assert_eq!(serde_json::to_string(&action).unwrap(), format!("\"{}\"", expected));

            let parsed: AuditAction = serde_json::from_str(&format!("\"{}\"", expected)).unwrap();
            assert_eq!(parsed, action);
        }
    }
}
