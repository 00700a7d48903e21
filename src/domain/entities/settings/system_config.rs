//! 운영 정책 엔티티 (`system_config` 컬렉션, `key = "library"` 단일 문서)

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use crate::config::LibraryDefaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub key: String,
    pub loan_period_days: i64,
    pub max_books_per_student: i64,
    pub fine_per_day: f64,
    pub lost_book_fee: f64,
    pub max_renewals: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<ObjectId>,
    pub updated_at: DateTime,
}

impl SystemConfig {
    pub const LIBRARY_KEY: &'static str = "library";

    pub fn from_defaults(defaults: &LibraryDefaults) -> Self {
        Self {
            id: None,
            key: Self::LIBRARY_KEY.to_string(),
            loan_period_days: defaults.loan_period_days,
            max_books_per_student: defaults.max_books_per_student,
            fine_per_day: defaults.fine_per_day,
            lost_book_fee: defaults.lost_book_fee,
            max_renewals: defaults.max_renewals,
            updated_by: None,
            updated_at: DateTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_from_defaults() {
        let config = SystemConfig::from_defaults(&LibraryDefaults::default());

        assert_eq!(config.key, "library");
        assert_eq!(config.loan_period_days, 14);
        assert_eq!(config.max_books_per_student, 3);
        assert!(config.updated_by.is_none());
    }
}
