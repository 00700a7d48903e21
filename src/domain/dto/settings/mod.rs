//! 운영 정책(SystemConfig) DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::entities::settings::SystemConfig;
use crate::utils::time::to_chrono;

/// 운영 정책 부분 수정 요청 (`PUT /api/v1/config`, 관리자)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSystemConfigRequest {
    #[validate(range(min = 1, max = 365, message = "대출 기간은 1-365일 사이여야 합니다"))]
    pub loan_period_days: Option<i64>,

    #[validate(range(min = 1, max = 50, message = "최대 대출 권수는 1-50 사이여야 합니다"))]
    pub max_books_per_student: Option<i64>,

    #[validate(range(min = 0.0, max = 1000.0, message = "일일 연체료는 0-1000 사이여야 합니다"))]
    pub fine_per_day: Option<f64>,

    #[validate(range(min = 0.0, max = 100000.0, message = "분실 수수료는 0-100000 사이여야 합니다"))]
    pub lost_book_fee: Option<f64>,

    #[validate(range(min = 0, max = 10, message = "최대 연장 횟수는 0-10 사이여야 합니다"))]
    pub max_renewals: Option<i32>,
}

impl UpdateSystemConfigRequest {
    pub fn is_empty(&self) -> bool {
        self.loan_period_days.is_none()
            && self.max_books_per_student.is_none()
            && self.fine_per_day.is_none()
            && self.lost_book_fee.is_none()
            && self.max_renewals.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfigResponse {
    pub loan_period_days: i64,
    pub max_books_per_student: i64,
    pub fine_per_day: f64,
    pub lost_book_fee: f64,
    pub max_renewals: i32,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<SystemConfig> for SystemConfigResponse {
    fn from(config: SystemConfig) -> Self {
        Self {
            loan_period_days: config.loan_period_days,
            max_books_per_student: config.max_books_per_student,
            fine_per_day: config.fine_per_day,
            lost_book_fee: config.lost_book_fee,
            max_renewals: config.max_renewals,
            updated_by: config.updated_by.map(|id| id.to_hex()),
            updated_at: to_chrono(config.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> UpdateSystemConfigRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ranges_accept_bounds() {
        let req = parse(r#"{"loan_period_days": 365, "max_books_per_student": 1, "fine_per_day": 0, "lost_book_fee": 100000, "max_renewals": 0}"#);
        assert!(req.validate().is_ok());
        assert!(!req.is_empty());
    }

    #[test]
    fn test_ranges_reject_out_of_bounds() {
        assert!(parse(r#"{"loan_period_days": 0}"#).validate().is_err());
        assert!(parse(r#"{"loan_period_days": 366}"#).validate().is_err());
        assert!(parse(r#"{"max_books_per_student": 51}"#).validate().is_err());
        assert!(parse(r#"{"fine_per_day": -0.5}"#).validate().is_err());
        assert!(parse(r#"{"fine_per_day": 1000.01}"#).validate().is_err());
        assert!(parse(r#"{"lost_book_fee": 100000.5}"#).validate().is_err());
        assert!(parse(r#"{"max_renewals": 11}"#).validate().is_err());
    }

    #[test]
    fn test_empty_update() {
        assert!(parse("{}").is_empty());
    }
}
