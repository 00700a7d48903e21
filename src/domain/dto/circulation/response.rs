//! 대출 기록 응답 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::circulation::{Transaction, TransactionStatus};
use crate::domain::models::fines::{compute_fine, overdue_days};
use crate::utils::time::to_chrono;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: String,
    pub student_id: String,
    pub book_id: String,
    pub copy_id: String,
    pub issued_by: String,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub returned_to: Option<String>,
    pub status: TransactionStatus,
    pub renew_count: i32,
    /// 확정된 연체료
    pub fine_amount: f64,
    pub fine_paid: bool,
    pub fine_paid_at: Option<DateTime<Utc>>,
    /// 대출 중인 기록의 현재 연체 일수 (종료된 기록은 확정 시점 기준)
    pub overdue_days: i64,
    /// 대출 중인 기록에 지금 반납하면 부과될 연체료
    pub accrued_fine: f64,
}

impl TransactionResponse {
    /// `now` 기준으로 연체 정보를 계산해 응답을 만듭니다.
    pub fn from_transaction(tx: Transaction, now: DateTime<Utc>, fine_per_day: f64) -> Self {
        let due = to_chrono(tx.due_date);
        let reference = match tx.return_date {
            Some(returned) if !tx.is_open() => to_chrono(returned),
            _ => now,
        };
        let accrued_fine = if tx.is_open() {
            compute_fine(due, now, fine_per_day)
        } else {
            0.0
        };

        Self {
            id: tx.id.map(|id| id.to_hex()).unwrap_or_default(),
            student_id: tx.student_id.to_hex(),
            book_id: tx.book_id.to_hex(),
            copy_id: tx.copy_id.to_hex(),
            issued_by: tx.issued_by.to_hex(),
            issue_date: to_chrono(tx.issue_date),
            due_date: due,
            return_date: tx.return_date.map(to_chrono),
            returned_to: tx.returned_to.map(|id| id.to_hex()),
            status: tx.status,
            renew_count: tx.renew_count,
            fine_amount: tx.fine_amount,
            fine_paid: tx.fine_paid,
            fine_paid_at: tx.fine_paid_at.map(to_chrono),
            overdue_days: overdue_days(due, reference),
            accrued_fine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::oid::ObjectId;
    use crate::utils::time::to_bson;

    fn loan(due: DateTime<Utc>) -> Transaction {
        let issued = to_bson(due - chrono::Duration::days(14));
        Transaction::new(ObjectId::new(), ObjectId::new(), ObjectId::new(), ObjectId::new(), issued, to_bson(due))
    }

    #[test]
    fn test_open_overdue_loan_shows_accrued_fine() {
        let due = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 4, 4, 8, 0, 0).unwrap();

        let response = TransactionResponse::from_transaction(loan(due), now, 0.5);

        assert_eq!(response.overdue_days, 3);
        assert_eq!(response.accrued_fine, 1.5);
        assert_eq!(response.fine_amount, 0.0);
    }

    #[test]
    fn test_returned_loan_uses_return_date() {
        let due = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        let mut tx = loan(due);
        tx.status = TransactionStatus::Returned;
        tx.return_date = Some(to_bson(Utc.with_ymd_and_hms(2024, 4, 2, 9, 0, 0).unwrap()));
        tx.fine_amount = 1.0;

        let later = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let response = TransactionResponse::from_transaction(tx, later, 1.0);

        assert_eq!(response.overdue_days, 1);
        assert_eq!(response.accrued_fine, 0.0);
        assert_eq!(response.fine_amount, 1.0);
    }
}
