//! 연체료 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::circulation::{Transaction, TransactionStatus};
use crate::domain::models::fines::{compute_fine, overdue_days, round_money};
use crate::utils::string_utils::deserialize_optional_string;
use crate::utils::time::to_chrono;

/// 연체료 목록 조회 쿼리 (사서/관리자)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FineListQuery {
    /// `true`: 납부 완료만, `false`: 미납만, 생략: 전체
    pub paid: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub student_id: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineResponse {
    pub transaction_id: String,
    pub student_id: String,
    pub book_id: String,
    pub transaction_status: TransactionStatus,
    pub due_date: DateTime<Utc>,
    pub overdue_days: i64,
    pub amount: f64,
    pub paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    /// 아직 반납되지 않아 금액이 계속 늘어나는 연체료
    pub accruing: bool,
}

impl FineResponse {
    /// 확정된 연체료 (반납/분실 처리된 기록)
    pub fn settled(tx: Transaction) -> Self {
        let due = to_chrono(tx.due_date);
        let days = tx
            .return_date
            .map(|returned| overdue_days(due, to_chrono(returned)))
            .unwrap_or(0);

        Self {
            transaction_id: tx.id.map(|id| id.to_hex()).unwrap_or_default(),
            student_id: tx.student_id.to_hex(),
            book_id: tx.book_id.to_hex(),
            transaction_status: tx.status,
            due_date: due,
            overdue_days: days,
            amount: tx.fine_amount,
            paid: tx.fine_paid,
            paid_at: tx.fine_paid_at.map(to_chrono),
            accruing: false,
        }
    }

    /// 반납 예정일이 지난 대출 중 기록의 현재 연체료
    pub fn accruing(tx: Transaction, now: DateTime<Utc>, fine_per_day: f64) -> Self {
        let due = to_chrono(tx.due_date);

        Self {
            transaction_id: tx.id.map(|id| id.to_hex()).unwrap_or_default(),
            student_id: tx.student_id.to_hex(),
            book_id: tx.book_id.to_hex(),
            transaction_status: tx.status,
            due_date: due,
            overdue_days: overdue_days(due, now),
            amount: compute_fine(due, now, fine_per_day),
            paid: false,
            paid_at: None,
            accruing: true,
        }
    }
}

/// 본인 연체료 요약 (`GET /api/v1/fines/my`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyFinesResponse {
    pub fines: Vec<FineResponse>,
    pub total_unpaid: f64,
    pub total_paid: f64,
    pub total_accruing: f64,
}

impl MyFinesResponse {
    pub fn new(fines: Vec<FineResponse>) -> Self {
        let sum = |pred: &dyn Fn(&FineResponse) -> bool| {
            round_money(fines.iter().filter(|f| pred(f)).map(|f| f.amount).sum())
        };
        let total_unpaid = sum(&|f| !f.accruing && !f.paid);
        let total_paid = sum(&|f| f.paid);
        let total_accruing = sum(&|f| f.accruing);

        Self {
            fines,
            total_unpaid,
            total_paid,
            total_accruing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mongodb::bson::oid::ObjectId;
    use crate::utils::time::to_bson;

    fn tx(due: DateTime<Utc>) -> Transaction {
        let mut tx = Transaction::new(
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            to_bson(due - chrono::Duration::days(14)),
            to_bson(due),
        );
        tx.id = Some(ObjectId::new());
        tx
    }

    #[test]
    fn test_summary_totals() {
        let due = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 13, 12, 0, 0).unwrap();

        let mut unpaid = tx(due);
        unpaid.status = TransactionStatus::Returned;
        unpaid.return_date = Some(to_bson(now));
        unpaid.fine_amount = 3.0;

        let mut paid = unpaid.clone();
        paid.fine_amount = 2.25;
        paid.fine_paid = true;

        let open = tx(due);

        let summary = MyFinesResponse::new(vec![
            FineResponse::settled(unpaid),
            FineResponse::settled(paid),
            FineResponse::accruing(open, now, 1.0),
        ]);

        assert_eq!(summary.total_unpaid, 3.0);
        assert_eq!(summary.total_paid, 2.25);
        assert_eq!(summary.total_accruing, 3.0);
        assert_eq!(summary.fines[0].overdue_days, 3);
        assert!(summary.fines[2].accruing);
    }
}
