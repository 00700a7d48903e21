//! 대출 기록 엔티티 (`transactions` 컬렉션)
//!
//! 한 학생과 한 사본의 대출부터 반납(또는 분실)까지를 기록합니다.

use std::fmt;
use std::str::FromStr;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Issued,
    Returned,
    Lost,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Issued => "issued",
            TransactionStatus::Returned => "returned",
            TransactionStatus::Lost => "lost",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "issued" => Ok(TransactionStatus::Issued),
            "returned" => Ok(TransactionStatus::Returned),
            "lost" => Ok(TransactionStatus::Lost),
            other => Err(format!("지원하지 않는 대출 상태입니다: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub student_id: ObjectId,
    pub book_id: ObjectId,
    pub copy_id: ObjectId,
    /// 대출을 처리한 사서/관리자
    pub issued_by: ObjectId,
    pub issue_date: DateTime,
    pub due_date: DateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_to: Option<ObjectId>,
    pub status: TransactionStatus,
    pub renew_count: i32,
    /// 확정된 연체료 (반납/분실 처리 시 계산)
    pub fine_amount: f64,
    pub fine_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fine_paid_at: Option<DateTime>,
}

impl Transaction {
    pub fn new(
        student_id: ObjectId,
        book_id: ObjectId,
        copy_id: ObjectId,
        issued_by: ObjectId,
        issue_date: DateTime,
        due_date: DateTime,
    ) -> Self {
        Self {
            id: None,
            student_id,
            book_id,
            copy_id,
            issued_by,
            issue_date,
            due_date,
            return_date: None,
            returned_to: None,
            status: TransactionStatus::Issued,
            renew_count: 0,
            fine_amount: 0.0,
            fine_paid: false,
            fine_paid_at: None,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::Issued
    }

    pub fn has_unpaid_fine(&self) -> bool {
        self.fine_amount > 0.0 && !self.fine_paid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_is_open_without_fine() {
        let now = DateTime::now();
        let tx = Transaction::new(ObjectId::new(), ObjectId::new(), ObjectId::new(), ObjectId::new(), now, now);

        assert!(tx.is_open());
        assert!(!tx.has_unpaid_fine());
        assert_eq!(tx.renew_count, 0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("RETURNED".parse::<TransactionStatus>(), Ok(TransactionStatus::Returned));
        assert!("overdue".parse::<TransactionStatus>().is_err());
    }
}
