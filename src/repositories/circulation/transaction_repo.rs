//! # 대출 기록 리포지토리
//!
//! 대출 기록의 종료(반납/분실), 연장, 연체료 납부는 모두 현재 상태를 조건으로 하는
//! 단일 문서 원자 연산입니다. 조건이 맞지 않으면 `Ok(None)`을 반환하고,
//! 상황에 맞는 오류 변환은 서비스 계층이 담당합니다.

use std::sync::Arc;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    IndexModel,
};
use singleton_macro::repository;
use crate::{
    caching::redis::RedisClient,
    core::{errors::AppError, registry::Repository},
    db::Database,
    domain::{
        dto::Pagination,
        entities::circulation::{Transaction, TransactionStatus},
    },
    repositories::{find_all, find_paged},
};

#[repository(name = "transaction", collection = "transactions")]
pub struct TransactionRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

/// 반납 또는 분실 처리 내용
#[derive(Debug, Clone)]
pub struct LoanClosure {
    pub status: TransactionStatus,
    pub closed_at: DateTime,
    pub closed_by: ObjectId,
    pub fine_amount: f64,
}

/// 미납 연체료가 남아 있는 종료된 대출 조건
pub fn unpaid_fine_filter(student_id: &ObjectId) -> Document {
    doc! {
        "student_id": student_id,
        "status": { "$ne": TransactionStatus::Issued.as_str() },
        "fine_amount": { "$gt": 0.0 },
        "fine_paid": false,
    }
}

impl TransactionRepository {
    fn after_update() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    pub async fn create(&self, mut transaction: Transaction) -> Result<Transaction, AppError> {
        let result = self.collection::<Transaction>()
            .insert_one(&transaction)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        transaction.id = result.inserted_id.as_object_id();
        Ok(transaction)
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Transaction>, AppError> {
        self.collection::<Transaction>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn count_issued_for_student(&self, student_id: &ObjectId) -> Result<u64, AppError> {
        self.collection::<Transaction>()
            .count_documents(doc! {
                "student_id": student_id,
                "status": TransactionStatus::Issued.as_str(),
            })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn has_unpaid_fine(&self, student_id: &ObjectId) -> Result<bool, AppError> {
        let count = self.collection::<Transaction>()
            .count_documents(unpaid_fine_filter(student_id))
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(count > 0)
    }

    /// 학생이 같은 도서의 다른 사본을 이미 대출 중인지 확인
    pub async fn has_open_loan_for_book(&self, student_id: &ObjectId, book_id: &ObjectId) -> Result<bool, AppError> {
        let existing = self.collection::<Transaction>()
            .find_one(doc! {
                "student_id": student_id,
                "book_id": book_id,
                "status": TransactionStatus::Issued.as_str(),
            })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(existing.is_some())
    }

    /// 대출 중인 기록을 반납 또는 분실로 종료합니다.
    pub async fn close(&self, id: &ObjectId, closure: LoanClosure) -> Result<Option<Transaction>, AppError> {
        self.collection::<Transaction>()
            .find_one_and_update(
                doc! { "_id": id, "status": TransactionStatus::Issued.as_str() },
                doc! {
                    "$set": {
                        "status": closure.status.as_str(),
                        "return_date": closure.closed_at,
                        "returned_to": closure.closed_by,
                        "fine_amount": closure.fine_amount,
                    }
                },
            )
            .with_options(Self::after_update())
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 연장 횟수가 `expected_renew_count`일 때만 반납 예정일을 갱신합니다.
    pub async fn renew(
        &self,
        id: &ObjectId,
        expected_renew_count: i32,
        new_due_date: DateTime,
    ) -> Result<Option<Transaction>, AppError> {
        self.collection::<Transaction>()
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "status": TransactionStatus::Issued.as_str(),
                    "renew_count": expected_renew_count,
                },
                doc! {
                    "$set": { "due_date": new_due_date },
                    "$inc": { "renew_count": 1 },
                },
            )
            .with_options(Self::after_update())
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 종료된 대출의 미납 연체료를 납부 처리합니다.
    pub async fn mark_fine_paid(&self, id: &ObjectId, paid_at: DateTime) -> Result<Option<Transaction>, AppError> {
        self.collection::<Transaction>()
            .find_one_and_update(
                doc! {
                    "_id": id,
                    "status": { "$ne": TransactionStatus::Issued.as_str() },
                    "fine_amount": { "$gt": 0.0 },
                    "fine_paid": false,
                },
                doc! { "$set": { "fine_paid": true, "fine_paid_at": paid_at } },
            )
            .with_options(Self::after_update())
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 최근 대출순 목록
    pub async fn find_page(
        &self,
        filter: Document,
        pagination: Pagination,
    ) -> Result<(Vec<Transaction>, u64), AppError> {
        find_paged(
            &self.collection::<Transaction>(),
            filter,
            doc! { "issue_date": -1, "_id": -1 },
            pagination,
        )
        .await
    }

    pub async fn find_all(&self, filter: Document) -> Result<Vec<Transaction>, AppError> {
        find_all(&self.collection::<Transaction>(), filter, doc! { "issue_date": -1, "_id": -1 }).await
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<Transaction>();

        let student_status_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "status": 1 })
            .options(IndexOptions::builder()
                .name("student_status".to_string())
                .build())
            .build();

        let copy_status_index = IndexModel::builder()
            .keys(doc! { "copy_id": 1, "status": 1 })
            .options(IndexOptions::builder()
                .name("copy_status".to_string())
                .build())
            .build();

        let due_date_index = IndexModel::builder()
            .keys(doc! { "status": 1, "due_date": 1 })
            .options(IndexOptions::builder()
                .name("status_due_date".to_string())
                .build())
            .build();

        let fine_index = IndexModel::builder()
            .keys(doc! { "fine_paid": 1, "fine_amount": 1 })
            .options(IndexOptions::builder()
                .name("fine_state".to_string())
                .build())
            .build();

        collection
            .create_indexes([student_status_index, copy_status_index, due_date_index, fine_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaid_fine_filter_excludes_open_loans() {
        let student = ObjectId::new();
        let filter = unpaid_fine_filter(&student);

        assert_eq!(filter.get_object_id("student_id").unwrap(), student);
        assert_eq!(filter.get_document("status").unwrap(), &doc! { "$ne": "issued" });
        assert!(!filter.get_bool("fine_paid").unwrap());
    }
}
