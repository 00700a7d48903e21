//! 연체료 조회와 납부 처리
//!
//! 연체료는 반납/분실 처리 시 대출 기록에 확정되며, 확정된 뒤에만 납부할 수 있습니다.
//! 아직 반납되지 않은 연체 대출은 조회 시점 기준 금액을 `accruing`으로 보여줍니다.

use std::sync::Arc;
use chrono::Utc;
use mongodb::bson::{doc, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            fines::{FineListQuery, FineResponse, MyFinesResponse},
            PagedResponse, Pagination,
        },
        entities::{
            audit::{AuditAction, EntityType},
            circulation::{Transaction, TransactionStatus},
        },
        models::{
            auth::{Actor, AuthenticatedUser},
            fines::overdue_cutoff,
        },
    },
    repositories::circulation::TransactionRepository,
    services::{audit::AuditService, settings::ConfigService},
    utils::{string_utils::parse_object_id, time::to_bson},
};

#[service(name = "fine")]
pub struct FineService {
    transaction_repo: Arc<TransactionRepository>,
    config_service: Arc<ConfigService>,
    audit_service: Arc<AuditService>,
}

fn fine_filter(query: &FineListQuery) -> Result<Document, AppError> {
    let mut filter = doc! { "fine_amount": { "$gt": 0.0 } };

    if let Some(paid) = query.paid {
        filter.insert("fine_paid", paid);
    }
    if let Some(ref student_id) = query.student_id {
        filter.insert("student_id", parse_object_id(student_id, "student_id")?);
    }

    Ok(filter)
}

/// 납부 가능 여부 확인
fn check_payable(tx: &Transaction) -> Result<(), AppError> {
    if tx.is_open() {
        return Err(AppError::ConflictError("반납 또는 분실 처리 후에 납부할 수 있습니다".to_string()));
    }
    if tx.fine_amount <= 0.0 {
        return Err(AppError::ConflictError("부과된 연체료가 없습니다".to_string()));
    }
    if tx.fine_paid {
        return Err(AppError::ConflictError("이미 납부된 연체료입니다".to_string()));
    }
    Ok(())
}

impl FineService {
    /// 확정된 연체료 목록 (사서/관리자)
    pub async fn list_fines(&self, query: FineListQuery) -> Result<PagedResponse<FineResponse>, AppError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (items, total) = self.transaction_repo
            .find_page(fine_filter(&query)?, pagination)
            .await?;

        Ok(PagedResponse::new(items, total, pagination).map(FineResponse::settled))
    }

    /// 본인의 확정 연체료와 현재 누적 중인 연체료
    pub async fn my_fines(&self, user: &AuthenticatedUser) -> Result<MyFinesResponse, AppError> {
        let student_id = user.object_id()?;
        let config = self.config_service.current().await?;
        let now = Utc::now();

        let settled = self.transaction_repo
            .find_all(doc! { "student_id": student_id, "fine_amount": { "$gt": 0.0 } })
            .await?;

        let overdue = self.transaction_repo
            .find_all(doc! {
                "student_id": student_id,
                "status": TransactionStatus::Issued.as_str(),
                "due_date": { "$lt": to_bson(overdue_cutoff(now)) },
            })
            .await?;

        let fines = settled
            .into_iter()
            .map(FineResponse::settled)
            .chain(overdue.into_iter().map(|tx| FineResponse::accruing(tx, now, config.fine_per_day)))
            .collect();

        Ok(MyFinesResponse::new(fines))
    }

    /// 연체료 납부 처리 (사서/관리자)
    pub async fn pay_fine(&self, transaction_id: &str, actor: &Actor) -> Result<FineResponse, AppError> {
        let object_id = parse_object_id(transaction_id, "대출 기록 ID")?;
        let tx = self.transaction_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("대출 기록을 찾을 수 없습니다".to_string()))?;

        check_payable(&tx)?;

        let paid = self.transaction_repo
            .mark_fine_paid(&object_id, to_bson(Utc::now()))
            .await?
            .ok_or_else(|| AppError::ConflictError("이미 납부된 연체료입니다".to_string()))?;

        self.audit_service
            .record(
                actor,
                AuditAction::FinePaid,
                EntityType::Transaction,
                Some(object_id.to_hex()),
                Some(json!({ "student_id": paid.student_id.to_hex(), "amount": paid.fine_amount })),
            )
            .await;

        log::info!("연체료 납부 - 대출 기록: {}, 금액: {}", object_id.to_hex(), paid.fine_amount);
        Ok(FineResponse::settled(paid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};

    fn closed(fine: f64, paid: bool) -> Transaction {
        let now = DateTime::now();
        let mut tx = Transaction::new(ObjectId::new(), ObjectId::new(), ObjectId::new(), ObjectId::new(), now, now);
        tx.status = TransactionStatus::Returned;
        tx.return_date = Some(now);
        tx.fine_amount = fine;
        tx.fine_paid = paid;
        tx
    }

    #[test]
    fn test_only_settled_unpaid_fines_are_payable() {
        assert!(check_payable(&closed(2.5, false)).is_ok());
        assert!(matches!(check_payable(&closed(0.0, false)), Err(AppError::ConflictError(_))));
        assert!(matches!(check_payable(&closed(2.5, true)), Err(AppError::ConflictError(_))));

        let mut open = closed(0.0, false);
        open.status = TransactionStatus::Issued;
        assert!(matches!(check_payable(&open), Err(AppError::ConflictError(_))));
    }

    #[test]
    fn test_fine_filter() {
        let student = ObjectId::new();
        let query = FineListQuery {
            paid: Some(false),
            student_id: Some(student.to_hex()),
            ..Default::default()
        };

        let filter = fine_filter(&query).unwrap();
        assert!(!filter.get_bool("fine_paid").unwrap());
        assert_eq!(filter.get_object_id("student_id").unwrap(), student);
        assert!(filter.get_document("fine_amount").is_ok());

        let all = fine_filter(&FineListQuery::default()).unwrap();
        assert!(all.get("fine_paid").is_none());
    }
}
