//! # 대출/반납 서비스
//!
//! ## 대출 처리 순서
//!
//! ```text
//! 1. 학생 확인 (존재, 활성, student 역할)
//! 2. 대출 권수 한도 확인
//! 3. 미납 연체료 확인
//! 4. 같은 도서 중복 대출 확인
//! 5. 사본 점유       available → issued        (find_one_and_update)
//! 6. 대출 가능 수 감소 available_copies - 1     ($inc, available_copies >= 1 조건)
//! 7. 대출 기록 저장
//! ```
//!
//! 6 또는 7이 실패하면 앞 단계를 되돌린 뒤 오류를 반환합니다. 되돌리기 자체의
//! 실패는 요청 오류를 바꾸지 않고 `error` 로그로 남깁니다.
//!
//! 반납/분실/연장은 대출 기록의 `status = issued` 조건부 갱신이 먼저 성공한 경우에만
//! 사본과 카운터를 변경하므로, 같은 기록에 대한 중복 요청은 한 번만 반영됩니다.

use std::sync::Arc;
use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            circulation::{IssueBookRequest, MyTransactionsQuery, TransactionListQuery, TransactionResponse},
            PagedResponse, Pagination,
        },
        entities::{
            audit::{AuditAction, EntityType},
            books::{BookCopy, CopyStatus},
            circulation::{Transaction, TransactionStatus},
            settings::SystemConfig,
        },
        models::{
            auth::{Actor, AuthenticatedUser},
            fines::{compute_fine, lost_book_charge, overdue_cutoff, overdue_days},
        },
    },
    repositories::{
        books::{BookCopyRepository, BookRepository},
        circulation::{LoanClosure, TransactionRepository},
        users::UserRepository,
    },
    services::{audit::AuditService, settings::ConfigService},
    utils::{
        string_utils::parse_object_id,
        time::{add_days, to_bson, to_chrono},
    },
};

#[service(name = "circulation")]
pub struct CirculationService {
    user_repo: Arc<UserRepository>,
    book_repo: Arc<BookRepository>,
    copy_repo: Arc<BookCopyRepository>,
    transaction_repo: Arc<TransactionRepository>,
    config_service: Arc<ConfigService>,
    audit_service: Arc<AuditService>,
}

/// 대출 권수 한도 확인
fn check_borrow_limit(issued: u64, max_books: i64) -> Result<(), AppError> {
    if issued as i64 >= max_books {
        return Err(AppError::ConflictError(format!(
            "대출 한도({}권)에 도달했습니다",
            max_books
        )));
    }
    Ok(())
}

/// 연장 가능 여부 확인
fn check_renewable(tx: &Transaction, now: chrono::DateTime<Utc>, max_renewals: i32) -> Result<(), AppError> {
    if !tx.is_open() {
        return Err(AppError::ConflictError("대출 중인 기록만 연장할 수 있습니다".to_string()));
    }
    if overdue_days(to_chrono(tx.due_date), now) > 0 {
        return Err(AppError::ConflictError("연체 중인 도서는 연장할 수 없습니다".to_string()));
    }
    if tx.renew_count >= max_renewals {
        return Err(AppError::ConflictError(format!(
            "최대 연장 횟수({}회)를 초과했습니다",
            max_renewals
        )));
    }
    Ok(())
}

fn transaction_filter(query: &TransactionListQuery, now: chrono::DateTime<Utc>) -> Result<Document, AppError> {
    let mut filter = doc! {};

    if let Some(ref student_id) = query.student_id {
        filter.insert("student_id", parse_object_id(student_id, "student_id")?);
    }
    if let Some(ref book_id) = query.book_id {
        filter.insert("book_id", parse_object_id(book_id, "book_id")?);
    }
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    if query.overdue_only {
        filter.insert("status", TransactionStatus::Issued.as_str());
        filter.insert("due_date", doc! { "$lt": to_bson(overdue_cutoff(now)) });
    }

    Ok(filter)
}

/// 사본 점유 이후 실패할 수 있는 대출 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IssueStep {
    CounterDecrement,
    TransactionInsert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compensation {
    RestoreAvailableCounter,
    ReleaseCopy,
}

/// 실패 단계별 되돌리기 목록 (실행 순서)
fn compensations_for(failed: IssueStep) -> &'static [Compensation] {
    match failed {
        IssueStep::CounterDecrement => &[Compensation::ReleaseCopy],
        IssueStep::TransactionInsert => &[Compensation::RestoreAvailableCounter, Compensation::ReleaseCopy],
    }
}

impl CirculationService {
    async fn find_transaction(&self, id: &str) -> Result<Transaction, AppError> {
        let object_id = parse_object_id(id, "대출 기록 ID")?;
        self.transaction_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("대출 기록을 찾을 수 없습니다".to_string()))
    }

    fn respond(&self, tx: Transaction, config: &SystemConfig) -> TransactionResponse {
        TransactionResponse::from_transaction(tx, Utc::now(), config.fine_per_day)
    }

    /// 대출 처리 (사서/관리자)
    pub async fn issue_book(&self, request: IssueBookRequest, actor: &Actor) -> Result<TransactionResponse, AppError> {
        let config = self.config_service.current().await?;

        // 1. 학생 확인
        let student_id = parse_object_id(&request.student_id, "student_id")?;
        let student = self.user_repo
            .find_by_id(&student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("학생을 찾을 수 없습니다".to_string()))?;

        if !student.is_student() {
            return Err(AppError::ValidationError("학생 계정에만 대출할 수 있습니다".to_string()));
        }
        if !student.is_active {
            return Err(AppError::ConflictError("비활성화된 계정에는 대출할 수 없습니다".to_string()));
        }

        // 2. 대출 권수 한도
        let issued = self.transaction_repo.count_issued_for_student(&student_id).await?;
        check_borrow_limit(issued, config.max_books_per_student)?;

        // 3. 미납 연체료
        if self.transaction_repo.has_unpaid_fine(&student_id).await? {
            return Err(AppError::ConflictError("미납 연체료가 있어 대출할 수 없습니다".to_string()));
        }

        // 대상 도서 결정
        let requested_copy = match request.copy_id {
            Some(ref copy_id) => {
                let copy_oid = parse_object_id(copy_id, "copy_id")?;
                let copy = self.copy_repo
                    .find_by_id(&copy_oid)
                    .await?
                    .ok_or_else(|| AppError::NotFound("사본을 찾을 수 없습니다".to_string()))?;
                Some(copy)
            }
            None => None,
        };

        let book_id = match (&request.book_id, &requested_copy) {
            (Some(book_id), Some(copy)) => {
                let book_oid = parse_object_id(book_id, "book_id")?;
                if copy.book_id != book_oid {
                    return Err(AppError::ValidationError("사본이 지정한 도서에 속하지 않습니다".to_string()));
                }
                book_oid
            }
            (None, Some(copy)) => copy.book_id,
            (Some(book_id), None) => parse_object_id(book_id, "book_id")?,
            (None, None) => {
                return Err(AppError::ValidationError("book_id 또는 copy_id가 필요합니다".to_string()));
            }
        };

        let book = self.book_repo
            .find_by_id(&book_id)
            .await?
            .ok_or_else(|| AppError::NotFound("도서를 찾을 수 없습니다".to_string()))?;

        // 4. 같은 도서 중복 대출
        if self.transaction_repo.has_open_loan_for_book(&student_id, &book_id).await? {
            return Err(AppError::ConflictError("이미 같은 도서를 대출 중입니다".to_string()));
        }

        // 5. 사본 점유
        let copy = match requested_copy {
            Some(copy) => {
                let copy_oid = copy.id
                    .ok_or_else(|| AppError::InternalError("사본 ID가 없습니다".to_string()))?;
                self.copy_repo
                    .claim_by_id(&copy_oid)
                    .await?
                    .ok_or_else(|| AppError::ConflictError(format!(
                        "사본({})이 대출 가능한 상태가 아닙니다",
                        copy.barcode
                    )))?
            }
            None => self.copy_repo
                .claim_available_for_book(&book_id)
                .await?
                .ok_or_else(|| AppError::ConflictError("대출 가능한 사본이 없습니다".to_string()))?,
        };
        let copy_id = copy.id
            .ok_or_else(|| AppError::InternalError("사본 ID가 없습니다".to_string()))?;

        // 6. 대출 가능 수 감소
        match self.book_repo.adjust_counters(&book_id, 0, -1).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.compensate(IssueStep::CounterDecrement, &book_id, &copy).await;
                return Err(AppError::ConflictError("대출 가능한 사본이 없습니다".to_string()));
            }
            Err(e) => {
                self.compensate(IssueStep::CounterDecrement, &book_id, &copy).await;
                return Err(e);
            }
        }

        // 7. 대출 기록 저장
        let issue_date = to_bson(Utc::now());
        let due_date = add_days(issue_date, config.loan_period_days);
        let transaction = Transaction::new(student_id, book_id, copy_id, actor.id, issue_date, due_date);

        let created = match self.transaction_repo.create(transaction).await {
            Ok(created) => created,
            Err(e) => {
                log::error!(
                    "대출 기록 저장 실패, 되돌리기 수행 - copy: {}, student: {}, 에러: {}",
                    copy.barcode,
                    student_id.to_hex(),
                    e
                );
                self.compensate(IssueStep::TransactionInsert, &book_id, &copy).await;
                return Err(e);
            }
        };

        self.audit_service
            .record(
                actor,
                AuditAction::BookIssued,
                EntityType::Transaction,
                created.id_string(),
                Some(json!({
                    "student_id": student_id.to_hex(),
                    "book_id": book_id.to_hex(),
                    "isbn": book.isbn,
                    "barcode": copy.barcode,
                    "due_date": to_chrono(due_date).to_rfc3339(),
                })),
            )
            .await;

        log::info!(
            "대출 - 학생: {}, 도서: {} ({}), 반납 예정: {}",
            student.username,
            book.title,
            copy.barcode,
            to_chrono(due_date).date_naive()
        );

        Ok(self.respond(created, &config))
    }

    /// 실패한 단계 이전까지 반영된 변경을 되돌립니다. 되돌리기 실패는 로그만 남깁니다.
    async fn compensate(&self, failed: IssueStep, book_id: &ObjectId, copy: &BookCopy) {
        for step in compensations_for(failed) {
            match step {
                Compensation::RestoreAvailableCounter => {
                    if let Err(e) = self.book_repo.adjust_counters(book_id, 0, 1).await {
                        log::error!("카운터 되돌리기 실패 - book_id: {}, 에러: {}", book_id.to_hex(), e);
                    }
                }
                Compensation::ReleaseCopy => self.release_copy(copy).await,
            }
        }
    }

    /// 점유한 사본을 다시 대출 가능 상태로 되돌립니다.
    async fn release_copy(&self, copy: &BookCopy) {
        let Some(copy_id) = copy.id else {
            return;
        };

        match self.copy_repo.update_status(&copy_id, CopyStatus::Issued, CopyStatus::Available, None).await {
            Ok(Some(_)) => log::warn!("사본 점유 되돌림 - {}", copy.barcode),
            Ok(None) => log::error!("사본 점유 되돌리기 실패 - {}: 대출 상태가 아닙니다", copy.barcode),
            Err(e) => log::error!("사본 점유 되돌리기 실패 - {}: {}", copy.barcode, e),
        }
    }

    /// 반납 처리 (사서/관리자)
    pub async fn return_book(&self, transaction_id: &str, actor: &Actor) -> Result<TransactionResponse, AppError> {
        let config = self.config_service.current().await?;
        let tx = self.find_transaction(transaction_id).await?;
        let tx_id = tx.id
            .ok_or_else(|| AppError::InternalError("대출 기록 ID가 없습니다".to_string()))?;

        if !tx.is_open() {
            return Err(AppError::ConflictError(format!(
                "이미 {} 처리된 대출입니다",
                tx.status.as_str()
            )));
        }

        let now = Utc::now();
        let due = to_chrono(tx.due_date);
        let fine = compute_fine(due, now, config.fine_per_day);

        let closed = self.transaction_repo
            .close(&tx_id, LoanClosure {
                status: TransactionStatus::Returned,
                closed_at: to_bson(now),
                closed_by: actor.id,
                fine_amount: fine,
            })
            .await?
            .ok_or_else(|| AppError::ConflictError("이미 반납 처리된 대출입니다".to_string()))?;

        match self.copy_repo.update_status(&tx.copy_id, CopyStatus::Issued, CopyStatus::Available, None).await {
            Ok(Some(_)) => {}
            Ok(None) => log::error!("반납된 사본의 상태가 대출 중이 아닙니다 - copy_id: {}", tx.copy_id.to_hex()),
            Err(e) => log::error!("반납 사본 상태 변경 실패 - copy_id: {}, 에러: {}", tx.copy_id.to_hex(), e),
        }

        match self.book_repo.adjust_counters(&tx.book_id, 0, 1).await {
            Ok(Some(_)) => {}
            Ok(None) => log::error!("반납 도서를 찾을 수 없습니다 - book_id: {}", tx.book_id.to_hex()),
            Err(e) => log::error!("반납 카운터 조정 실패 - book_id: {}, 에러: {}", tx.book_id.to_hex(), e),
        }

        self.audit_service
            .record(
                actor,
                AuditAction::BookReturned,
                EntityType::Transaction,
                Some(tx_id.to_hex()),
                Some(json!({
                    "student_id": tx.student_id.to_hex(),
                    "copy_id": tx.copy_id.to_hex(),
                    "overdue_days": overdue_days(due, now),
                    "fine_amount": fine,
                })),
            )
            .await;

        log::info!("반납 - 대출 기록: {}, 연체료: {}", tx_id.to_hex(), fine);
        Ok(self.respond(closed, &config))
    }

    /// 반납 예정일 연장 (사서/관리자 또는 본인)
    pub async fn renew_loan(&self, transaction_id: &str, actor: &Actor) -> Result<TransactionResponse, AppError> {
        let config = self.config_service.current().await?;
        let tx = self.find_transaction(transaction_id).await?;
        let tx_id = tx.id
            .ok_or_else(|| AppError::InternalError("대출 기록 ID가 없습니다".to_string()))?;

        if !actor.is_staff() && tx.student_id != actor.id {
            return Err(AppError::AuthorizationError("본인의 대출만 연장할 수 있습니다".to_string()));
        }

        check_renewable(&tx, Utc::now(), config.max_renewals)?;

        let new_due = add_days(tx.due_date, config.loan_period_days);
        let renewed = self.transaction_repo
            .renew(&tx_id, tx.renew_count, new_due)
            .await?
            .ok_or_else(|| AppError::ConflictError("대출 기록이 그 사이 변경되었습니다. 다시 시도해 주세요".to_string()))?;

        self.audit_service
            .record(
                actor,
                AuditAction::LoanRenewed,
                EntityType::Transaction,
                Some(tx_id.to_hex()),
                Some(json!({
                    "previous_due_date": to_chrono(tx.due_date).to_rfc3339(),
                    "due_date": to_chrono(new_due).to_rfc3339(),
                    "renew_count": renewed.renew_count,
                })),
            )
            .await;

        Ok(self.respond(renewed, &config))
    }

    /// 분실 처리 (사서/관리자)
    ///
    /// 부과액 = 분실 시점까지의 연체료 + 분실 수수료. 사본은 `lost`가 되고 `total_copies`가 1 줄어듭니다.
    pub async fn mark_lost(&self, transaction_id: &str, actor: &Actor) -> Result<TransactionResponse, AppError> {
        let config = self.config_service.current().await?;
        let tx = self.find_transaction(transaction_id).await?;
        let tx_id = tx.id
            .ok_or_else(|| AppError::InternalError("대출 기록 ID가 없습니다".to_string()))?;

        if !tx.is_open() {
            return Err(AppError::ConflictError(format!(
                "이미 {} 처리된 대출입니다",
                tx.status.as_str()
            )));
        }

        let now = Utc::now();
        let charge = lost_book_charge(to_chrono(tx.due_date), now, config.fine_per_day, config.lost_book_fee);

        let closed = self.transaction_repo
            .close(&tx_id, LoanClosure {
                status: TransactionStatus::Lost,
                closed_at: to_bson(now),
                closed_by: actor.id,
                fine_amount: charge,
            })
            .await?
            .ok_or_else(|| AppError::ConflictError("이미 처리된 대출입니다".to_string()))?;

        match self.copy_repo.update_status(&tx.copy_id, CopyStatus::Issued, CopyStatus::Lost, None).await {
            Ok(Some(_)) => {}
            Ok(None) => log::error!("분실 사본의 상태가 대출 중이 아닙니다 - copy_id: {}", tx.copy_id.to_hex()),
            Err(e) => log::error!("분실 사본 상태 변경 실패 - copy_id: {}, 에러: {}", tx.copy_id.to_hex(), e),
        }

        match self.book_repo.adjust_counters(&tx.book_id, -1, 0).await {
            Ok(Some(_)) => {}
            Ok(None) => log::error!("분실 도서 카운터 조정 실패 - book_id: {}", tx.book_id.to_hex()),
            Err(e) => log::error!("분실 도서 카운터 조정 실패 - book_id: {}, 에러: {}", tx.book_id.to_hex(), e),
        }

        self.audit_service
            .record(
                actor,
                AuditAction::BookLost,
                EntityType::Transaction,
                Some(tx_id.to_hex()),
                Some(json!({
                    "student_id": tx.student_id.to_hex(),
                    "copy_id": tx.copy_id.to_hex(),
                    "fine_amount": charge,
                })),
            )
            .await;

        log::info!("분실 처리 - 대출 기록: {}, 부과액: {}", tx_id.to_hex(), charge);
        Ok(self.respond(closed, &config))
    }

    /// 대출 기록 목록 (사서/관리자)
    pub async fn list_transactions(
        &self,
        query: TransactionListQuery,
    ) -> Result<PagedResponse<TransactionResponse>, AppError> {
        let config = self.config_service.current().await?;
        let now = Utc::now();
        let pagination = Pagination::new(query.page, query.limit);
        let filter = transaction_filter(&query, now)?;

        let (items, total) = self.transaction_repo.find_page(filter, pagination).await?;

        Ok(PagedResponse::new(items, total, pagination)
            .map(|tx| TransactionResponse::from_transaction(tx, now, config.fine_per_day)))
    }

    /// 본인 대출 기록
    pub async fn my_transactions(
        &self,
        user: &AuthenticatedUser,
        query: MyTransactionsQuery,
    ) -> Result<PagedResponse<TransactionResponse>, AppError> {
        let config = self.config_service.current().await?;
        let now = Utc::now();
        let pagination = Pagination::new(query.page, query.limit);

        let mut filter = doc! { "student_id": user.object_id()? };
        if let Some(status) = query.status {
            filter.insert("status", status.as_str());
        }

        let (items, total) = self.transaction_repo.find_page(filter, pagination).await?;

        Ok(PagedResponse::new(items, total, pagination)
            .map(|tx| TransactionResponse::from_transaction(tx, now, config.fine_per_day)))
    }

    /// 대출 기록 단건 조회. 학생은 본인 기록만 볼 수 있습니다.
    pub async fn get_transaction(
        &self,
        transaction_id: &str,
        user: &AuthenticatedUser,
    ) -> Result<TransactionResponse, AppError> {
        let tx = self.find_transaction(transaction_id).await?;

        if !user.is_staff() && tx.student_id != user.object_id()? {
            return Err(AppError::AuthorizationError("본인의 대출 기록만 조회할 수 있습니다".to_string()));
        }

        let config = self.config_service.current().await?;
        Ok(self.respond(tx, &config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_counter_failure_only_releases_claimed_copy() {
        assert_eq!(compensations_for(IssueStep::CounterDecrement), &[Compensation::ReleaseCopy]);
    }

    #[test]
    fn test_insert_failure_restores_counter_before_releasing_copy() {
        assert_eq!(
            compensations_for(IssueStep::TransactionInsert),
            &[Compensation::RestoreAvailableCounter, Compensation::ReleaseCopy]
        );
    }

    fn loan(due: chrono::DateTime<Utc>) -> Transaction {
        Transaction::new(
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            ObjectId::new(),
            to_bson(due - chrono::Duration::days(14)),
            to_bson(due),
        )
    }

    #[test]
    fn test_borrow_limit() {
        assert!(check_borrow_limit(0, 3).is_ok());
        assert!(check_borrow_limit(2, 3).is_ok());
        assert!(matches!(check_borrow_limit(3, 3), Err(AppError::ConflictError(_))));
        assert!(matches!(check_borrow_limit(5, 3), Err(AppError::ConflictError(_))));
    }

    #[test]
    fn test_renewal_rules() {
        let due = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let before_due = Utc.with_ymd_and_hms(2024, 6, 9, 8, 0, 0).unwrap();
        let due_day = Utc.with_ymd_and_hms(2024, 6, 10, 23, 0, 0).unwrap();
        let overdue = Utc.with_ymd_and_hms(2024, 6, 11, 1, 0, 0).unwrap();

        let tx = loan(due);
        assert!(check_renewable(&tx, before_due, 1).is_ok());
        assert!(check_renewable(&tx, due_day, 1).is_ok());
        assert!(check_renewable(&tx, overdue, 1).is_err());
        assert!(check_renewable(&tx, before_due, 0).is_err());

        let mut renewed = loan(due);
        renewed.renew_count = 1;
        assert!(check_renewable(&renewed, before_due, 1).is_err());
        assert!(check_renewable(&renewed, before_due, 2).is_ok());

        let mut returned = loan(due);
        returned.status = TransactionStatus::Returned;
        assert!(check_renewable(&returned, before_due, 5).is_err());
    }

    #[test]
    fn test_overdue_filter_forces_issued_status() {
        let now = Utc.with_ymd_and_hms(2024, 6, 11, 15, 0, 0).unwrap();
        let query = TransactionListQuery {
            status: Some(TransactionStatus::Returned),
            overdue_only: true,
            ..Default::default()
        };

        let filter = transaction_filter(&query, now).unwrap();
        assert_eq!(filter.get_str("status").unwrap(), "issued");

        let due = filter.get_document("due_date").unwrap();
        let cutoff = Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap();
        assert_eq!(due.get_datetime("$lt").unwrap(), &to_bson(cutoff));
    }

    #[test]
    fn test_transaction_filter_rejects_bad_ids() {
        let query = TransactionListQuery { student_id: Some("bad".to_string()), ..Default::default() };
        assert!(matches!(transaction_filter(&query, Utc::now()), Err(AppError::ValidationError(_))));
    }
}
