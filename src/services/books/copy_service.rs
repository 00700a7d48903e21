//! 도서 사본 서비스
//!
//! 사본 추가/삭제와 수동 상태 변경, 그리고 그에 따른 도서 카운터 조정을 담당합니다.
//! 대출(`issued`)로의 전이와 그 해제는 [`CirculationService`](crate::services::circulation::CirculationService)만 수행합니다.

use std::sync::Arc;
use mongodb::bson::oid::ObjectId;
use serde_json::json;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::copies::{AddCopiesRequest, CopyListQuery, CopyResponse, UpdateCopyStatusRequest},
        entities::{
            audit::{AuditAction, EntityType},
            books::{counter_delta, Book, BookCopy, CopyStatus},
        },
        models::auth::Actor,
    },
    repositories::books::{BookCopyRepository, BookRepository},
    services::audit::AuditService,
    utils::string_utils::{clean_optional_string, parse_object_id},
};

#[service(name = "copy")]
pub struct CopyService {
    book_repo: Arc<BookRepository>,
    copy_repo: Arc<BookCopyRepository>,
    audit_service: Arc<AuditService>,
}

/// 수동 상태 변경 요청 검사
fn check_manual_transition(from: CopyStatus, to: CopyStatus) -> Result<(), AppError> {
    if from == CopyStatus::Issued || to == CopyStatus::Issued {
        return Err(AppError::ConflictError(
            "대출 상태는 대출/반납 처리로만 변경할 수 있습니다".to_string(),
        ));
    }

    if from == to {
        return Err(AppError::ConflictError(format!("이미 {} 상태입니다", to)));
    }

    if !from.can_transition_manually(to) {
        return Err(AppError::ConflictError(format!(
            "{} 상태에서 {} 상태로 변경할 수 없습니다",
            from, to
        )));
    }

    Ok(())
}

impl CopyService {
    /// 도서에 `count`개의 사본을 만들고 카운터를 올립니다. 갱신된 도서를 함께 반환합니다.
    pub async fn create_copies(
        &self,
        book: &Book,
        count: u32,
        shelf_location: Option<String>,
    ) -> Result<(Vec<BookCopy>, Book), AppError> {
        let book_id = book.id
            .ok_or_else(|| AppError::InternalError("도서 ID가 없습니다".to_string()))?;

        let copies: Vec<BookCopy> = (0..count)
            .map(|_| BookCopy::new(book_id, &book.isbn, shelf_location.clone()))
            .collect();

        let created = self.copy_repo.insert_many(copies).await?;
        let added = created.len() as i64;

        match self.book_repo.adjust_counters(&book_id, added, added).await? {
            Some(updated) => Ok((created, updated)),
            None => {
                // 그 사이 도서가 삭제된 경우
                let ids: Vec<ObjectId> = created.iter().filter_map(|copy| copy.id).collect();
                if let Err(e) = self.copy_repo.delete_by_ids(&ids).await {
                    log::error!("고아 사본 정리 실패 - book_id: {}, 에러: {}", book_id.to_hex(), e);
                }
                Err(AppError::NotFound("도서를 찾을 수 없습니다".to_string()))
            }
        }
    }

    async fn find_book(&self, book_id: &str) -> Result<Book, AppError> {
        let object_id = parse_object_id(book_id, "도서 ID")?;
        self.book_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("도서를 찾을 수 없습니다".to_string()))
    }

    async fn find_copy(&self, copy_id: &str) -> Result<BookCopy, AppError> {
        let object_id = parse_object_id(copy_id, "사본 ID")?;
        self.copy_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("사본을 찾을 수 없습니다".to_string()))
    }

    pub async fn add_copies(
        &self,
        book_id: &str,
        request: AddCopiesRequest,
        actor: &Actor,
    ) -> Result<Vec<CopyResponse>, AppError> {
        let book = self.find_book(book_id).await?;
        let (created, updated) = self
            .create_copies(&book, request.count, clean_optional_string(request.shelf_location))
            .await?;

        self.audit_service
            .record(
                actor,
                AuditAction::CopiesAdded,
                EntityType::Book,
                book.id_string(),
                Some(json!({
                    "count": created.len(),
                    "total_copies": updated.total_copies,
                    "barcodes": created.iter().map(|copy| copy.barcode.as_str()).collect::<Vec<_>>(),
                })),
            )
            .await;

        log::info!("사본 {}권 추가 - 도서: {} ({})", created.len(), book.title, book.isbn);
        Ok(created.into_iter().map(CopyResponse::from).collect())
    }

    pub async fn list_copies(&self, book_id: &str, query: CopyListQuery) -> Result<Vec<CopyResponse>, AppError> {
        let book = self.find_book(book_id).await?;
        let book_id = book.id
            .ok_or_else(|| AppError::InternalError("도서 ID가 없습니다".to_string()))?;

        let copies = self.copy_repo.find_by_book(&book_id, query.status).await?;
        Ok(copies.into_iter().map(CopyResponse::from).collect())
    }

    pub async fn get_copy(&self, copy_id: &str) -> Result<CopyResponse, AppError> {
        Ok(CopyResponse::from(self.find_copy(copy_id).await?))
    }

    /// 수동 상태 변경 (파손, 분실, 분실 회수)
    pub async fn update_status(
        &self,
        copy_id: &str,
        request: UpdateCopyStatusRequest,
        actor: &Actor,
    ) -> Result<CopyResponse, AppError> {
        let copy = self.find_copy(copy_id).await?;
        let from = copy.status;
        let to = request.status;

        check_manual_transition(from, to)?;

        let copy_oid = copy.id
            .ok_or_else(|| AppError::InternalError("사본 ID가 없습니다".to_string()))?;

        let updated = self.copy_repo
            .update_status(&copy_oid, from, to, clean_optional_string(request.condition_note))
            .await?
            .ok_or_else(|| AppError::ConflictError("사본 상태가 그 사이 변경되었습니다. 다시 시도해 주세요".to_string()))?;

        let (total_delta, available_delta) = counter_delta(from, to);
        if total_delta != 0 || available_delta != 0 {
            let adjusted = self.book_repo
                .adjust_counters(&copy.book_id, total_delta, available_delta)
                .await?;
            if adjusted.is_none() {
                log::error!(
                    "도서 카운터 조정 실패 - book_id: {}, delta: ({}, {})",
                    copy.book_id.to_hex(),
                    total_delta,
                    available_delta
                );
            }
        }

        self.audit_service
            .record(
                actor,
                AuditAction::CopyStatusChanged,
                EntityType::BookCopy,
                Some(copy_oid.to_hex()),
                Some(json!({ "barcode": copy.barcode, "from": from.as_str(), "to": to.as_str() })),
            )
            .await;

        Ok(CopyResponse::from(updated))
    }

    /// 대출 중이 아닌 사본 삭제
    pub async fn delete_copy(&self, copy_id: &str, actor: &Actor) -> Result<(), AppError> {
        let copy = self.find_copy(copy_id).await?;
        let copy_oid = copy.id
            .ok_or_else(|| AppError::InternalError("사본 ID가 없습니다".to_string()))?;

        let deleted = self.copy_repo
            .delete_unless_issued(&copy_oid)
            .await?
            .ok_or_else(|| AppError::ConflictError("대출 중인 사본은 삭제할 수 없습니다".to_string()))?;

        let total_delta = -(deleted.status.counts_toward_total() as i64);
        let available_delta = -(deleted.status.counts_as_available() as i64);
        if total_delta != 0 || available_delta != 0 {
            if self.book_repo.adjust_counters(&deleted.book_id, total_delta, available_delta).await?.is_none() {
                log::error!("사본 삭제 후 카운터 조정 실패 - book_id: {}", deleted.book_id.to_hex());
            }
        }

        self.audit_service
            .record(
                actor,
                AuditAction::CopyDeleted,
                EntityType::BookCopy,
                Some(copy_oid.to_hex()),
                Some(json!({ "barcode": deleted.barcode, "book_id": deleted.book_id.to_hex() })),
            )
            .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_is_never_set_manually() {
        assert!(check_manual_transition(CopyStatus::Available, CopyStatus::Issued).is_err());
        assert!(check_manual_transition(CopyStatus::Issued, CopyStatus::Available).is_err());
        assert!(check_manual_transition(CopyStatus::Issued, CopyStatus::Lost).is_err());
    }

    #[test]
    fn test_allowed_manual_transitions() {
        assert!(check_manual_transition(CopyStatus::Available, CopyStatus::Damaged).is_ok());
        assert!(check_manual_transition(CopyStatus::Damaged, CopyStatus::Lost).is_ok());
        assert!(check_manual_transition(CopyStatus::Lost, CopyStatus::Available).is_ok());
    }

    #[test]
    fn test_rejected_manual_transitions_are_conflicts() {
        assert!(matches!(
            check_manual_transition(CopyStatus::Lost, CopyStatus::Damaged),
            Err(AppError::ConflictError(_))
        ));
        assert!(matches!(
            check_manual_transition(CopyStatus::Damaged, CopyStatus::Damaged),
            Err(AppError::ConflictError(_))
        ));
    }
}
