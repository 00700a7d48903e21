//! # 도서 사본 리포지토리
//!
//! 사본 상태 전이는 모두 "현재 상태"를 필터 조건으로 포함하는 `find_one_and_update`로
//! 수행되어, 동시에 같은 사본을 대출하려는 두 요청 중 하나만 성공합니다.

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
    domain::entities::books::{BookCopy, CopyStatus},
    repositories::{find_all, is_duplicate_key},
};

#[repository(name = "bookcopy", collection = "book_copies")]
pub struct BookCopyRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

impl BookCopyRepository {
    fn after_update() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<BookCopy>, AppError> {
        self.collection::<BookCopy>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 사본 일괄 저장. 저장된 ID가 채워진 사본 목록을 반환합니다.
    pub async fn insert_many(&self, mut copies: Vec<BookCopy>) -> Result<Vec<BookCopy>, AppError> {
        if copies.is_empty() {
            return Ok(copies);
        }

        let result = self.collection::<BookCopy>()
            .insert_many(&copies)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::ConflictError("바코드가 중복되었습니다. 다시 시도해 주세요".to_string())
                } else {
                    AppError::DatabaseError(e.to_string())
                }
            })?;

        for (index, id) in result.inserted_ids {
            if let Some(copy) = copies.get_mut(index) {
                copy.id = id.as_object_id();
            }
        }

        Ok(copies)
    }

    pub async fn find_by_book(
        &self,
        book_id: &ObjectId,
        status: Option<CopyStatus>,
    ) -> Result<Vec<BookCopy>, AppError> {
        let mut filter = doc! { "book_id": book_id };
        if let Some(status) = status {
            filter.insert("status", status.as_str());
        }

        find_all(&self.collection::<BookCopy>(), filter, doc! { "acquired_at": 1, "_id": 1 }).await
    }

    pub async fn count_by_status(&self, book_id: &ObjectId, status: CopyStatus) -> Result<u64, AppError> {
        self.collection::<BookCopy>()
            .count_documents(doc! { "book_id": book_id, "status": status.as_str() })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 지정한 사본을 `available → issued`로 점유
    pub async fn claim_by_id(&self, id: &ObjectId) -> Result<Option<BookCopy>, AppError> {
        self.transition(
            doc! { "_id": id, "status": CopyStatus::Available.as_str() },
            CopyStatus::Issued,
            None,
        )
        .await
    }

    /// 도서의 대출 가능한 사본 중 가장 먼저 입고된 것을 점유
    pub async fn claim_available_for_book(&self, book_id: &ObjectId) -> Result<Option<BookCopy>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .sort(doc! { "acquired_at": 1, "_id": 1 })
            .build();

        self.collection::<BookCopy>()
            .find_one_and_update(
                doc! { "book_id": book_id, "status": CopyStatus::Available.as_str() },
                doc! { "$set": { "status": CopyStatus::Issued.as_str(), "updated_at": DateTime::now() } },
            )
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 현재 상태가 `from`일 때만 `to`로 변경합니다.
    pub async fn update_status(
        &self,
        id: &ObjectId,
        from: CopyStatus,
        to: CopyStatus,
        condition_note: Option<String>,
    ) -> Result<Option<BookCopy>, AppError> {
        self.transition(doc! { "_id": id, "status": from.as_str() }, to, condition_note).await
    }

    async fn transition(
        &self,
        filter: Document,
        to: CopyStatus,
        condition_note: Option<String>,
    ) -> Result<Option<BookCopy>, AppError> {
        let mut set = doc! { "status": to.as_str(), "updated_at": DateTime::now() };
        if let Some(note) = condition_note {
            set.insert("condition_note", note);
        }

        self.collection::<BookCopy>()
            .find_one_and_update(filter, doc! { "$set": set })
            .with_options(Self::after_update())
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 대출 중이 아닌 사본만 삭제합니다. 삭제된 사본을 반환합니다.
    pub async fn delete_unless_issued(&self, id: &ObjectId) -> Result<Option<BookCopy>, AppError> {
        self.collection::<BookCopy>()
            .find_one_and_delete(doc! { "_id": id, "status": { "$ne": CopyStatus::Issued.as_str() } })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn delete_by_book(&self, book_id: &ObjectId) -> Result<u64, AppError> {
        let result = self.collection::<BookCopy>()
            .delete_many(doc! { "book_id": book_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.deleted_count)
    }

    pub async fn delete_by_ids(&self, ids: &[ObjectId]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = self.collection::<BookCopy>()
            .delete_many(doc! { "_id": { "$in": ids } })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.deleted_count)
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<BookCopy>();

        let barcode_index = IndexModel::builder()
            .keys(doc! { "barcode": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("barcode_unique".to_string())
                .build())
            .build();

        let book_status_index = IndexModel::builder()
            .keys(doc! { "book_id": 1, "status": 1 })
            .options(IndexOptions::builder()
                .name("book_status".to_string())
                .build())
            .build();

        collection
            .create_indexes([barcode_index, book_status_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
