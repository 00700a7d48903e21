//! # 도서 리포지토리
//!
//! `books` 컬렉션의 CRUD와 사본 카운터(`total_copies`, `available_copies`)의
//! 원자적 증감을 담당합니다.

use std::collections::HashSet;
use std::sync::Arc;
use futures_util::TryStreamExt;
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
    domain::{dto::Pagination, entities::books::Book},
    repositories::{find_paged, is_duplicate_key},
};

#[repository(name = "book", collection = "books")]
pub struct BookRepository {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
}

fn duplicate_isbn(e: mongodb::error::Error) -> AppError {
    if is_duplicate_key(&e) {
        AppError::ConflictError("이미 등록된 ISBN입니다".to_string())
    } else {
        AppError::DatabaseError(e.to_string())
    }
}

/// 카운터 증감 시 결과가 음수가 되지 않도록 필터에 붙일 조건
fn counter_guard(id: &ObjectId, total_delta: i64, available_delta: i64) -> Document {
    let mut filter = doc! { "_id": id };
    if total_delta < 0 {
        filter.insert("total_copies", doc! { "$gte": -total_delta });
    }
    if available_delta < 0 {
        filter.insert("available_copies", doc! { "$gte": -available_delta });
    }
    filter
}

impl BookRepository {
    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Book>, AppError> {
        self.collection::<Book>()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        self.collection::<Book>()
            .find_one(doc! { "isbn": isbn })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 주어진 ISBN 중 이미 카탈로그에 존재하는 것들
    pub async fn find_existing_isbns(&self, isbns: &[String]) -> Result<HashSet<String>, AppError> {
        if isbns.is_empty() {
            return Ok(HashSet::new());
        }

        let books = self.collection::<Book>()
            .find(doc! { "isbn": { "$in": isbns } })
            .await?
            .try_collect::<Vec<Book>>()
            .await?;

        Ok(books.into_iter().map(|book| book.isbn).collect())
    }

    pub async fn create(&self, mut book: Book) -> Result<Book, AppError> {
        let result = self.collection::<Book>()
            .insert_one(&book)
            .await
            .map_err(duplicate_isbn)?;

        book.id = result.inserted_id.as_object_id();
        Ok(book)
    }

    /// 설명 필드 부분 수정. ISBN 변경이 유니크 인덱스에 걸리면 409입니다.
    pub async fn update(&self, id: &ObjectId, mut update_doc: Document) -> Result<Option<Book>, AppError> {
        update_doc.insert("updated_at", DateTime::now());

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Book>()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": update_doc })
            .with_options(options)
            .await
            .map_err(duplicate_isbn)
    }

    /// 사본 카운터 원자적 증감
    ///
    /// 감소 방향 카운터가 부족하면 갱신하지 않고 `Ok(None)`을 반환합니다.
    pub async fn adjust_counters(
        &self,
        id: &ObjectId,
        total_delta: i64,
        available_delta: i64,
    ) -> Result<Option<Book>, AppError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Book>()
            .find_one_and_update(
                counter_guard(id, total_delta, available_delta),
                doc! {
                    "$inc": { "total_copies": total_delta, "available_copies": available_delta },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .with_options(options)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    pub async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self.collection::<Book>()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }

    /// 제목순 목록
    pub async fn find_page(&self, filter: Document, pagination: Pagination) -> Result<(Vec<Book>, u64), AppError> {
        find_paged(
            &self.collection::<Book>(),
            filter,
            doc! { "title": 1, "_id": 1 },
            pagination,
        )
        .await
    }

    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<Book>();

        let isbn_index = IndexModel::builder()
            .keys(doc! { "isbn": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("isbn_unique".to_string())
                .build())
            .build();

        let title_index = IndexModel::builder()
            .keys(doc! { "title": 1 })
            .options(IndexOptions::builder()
                .name("title".to_string())
                .build())
            .build();

        let category_index = IndexModel::builder()
            .keys(doc! { "category": 1 })
            .options(IndexOptions::builder()
                .name("category".to_string())
                .build())
            .build();

        collection
            .create_indexes([isbn_index, title_index, category_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_guard_only_for_decrements() {
        let id = ObjectId::new();

        let increment = counter_guard(&id, 2, 2);
        assert_eq!(increment, doc! { "_id": id });

        let issue = counter_guard(&id, 0, -1);
        assert_eq!(issue, doc! { "_id": id, "available_copies": { "$gte": 1_i64 } });

        let lost = counter_guard(&id, -1, -1);
        assert_eq!(
            lost,
            doc! { "_id": id, "total_copies": { "$gte": 1_i64 }, "available_copies": { "$gte": 1_i64 } }
        );
    }
}
