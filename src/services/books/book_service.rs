//! 도서 카탈로그 서비스

use std::sync::Arc;
use mongodb::bson::{doc, Bson, Document};
use serde_json::json;
use singleton_macro::service;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            books::{BookListQuery, BookResponse, CreateBookRequest, UpdateBookRequest},
            PagedResponse, Pagination,
        },
        entities::{
            audit::{AuditAction, EntityType},
            books::{parse_isbn, Book, CopyStatus},
        },
        models::auth::Actor,
    },
    repositories::books::{BookCopyRepository, BookRepository},
    services::{audit::AuditService, books::CopyService},
    utils::string_utils::{clean_optional_string, escape_regex, parse_object_id},
};

#[service(name = "book")]
pub struct BookService {
    book_repo: Arc<BookRepository>,
    copy_repo: Arc<BookCopyRepository>,
    copy_service: Arc<CopyService>,
    audit_service: Arc<AuditService>,
}

impl BookService {
    pub async fn create_book(&self, request: CreateBookRequest, actor: &Actor) -> Result<BookResponse, AppError> {
        let isbn = parse_isbn(&request.isbn).map_err(AppError::ValidationError)?;

        if self.book_repo.find_by_isbn(&isbn).await?.is_some() {
            return Err(AppError::ConflictError(format!("이미 등록된 ISBN입니다: {}", isbn)));
        }

        let mut book = Book::new(isbn, request.title.trim().to_string(), request.author.trim().to_string());
        book.publisher = clean_optional_string(request.publisher);
        book.published_year = request.published_year;
        book.category = clean_optional_string(request.category);
        book.description = clean_optional_string(request.description);

        let mut book = self.book_repo.create(book).await?;

        if request.initial_copies > 0 {
            let (_, updated) = self.copy_service
                .create_copies(&book, request.initial_copies, clean_optional_string(request.shelf_location))
                .await?;
            book = updated;
        }

        self.audit_service
            .record(
                actor,
                AuditAction::BookCreated,
                EntityType::Book,
                book.id_string(),
                Some(json!({ "isbn": book.isbn, "title": book.title, "initial_copies": request.initial_copies })),
            )
            .await;

        log::info!("도서 등록 - {} ({}), 사본 {}권", book.title, book.isbn, book.total_copies);
        Ok(BookResponse::from(book))
    }

    pub async fn list_books(&self, query: BookListQuery) -> Result<PagedResponse<BookResponse>, AppError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (books, total) = self.book_repo.find_page(book_filter(&query), pagination).await?;

        Ok(PagedResponse::new(books, total, pagination).map(BookResponse::from))
    }

    pub async fn get_book(&self, id: &str) -> Result<BookResponse, AppError> {
        Ok(BookResponse::from(self.find_book(id).await?))
    }

    pub async fn find_book(&self, id: &str) -> Result<Book, AppError> {
        let object_id = parse_object_id(id, "도서 ID")?;
        self.book_repo
            .find_by_id(&object_id)
            .await?
            .ok_or_else(|| AppError::NotFound("도서를 찾을 수 없습니다".to_string()))
    }

    /// 설명 필드 부분 수정. 카운터는 이 경로로 바뀌지 않습니다.
    pub async fn update_book(
        &self,
        id: &str,
        request: UpdateBookRequest,
        actor: &Actor,
    ) -> Result<BookResponse, AppError> {
        if request.is_empty() {
            return Err(AppError::ValidationError("변경할 항목이 없습니다".to_string()));
        }

        let book = self.find_book(id).await?;
        let book_id = book.id
            .ok_or_else(|| AppError::InternalError("도서 ID가 없습니다".to_string()))?;

        let mut update = doc! {};

        if let Some(ref raw) = request.isbn {
            let isbn = parse_isbn(raw).map_err(AppError::ValidationError)?;
            if isbn != book.isbn {
                if let Some(existing) = self.book_repo.find_by_isbn(&isbn).await? {
                    if existing.id != book.id {
                        return Err(AppError::ConflictError(format!("이미 등록된 ISBN입니다: {}", isbn)));
                    }
                }
                update.insert("isbn", isbn);
            }
        }
        if let Some(ref title) = request.title {
            update.insert("title", title.trim());
        }
        if let Some(ref author) = request.author {
            update.insert("author", author.trim());
        }
        if let Some(publisher) = clean_optional_string(request.publisher.clone()) {
            update.insert("publisher", publisher);
        }
        if let Some(year) = request.published_year {
            update.insert("published_year", year);
        }
        if let Some(category) = clean_optional_string(request.category.clone()) {
            update.insert("category", category);
        }
        if let Some(description) = clean_optional_string(request.description.clone()) {
            update.insert("description", description);
        }

        let changed: Vec<String> = update.keys().cloned().collect();

        let updated = self.book_repo
            .update(&book_id, update)
            .await?
            .ok_or_else(|| AppError::NotFound("도서를 찾을 수 없습니다".to_string()))?;

        self.audit_service
            .record(
                actor,
                AuditAction::BookUpdated,
                EntityType::Book,
                Some(book_id.to_hex()),
                Some(json!({ "fields": changed })),
            )
            .await;

        Ok(BookResponse::from(updated))
    }

    /// 대출 중인 사본이 없을 때만 도서와 모든 사본을 삭제합니다.
    pub async fn delete_book(&self, id: &str, actor: &Actor) -> Result<(), AppError> {
        let book = self.find_book(id).await?;
        let book_id = book.id
            .ok_or_else(|| AppError::InternalError("도서 ID가 없습니다".to_string()))?;

        let issued = self.copy_repo.count_by_status(&book_id, CopyStatus::Issued).await?;
        if issued > 0 {
            return Err(AppError::ConflictError(format!(
                "대출 중인 사본이 {}권 있어 삭제할 수 없습니다",
                issued
            )));
        }

        let removed_copies = self.copy_repo.delete_by_book(&book_id).await?;

        if !self.book_repo.delete(&book_id).await? {
            return Err(AppError::NotFound("도서를 찾을 수 없습니다".to_string()));
        }

        self.audit_service
            .record(
                actor,
                AuditAction::BookDeleted,
                EntityType::Book,
                Some(book_id.to_hex()),
                Some(json!({ "isbn": book.isbn, "title": book.title, "copies_removed": removed_copies })),
            )
            .await;

        log::info!("도서 삭제 - {} ({}), 사본 {}권 제거", book.title, book.isbn, removed_copies);
        Ok(())
    }
}

fn book_filter(query: &BookListQuery) -> Document {
    let mut filter = doc! {};

    if let Some(ref search) = query.search {
        let pattern = escape_regex(search.trim());
        let conditions: Vec<Bson> = ["title", "author", "isbn"]
            .iter()
            .map(|field| {
                let mut condition = Document::new();
                condition.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
                Bson::Document(condition)
            })
            .collect();
        filter.insert("$or", conditions);
    }
    if let Some(ref category) = query.category {
        let pattern = format!("^{}$", escape_regex(category.trim()));
        filter.insert("category", doc! { "$regex": pattern, "$options": "i" });
    }
    if query.available_only {
        filter.insert("available_copies", doc! { "$gt": 0 });
    }

    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_filter_search_and_availability() {
        let query = BookListQuery {
            search: Some("rust (2nd)".to_string()),
            category: Some("Programming".to_string()),
            available_only: true,
            ..Default::default()
        };

        let filter = book_filter(&query);

        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 3);
        let title = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), "rust \\(2nd\\)");

        let category = filter.get_document("category").unwrap();
        assert_eq!(category.get_str("$regex").unwrap(), "^Programming$");
        assert_eq!(filter.get_document("available_copies").unwrap(), &doc! { "$gt": 0 });
    }

    #[test]
    fn test_book_filter_defaults_to_all() {
        assert!(book_filter(&BookListQuery::default()).is_empty());
    }
}
