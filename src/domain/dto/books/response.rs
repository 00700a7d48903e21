//! 도서 카탈로그 응답 DTO

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::books::Book;
use crate::domain::models::book_import::{DuplicateRow, RowError};
use crate::utils::time::to_chrono;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.map(|id| id.to_hex()).unwrap_or_default(),
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            publisher: book.publisher,
            published_year: book.published_year,
            category: book.category,
            description: book.description,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            created_at: to_chrono(book.created_at),
            updated_at: to_chrono(book.updated_at),
        }
    }
}

/// CSV 일괄 등록 결과
#[derive(Debug, Clone, Serialize)]
pub struct BulkUploadResponse {
    /// 헤더를 제외한 데이터 행 수
    pub total_rows: usize,
    pub inserted: usize,
    pub copies_created: usize,
    /// 파일 내 또는 카탈로그에 이미 존재하는 ISBN
    pub duplicates: Vec<DuplicateRow>,
    pub errors: Vec<RowError>,
}
