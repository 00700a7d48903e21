//! CSV 도서 일괄 등록 서비스
//!
//! ```text
//! 본문 크기 확인 → parse_book_csv (헤더/행 검증, 파일 내 중복)
//!   → 카탈로그 ISBN 중복 확인 → 행별 도서 저장 → copies 수만큼 사본 생성
//! ```
//!
//! 행 단위로 독립 처리되어 한 행의 실패가 다른 행의 저장을 막지 않습니다.

use std::sync::Arc;
use serde_json::json;
use singleton_macro::service;
use crate::{
    config::UploadConfig,
    core::errors::AppError,
    domain::{
        dto::books::BulkUploadResponse,
        entities::{
            audit::{AuditAction, EntityType},
            books::Book,
        },
        models::{
            auth::Actor,
            book_import::{parse_book_csv, BookCsvRow, DuplicateRow, RowError},
        },
    },
    repositories::books::BookRepository,
    services::{audit::AuditService, books::CopyService},
};

#[service(name = "bookimport")]
pub struct BookImportService {
    book_repo: Arc<BookRepository>,
    copy_service: Arc<CopyService>,
    audit_service: Arc<AuditService>,
}

/// 업로드 본문 크기 확인
pub fn check_upload_size(len: usize, max_bytes: usize) -> Result<(), AppError> {
    if len == 0 {
        return Err(AppError::ValidationError("CSV 본문이 비어 있습니다".to_string()));
    }
    if len > max_bytes {
        return Err(AppError::ValidationError(format!(
            "CSV 파일 크기가 최대 {}바이트를 초과했습니다",
            max_bytes
        )));
    }
    Ok(())
}

fn book_from_row(row: &BookCsvRow) -> Book {
    let mut book = Book::new(row.isbn.clone(), row.title.clone(), row.author.clone());
    book.publisher = row.publisher.clone();
    book.published_year = row.published_year;
    book.category = row.category.clone();
    book.description = row.description.clone();
    book
}

impl BookImportService {
    pub async fn import_csv(&self, data: &[u8], actor: &Actor) -> Result<BulkUploadResponse, AppError> {
        check_upload_size(data.len(), UploadConfig::csv_max_bytes())?;

        let parsed = parse_book_csv(data, UploadConfig::csv_max_rows())?;

        let isbns: Vec<String> = parsed.rows.iter().map(|row| row.isbn.clone()).collect();
        let existing = self.book_repo.find_existing_isbns(&isbns).await?;

        let mut duplicates = parsed.duplicates;
        let mut errors = parsed.errors;
        let mut inserted = 0usize;
        let mut copies_created = 0usize;

        for row in &parsed.rows {
            if existing.contains(&row.isbn) {
                duplicates.push(DuplicateRow { row: row.row, isbn: row.isbn.clone() });
                continue;
            }

            let book = match self.book_repo.create(book_from_row(row)).await {
                Ok(book) => book,
                Err(AppError::ConflictError(_)) => {
                    duplicates.push(DuplicateRow { row: row.row, isbn: row.isbn.clone() });
                    continue;
                }
                Err(e) => {
                    log::error!("CSV 행 {} 저장 실패: {}", row.row, e);
                    errors.push(RowError { row: row.row, message: "도서를 저장하지 못했습니다".to_string() });
                    continue;
                }
            };
            inserted += 1;

            if row.copies > 0 {
                match self.copy_service.create_copies(&book, row.copies, None).await {
                    Ok((copies, _)) => copies_created += copies.len(),
                    Err(e) => {
                        log::error!("CSV 행 {} 사본 생성 실패: {}", row.row, e);
                        errors.push(RowError {
                            row: row.row,
                            message: "도서는 등록되었으나 사본을 생성하지 못했습니다".to_string(),
                        });
                    }
                }
            }
        }

        duplicates.sort_by_key(|duplicate| duplicate.row);
        errors.sort_by_key(|error| error.row);

        let response = BulkUploadResponse {
            total_rows: parsed.total_rows,
            inserted,
            copies_created,
            duplicates,
            errors,
        };

        self.audit_service
            .record(
                actor,
                AuditAction::BooksImported,
                EntityType::Book,
                None,
                Some(json!({
                    "total_rows": response.total_rows,
                    "inserted": response.inserted,
                    "copies_created": response.copies_created,
                    "duplicates": response.duplicates.len(),
                    "errors": response.errors.len(),
                })),
            )
            .await;

        log::info!(
            "CSV 일괄 등록 완료 - 전체 {}행, 등록 {}권, 중복 {}행, 오류 {}행",
            response.total_rows,
            response.inserted,
            response.duplicates.len(),
            response.errors.len()
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_size_limits() {
        assert!(check_upload_size(10, 100).is_ok());
        assert!(check_upload_size(100, 100).is_ok());
        assert!(matches!(check_upload_size(101, 100), Err(AppError::ValidationError(_))));
        assert!(matches!(check_upload_size(0, 100), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_book_from_row_copies_optional_fields() {
        let row = BookCsvRow {
            row: 2,
            isbn: "9780306406157".to_string(),
            title: "Signals".to_string(),
            author: "Kim".to_string(),
            publisher: Some("Acme".to_string()),
            published_year: Some(2001),
            category: None,
            description: None,
            copies: 3,
        };

        let book = book_from_row(&row);
        assert_eq!(book.isbn, "9780306406157");
        assert_eq!(book.publisher.as_deref(), Some("Acme"));
        assert_eq!(book.published_year, Some(2001));
        assert_eq!(book.total_copies, 0);
    }
}
