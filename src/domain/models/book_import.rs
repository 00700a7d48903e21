//! 도서 CSV 일괄 등록 파싱
//!
//! 헤더 행이 필수이며 열 이름은 대소문자를 구분하지 않습니다.
//!
//! | 열 | 필수 | 형식 |
//! |----|------|------|
//! | `isbn` | ✓ | ISBN-10 / ISBN-13 (하이픈 허용) |
//! | `title` | ✓ | 1-300자 |
//! | `author` | ✓ | 1-200자 |
//! | `publisher` | | 문자열 |
//! | `published_year` | | 1-9999 정수 |
//! | `category` | | 문자열 |
//! | `description` | | 문자열 |
//! | `copies` | | 0-100 정수 (기본 0) |
//!
//! 행 번호는 헤더를 1행으로 하는 파일 기준 줄 번호입니다 (첫 데이터 행 = 2).
//! 빈 줄은 건너뛰고, 따옴표 안에서 여러 줄에 걸친 레코드는 시작 줄 번호로 보고합니다.
//! 이 모듈은 파일 내부 검증만 담당하며, 카탈로그에 이미 있는 ISBN 확인은 서비스 계층에서 합니다.

use std::collections::HashSet;
use serde::Serialize;
use crate::core::errors::AppError;
use crate::domain::entities::books::parse_isbn;

pub const MAX_COPIES_PER_ROW: u32 = 100;

const REQUIRED_COLUMNS: [&str; 3] = ["isbn", "title", "author"];

/// 검증을 통과한 CSV 행
#[derive(Debug, Clone, PartialEq)]
pub struct BookCsvRow {
    pub row: usize,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub published_year: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub copies: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRow {
    pub row: usize,
    pub isbn: String,
}

/// 파싱 결과
#[derive(Debug, Default)]
pub struct ParsedBookCsv {
    pub total_rows: usize,
    pub rows: Vec<BookCsvRow>,
    pub duplicates: Vec<DuplicateRow>,
    pub errors: Vec<RowError>,
}

/// 헤더 이름 → 열 위치
struct ColumnMap {
    isbn: usize,
    title: usize,
    author: usize,
    publisher: Option<usize>,
    published_year: Option<usize>,
    category: Option<usize>,
    description: Option<usize>,
    copies: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, AppError> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();
        let position = |name: &str| names.iter().position(|h| h == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| position(column).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::ValidationError(format!(
                "CSV 헤더에 필수 열이 없습니다: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            isbn: position("isbn").unwrap_or_default(),
            title: position("title").unwrap_or_default(),
            author: position("author").unwrap_or_default(),
            publisher: position("publisher"),
            published_year: position("published_year"),
            category: position("category"),
            description: position("description"),
            copies: position("copies"),
        })
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize) -> &'r str {
    record.get(index).map(str::trim).unwrap_or("")
}

fn optional_field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .map(|i| field(record, i))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required_text(record: &csv::StringRecord, index: usize, name: &str, max_chars: usize) -> Result<String, String> {
    let value = field(record, index);
    if value.is_empty() {
        return Err(format!("{}은(는) 필수입니다", name));
    }
    if value.chars().count() > max_chars {
        return Err(format!("{}은(는) {}자 이하여야 합니다", name, max_chars));
    }
    Ok(value.to_string())
}

fn parse_row(record: &csv::StringRecord, columns: &ColumnMap, row: usize) -> Result<BookCsvRow, String> {
    let isbn = parse_isbn(field(record, columns.isbn))?;
    let title = required_text(record, columns.title, "title", 300)?;
    let author = required_text(record, columns.author, "author", 200)?;

    let published_year = match optional_field(record, columns.published_year) {
        Some(raw) => match raw.parse::<i32>() {
            Ok(year) if (1..=9999).contains(&year) => Some(year),
            _ => return Err(format!("published_year 값이 올바르지 않습니다: {}", raw)),
        },
        None => None,
    };

    let copies = match optional_field(record, columns.copies) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n <= MAX_COPIES_PER_ROW => n,
            _ => {
                return Err(format!(
                    "copies 값은 0-{} 사이의 정수여야 합니다: {}",
                    MAX_COPIES_PER_ROW, raw
                ))
            }
        },
        None => 0,
    };

    Ok(BookCsvRow {
        row,
        isbn,
        title,
        author,
        publisher: optional_field(record, columns.publisher),
        published_year,
        category: optional_field(record, columns.category),
        description: optional_field(record, columns.description),
        copies,
    })
}

/// CSV 본문을 파싱하고 행별로 검증합니다.
///
/// 헤더 누락/필수 열 누락/행 수 초과는 파일 전체 오류(`ValidationError`)이고,
/// 개별 행의 형식 오류와 파일 내 ISBN 중복은 결과에 담겨 보고됩니다.
pub fn parse_book_csv(data: &[u8], max_rows: usize) -> Result<ParsedBookCsv, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ValidationError(format!("CSV 헤더를 읽을 수 없습니다: {}", e)))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::ValidationError("CSV 헤더 행이 비어 있습니다".to_string()));
    }
    let columns = ColumnMap::from_headers(&headers)?;

    let mut parsed = ParsedBookCsv::default();
    let mut seen_isbns = HashSet::new();

    for (index, result) in reader.records().enumerate() {
        let position = match &result {
            Ok(record) => record.position(),
            Err(e) => e.position(),
        };
        let row = position.map_or(index + 2, |p| p.line() as usize);
        parsed.total_rows += 1;
        if parsed.total_rows > max_rows {
            return Err(AppError::ValidationError(format!(
                "CSV 행 수가 최대 {}행을 초과했습니다",
                max_rows
            )));
        }

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                parsed.errors.push(RowError { row, message: format!("CSV 형식 오류: {}", e) });
                continue;
            }
        };

        match parse_row(&record, &columns, row) {
            Ok(book) => {
                if seen_isbns.insert(book.isbn.clone()) {
                    parsed.rows.push(book);
                } else {
                    parsed.duplicates.push(DuplicateRow { row, isbn: book.isbn });
                }
            }
            Err(message) => parsed.errors.push(RowError { row, message }),
        }
    }

    if parsed.total_rows == 0 {
        return Err(AppError::ValidationError("CSV에 데이터 행이 없습니다".to_string()));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_required_and_optional_columns() {
        let csv = "ISBN,Title,Author,Publisher,published_year,copies\n\
                   978-0-306-40615-7,Signals,Kim,Hanbit,2019,2\n\
                   0306406152, Another , Lee ,,,\n";
        let parsed = parse_book_csv(csv.as_bytes(), 100).unwrap();

        assert_eq!(parsed.total_rows, 2);
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.rows.len(), 2);

        let first = &parsed.rows[0];
        assert_eq!(first.row, 2);
        assert_eq!(first.isbn, "9780306406157");
        assert_eq!(first.publisher.as_deref(), Some("Hanbit"));
        assert_eq!(first.published_year, Some(2019));
        assert_eq!(first.copies, 2);

        let second = &parsed.rows[1];
        assert_eq!(second.title, "Another");
        assert_eq!(second.publisher, None);
        assert_eq!(second.copies, 0);
    }

    #[test]
    fn test_missing_required_column_rejects_file() {
        let err = parse_book_csv(b"isbn,title\n9780306406157,Signals\n", 100).unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert!(msg.contains("author")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_header_only_file_is_rejected() {
        assert!(matches!(
            parse_book_csv(b"isbn,title,author\n", 100),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(parse_book_csv(b"", 100), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_row_errors_are_reported_with_row_numbers() {
        let csv = "isbn,title,author,published_year,copies\n\
                   9780306406157,Good,Kim,2020,1\n\
                   12345,Bad Isbn,Kim,,\n\
                   0306406152,,Lee,,\n\
                   080442957X,Year,Park,20x0,\n\
                   9780306406157X,Copies,Choi,,\n";
        let parsed = parse_book_csv(csv.as_bytes(), 100).unwrap();

        assert_eq!(parsed.total_rows, 5);
        assert_eq!(parsed.rows.len(), 1);
        let rows: Vec<usize> = parsed.errors.iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![3, 4, 5, 6]);
        assert!(parsed.errors[1].message.contains("title"));
        assert!(parsed.errors[2].message.contains("published_year"));
    }

    #[test]
    fn test_row_numbers_follow_file_lines() {
        let csv = "isbn,title,author,description\n\
                   9780306406157,Good,Kim,\"first line\nsecond line\"\n\
                   \n\
                   12345,Bad,Lee,\n\
                   0306406152,Fine,Park,\n";
        let parsed = parse_book_csv(csv.as_bytes(), 100).unwrap();

        assert_eq!(parsed.total_rows, 3);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[0].row, 2);
        assert_eq!(parsed.rows[0].description.as_deref(), Some("first line\nsecond line"));
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].row, 5);
        assert_eq!(parsed.rows[1].row, 6);
    }

    #[test]
    fn test_copies_out_of_range() {
        let csv = "isbn,title,author,copies\n9780306406157,Many,Kim,101\n";
        let parsed = parse_book_csv(csv.as_bytes(), 100).unwrap();
        assert!(parsed.rows.is_empty());
        assert!(parsed.errors[0].message.contains("copies"));
    }

    #[test]
    fn test_duplicate_isbn_within_file() {
        let csv = "isbn,title,author\n\
                   9780306406157,First,Kim\n\
                   978-0306406157,Again,Lee\n";
        let parsed = parse_book_csv(csv.as_bytes(), 100).unwrap();

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.duplicates, vec![DuplicateRow { row: 3, isbn: "9780306406157".to_string() }]);
    }

    #[test]
    fn test_row_limit() {
        let mut csv = String::from("isbn,title,author\n");
        for _ in 0..3 {
            csv.push_str("9780306406157,T,A\n");
        }
        assert!(matches!(parse_book_csv(csv.as_bytes(), 2), Err(AppError::ValidationError(_))));
        assert!(parse_book_csv(csv.as_bytes(), 3).is_ok());
    }
}
