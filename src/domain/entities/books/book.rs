//! 도서(카탈로그 항목) 엔티티 (`books` 컬렉션)
//!
//! 한 권의 `Book`은 여러 물리 사본(`BookCopy`)을 가집니다.
//! `total_copies`는 분실되지 않은 사본 수, `available_copies`는 대출 가능한 사본 수이며
//! 항상 `0 <= available_copies <= total_copies`를 만족해야 합니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 정규화된 ISBN (숫자와 `X`만 포함)
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub total_copies: i64,
    pub available_copies: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Book {
    pub fn new(isbn: String, title: String, author: String) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            isbn,
            title,
            author,
            publisher: None,
            published_year: None,
            category: None,
            description: None,
            total_copies: 0,
            available_copies: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// ISBN 입력값 정규화
///
/// 하이픈과 공백을 제거하고 소문자 `x`를 대문자로 바꿉니다.
/// `"978-89-6626-123-4"` → `"9788966261234"`
pub fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// 정규화된 ISBN-10 / ISBN-13 체크섬 검증
pub fn is_valid_isbn(isbn: &str) -> bool {
    let chars: Vec<char> = isbn.chars().collect();

    match chars.len() {
        10 => {
            let mut sum = 0u32;
            for (i, c) in chars.iter().enumerate() {
                let value = match (c, i) {
                    ('X', 9) => 10,
                    (c, _) => match c.to_digit(10) {
                        Some(d) => d,
                        None => return false,
                    },
                };
                sum += value * (10 - i as u32);
            }
            sum % 11 == 0
        }
        13 => {
            let mut sum = 0u32;
            for (i, c) in chars.iter().enumerate() {
                let Some(d) = c.to_digit(10) else {
                    return false;
                };
                sum += if i % 2 == 0 { d } else { d * 3 };
            }
            sum % 10 == 0
        }
        _ => false,
    }
}

/// 정규화 후 검증까지 수행한 ISBN 반환
pub fn parse_isbn(raw: &str) -> Result<String, String> {
    let isbn = normalize_isbn(raw);
    if isbn.is_empty() {
        return Err("ISBN은 필수입니다".to_string());
    }
    if !is_valid_isbn(&isbn) {
        return Err(format!("유효하지 않은 ISBN입니다: {}", raw.trim()));
    }
    Ok(isbn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn(" 978-0-306-40615-7 "), "9780306406157");
        assert_eq!(normalize_isbn("0-8044-2957-x"), "080442957X");
    }

    #[test]
    fn test_isbn_checksums() {
        assert!(is_valid_isbn("9780306406157"));
        assert!(is_valid_isbn("0306406152"));
        assert!(is_valid_isbn("080442957X"));

        assert!(!is_valid_isbn("9780306406158"));
        assert!(!is_valid_isbn("0306406153"));
        assert!(!is_valid_isbn("X306406152"));
        assert!(!is_valid_isbn("12345"));
    }

    #[test]
    fn test_parse_isbn_reports_reason() {
        assert_eq!(parse_isbn("978-0-306-40615-7"), Ok("9780306406157".to_string()));
        assert!(parse_isbn("   ").unwrap_err().contains("필수"));
        assert!(parse_isbn("978-0-306-40615-8").unwrap_err().contains("유효하지 않은"));
    }

    #[test]
    fn test_new_book_has_no_copies() {
        let book = Book::new("9780306406157".to_string(), "제목".to_string(), "저자".to_string());
        assert_eq!(book.total_copies, 0);
        assert!(!book.is_available());
    }
}
