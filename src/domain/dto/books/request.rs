//! 도서 카탈로그 요청 DTO

use serde::Deserialize;
use validator::Validate;
use crate::utils::string_utils::deserialize_optional_string;

/// 도서 등록 요청
///
/// `initial_copies`가 1 이상이면 해당 수만큼 사본도 함께 생성합니다.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 20, message = "ISBN은 1-20자 사이여야 합니다"))]
    pub isbn: String,

    #[validate(length(min = 1, max = 300, message = "제목은 1-300자 사이여야 합니다"))]
    pub title: String,

    #[validate(length(min = 1, max = 200, message = "저자는 1-200자 사이여야 합니다"))]
    pub author: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 200, message = "출판사는 200자 이하여야 합니다"))]
    pub publisher: Option<String>,

    #[validate(range(min = 1, max = 9999, message = "출판 연도가 올바르지 않습니다"))]
    pub published_year: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "분류는 100자 이하여야 합니다"))]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 5000, message = "설명은 5000자 이하여야 합니다"))]
    pub description: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "초기 사본 수는 0-100 사이여야 합니다"))]
    pub initial_copies: u32,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "서가 위치는 100자 이하여야 합니다"))]
    pub shelf_location: Option<String>,
}

/// 도서 정보 부분 수정 요청 (보낸 필드만 변경)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 20, message = "ISBN은 1-20자 사이여야 합니다"))]
    pub isbn: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 300, message = "제목은 1-300자 사이여야 합니다"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 200, message = "저자는 1-200자 사이여야 합니다"))]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 200, message = "출판사는 200자 이하여야 합니다"))]
    pub publisher: Option<String>,

    #[validate(range(min = 1, max = 9999, message = "출판 연도가 올바르지 않습니다"))]
    pub published_year: Option<i32>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "분류는 100자 이하여야 합니다"))]
    pub category: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 5000, message = "설명은 5000자 이하여야 합니다"))]
    pub description: Option<String>,
}

impl UpdateBookRequest {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none()
            && self.title.is_none()
            && self.author.is_none()
            && self.publisher.is_none()
            && self.published_year.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }
}

/// 도서 목록 조회 쿼리
///
/// `search`는 제목/저자/ISBN 부분 일치(대소문자 무시), `available_only=true`면 대출 가능 도서만.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub category: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_book_defaults() {
        let req: CreateBookRequest = serde_json::from_str(
            r#"{"isbn": "978-0-306-40615-7", "title": "Signals", "author": "Kim", "publisher": " "}"#,
        )
        .unwrap();

        assert_eq!(req.initial_copies, 0);
        assert_eq!(req.publisher, None);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_book_rejects_too_many_copies() {
        let req: CreateBookRequest = serde_json::from_str(
            r#"{"isbn": "9780306406157", "title": "T", "author": "A", "initial_copies": 101}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_request_emptiness() {
        assert!(UpdateBookRequest::default().is_empty());

        let req: UpdateBookRequest = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert!(!req.is_empty());
        assert!(req.validate().is_ok());
    }
}
