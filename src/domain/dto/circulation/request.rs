//! 대출/반납 요청 DTO

use serde::Deserialize;
use validator::{Validate, ValidationError};
use crate::domain::entities::circulation::TransactionStatus;
use crate::utils::string_utils::deserialize_optional_string;

/// 대출 요청 (`POST /api/v1/circulation/issue`)
///
/// `copy_id`를 주면 해당 사본을, `book_id`만 주면 대출 가능한 첫 사본을 대출합니다.
/// 둘 다 주면 사본이 해당 도서에 속해야 합니다.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_issue_target"))]
pub struct IssueBookRequest {
    #[validate(length(equal = 24, message = "유효하지 않은 학생 ID 형식입니다"))]
    pub student_id: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(equal = 24, message = "유효하지 않은 도서 ID 형식입니다"))]
    pub book_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(equal = 24, message = "유효하지 않은 사본 ID 형식입니다"))]
    pub copy_id: Option<String>,
}

fn validate_issue_target(req: &IssueBookRequest) -> Result<(), ValidationError> {
    if req.book_id.is_none() && req.copy_id.is_none() {
        return Err(ValidationError::new("missing_issue_target")
            .with_message("book_id 또는 copy_id 중 하나는 필요합니다".into()));
    }
    Ok(())
}

/// 대출 기록 목록 조회 쿼리 (사서/관리자)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionListQuery {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub student_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub book_id: Option<String>,
    pub status: Option<TransactionStatus>,
    /// `true`면 반납 예정일이 지난 대출 중 기록만
    #[serde(default)]
    pub overdue_only: bool,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

/// 본인 대출 기록 조회 쿼리
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MyTransactionsQuery {
    pub status: Option<TransactionStatus>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_issue_requires_book_or_copy() {
        let student = ObjectId::new().to_hex();

        let req = IssueBookRequest { student_id: student.clone(), book_id: None, copy_id: None };
        assert!(req.validate().is_err());

        let req = IssueBookRequest { student_id: student.clone(), book_id: Some(ObjectId::new().to_hex()), copy_id: None };
        assert!(req.validate().is_ok());

        let req = IssueBookRequest { student_id: student, book_id: None, copy_id: Some("short".to_string()) };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_ids_are_treated_as_missing() {
        let json = format!(r#"{{"student_id": "{}", "book_id": "  ", "copy_id": "{}"}}"#, ObjectId::new(), ObjectId::new());
        let req: IssueBookRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(req.book_id, None);
        assert!(req.validate().is_ok());
    }
}
