//! 사본 관리 요청 DTO

use serde::Deserialize;
use validator::Validate;
use crate::domain::entities::books::CopyStatus;
use crate::utils::string_utils::deserialize_optional_string;

/// 사본 추가 요청 (`POST /api/v1/books/{id}/copies`)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCopiesRequest {
    #[serde(default = "default_copy_count")]
    #[validate(range(min = 1, max = 100, message = "추가할 사본 수는 1-100 사이여야 합니다"))]
    pub count: u32,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "서가 위치는 100자 이하여야 합니다"))]
    pub shelf_location: Option<String>,
}

fn default_copy_count() -> u32 {
    1
}

/// 사본 상태 수동 변경 요청 (`PATCH /api/v1/copies/{id}/status`)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCopyStatusRequest {
    pub status: CopyStatus,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 500, message = "상태 메모는 500자 이하여야 합니다"))]
    pub condition_note: Option<String>,
}

/// 사본 목록 조회 쿼리
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopyListQuery {
    pub status: Option<CopyStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_copies_defaults_to_one() {
        let req: AddCopiesRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.count, 1);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_add_copies_range() {
        let req: AddCopiesRequest = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(req.validate().is_err());

        let req: AddCopiesRequest = serde_json::from_str(r#"{"count": 100}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_unknown_status_is_rejected_at_deserialization() {
        assert!(serde_json::from_str::<UpdateCopyStatusRequest>(r#"{"status": "borrowed"}"#).is_err());
        let req: UpdateCopyStatusRequest = serde_json::from_str(r#"{"status": "damaged"}"#).unwrap();
        assert_eq!(req.status, CopyStatus::Damaged);
    }
}
