//! 문자열 정리/검증 유틸리티
//!
//! DTO 역직렬화 시 공백 정리, ObjectId 파싱, MongoDB 정규식 검색어 이스케이프를 담당합니다.

use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use crate::core::errors::AppError;

/// 빈 문자열/공백 문자열을 `None`으로 정리
pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `#[serde(default, deserialize_with = "deserialize_optional_string")]`용 역직렬화 함수
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}

/// 24자리 hex 문자열을 `ObjectId`로 변환
///
/// 형식이 잘못된 경우 400으로 응답되도록 `ValidationError`를 반환합니다.
pub fn parse_object_id(value: &str, field_name: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::ValidationError(format!("유효하지 않은 {} 형식입니다", field_name)))
}

/// 사용자 입력을 MongoDB `$regex` 리터럴로 사용할 수 있도록 메타 문자 이스케이프
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional_string() {
        assert_eq!(clean_optional_string(Some("  Penguin  ".to_string())), Some("Penguin".to_string()));
        assert_eq!(clean_optional_string(Some("   ".to_string())), None);
        assert_eq!(clean_optional_string(None), None);
    }

    #[test]
    fn test_deserialize_optional_string() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "deserialize_optional_string")]
            publisher: Option<String>,
        }

        let parsed: Payload = serde_json::from_str(r#"{"publisher": "  한빛미디어  "}"#).unwrap();
        assert_eq!(parsed.publisher, Some("한빛미디어".to_string()));

        let parsed: Payload = serde_json::from_str(r#"{"publisher": "  "}"#).unwrap();
        assert_eq!(parsed.publisher, None);

        let parsed: Payload = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(parsed.publisher, None);
    }

    #[test]
    fn test_parse_object_id() {
        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "도서 ID").unwrap(), id);

        match parse_object_id("not-an-id", "도서 ID") {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("도서 ID")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("C++ (3rd ed.)"), r"C\+\+ \(3rd ed\.\)");
        assert_eq!(escape_regex("해리 포터"), "해리 포터");
    }
}
