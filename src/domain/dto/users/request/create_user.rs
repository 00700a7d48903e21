//! # 사용자 생성 요청 DTO
//!
//! - [`RegisterRequest`]: 학생 자가 가입 (`POST /api/v1/auth/register`, 역할은 항상 `student`)
//! - [`CreateUserRequest`]: 관리자가 임의 역할로 계정 생성 (`POST /api/v1/users`)
//!
//! ## 검증 규칙
//!
//! - `email`: RFC 5322 형식 (중복 여부는 서비스 계층에서 확인)
//! - `username`: 3-30자, 영문/숫자/언더스코어
//! - `display_name`: 1-50자
//! - `password`: 8자 이상, 대문자/소문자/숫자 포함, `password_confirm`과 일치
//! - `student_number`: 1-30자 (학생 계정에서 존재할 때 유일)

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::domain::entities::users::UserRole;
use crate::utils::string_utils::deserialize_optional_string;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_register_passwords"))]
pub struct RegisterRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 3, max = 30, message = "사용자명은 3-30자 사이여야 합니다"))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "표시 이름은 1-50자 사이여야 합니다"))]
    pub display_name: String,

    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirm: String,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 30, message = "학번은 1-30자 사이여야 합니다"))]
    pub student_number: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "학과명은 100자 이하여야 합니다"))]
    pub department: Option<String>,
}

/// 관리자용 계정 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_passwords"))]
pub struct CreateUserRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 3, max = 30, message = "사용자명은 3-30자 사이여야 합니다"))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 50, message = "표시 이름은 1-50자 사이여야 합니다"))]
    pub display_name: String,

    #[validate(length(min = 8, message = "비밀번호는 최소 8자 이상이어야 합니다"))]
    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    pub password_confirm: String,

    pub role: UserRole,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 30, message = "학번은 1-30자 사이여야 합니다"))]
    pub student_number: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(max = 100, message = "학과명은 100자 이하여야 합니다"))]
    pub department: Option<String>,
}

impl From<RegisterRequest> for CreateUserRequest {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            username: req.username,
            display_name: req.display_name,
            password: req.password,
            password_confirm: req.password_confirm,
            role: UserRole::Student,
            student_number: req.student_number,
            department: req.department,
        }
    }
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("비밀번호가 일치하지 않습니다".into()));
    }
    Ok(())
}

fn validate_register_passwords(req: &RegisterRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn validate_create_passwords(req: &CreateUserRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

/// 사용자명 형식 검증 (영문, 숫자, 언더스코어만 허용)
fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new("invalid_username")
            .with_message("사용자명은 알파벳, 숫자, 언더스코어만 사용 가능합니다".into()));
    }
    Ok(())
}

/// 비밀번호 보안 강도 검증 (대문자, 소문자, 숫자 필수 포함)
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !(has_uppercase && has_lowercase && has_digit) {
        return Err(ValidationError::new("weak_password")
            .with_message("비밀번호는 대문자, 소문자, 숫자를 포함해야 합니다".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterRequest {
        RegisterRequest {
            email: "student@school.ac.kr".to_string(),
            username: "student_01".to_string(),
            display_name: "홍길동".to_string(),
            password: "Passw0rdOk".to_string(),
            password_confirm: "Passw0rdOk".to_string(),
            student_number: Some("2024-0001".to_string()),
            department: None,
        }
    }

    #[test]
    fn test_valid_register_request() {
        assert!(register().validate().is_ok());
    }

    #[test]
    fn test_password_rules() {
        let mut req = register();
        req.password_confirm = "Different1".to_string();
        assert!(req.validate().is_err());

        let mut req = register();
        req.password = "alllowercase1".to_string();
        req.password_confirm = req.password.clone();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_username_rules() {
        let mut req = register();
        req.username = "bad name!".to_string();
        assert!(req.validate().is_err());

        req.username = "ab".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_register_converts_to_student() {
        let create: CreateUserRequest = register().into();
        assert_eq!(create.role, UserRole::Student);
        assert!(create.validate().is_ok());
    }

    #[test]
    fn test_role_is_parsed_from_json() {
        let json = r#"{
            "email": "lib@school.ac.kr", "username": "librarian1", "display_name": "사서",
            "password": "Passw0rdOk", "password_confirm": "Passw0rdOk", "role": "librarian",
            "student_number": "  "
        }"#;
        let req: CreateUserRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.role, UserRole::Librarian);
        assert_eq!(req.student_number, None);
    }
}
