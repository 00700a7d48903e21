//! 인증/계정 관리 요청 DTO

use serde::Deserialize;
use validator::Validate;
use crate::domain::entities::users::UserRole;
use crate::utils::string_utils::deserialize_optional_string;

/// 로컬 로그인 요청
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    #[validate(length(min = 1, message = "비밀번호를 입력해주세요"))]
    pub password: String,
}

/// 리프레시 토큰 교환/로그아웃 요청
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "리프레시 토큰이 필요합니다"))]
    pub refresh_token: String,
}

/// 계정 활성화/비활성화 요청
#[derive(Debug, Deserialize)]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

/// 사용자 목록 조회 쿼리 (`?role=student&search=kim&page=1&limit=20`)
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest { email: "a@b.kr".to_string(), password: "x".to_string() };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest { email: "not-email".to_string(), password: "".to_string() };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
