//! # Application Error Handling System
//!
//! 도서관 백엔드 전역에서 사용하는 통합 에러 타입입니다.
//! 모든 계층(리포지토리, 서비스, 핸들러)은 `AppError`를 반환하며,
//! `actix_web::ResponseError` 구현을 통해 일관된 JSON 에러 응답으로 변환됩니다.
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status | 사용 시나리오 |
//! |----------|-------------|---------------|
//! | `ValidationError` | 400 Bad Request | 입력값 검증 실패, CSV 형식 오류 |
//! | `AuthenticationError` | 401 Unauthorized | 토큰 누락/만료, 로그인 실패 |
//! | `AuthorizationError` | 403 Forbidden | 역할 부족, 타인 리소스 접근 |
//! | `NotFound` | 404 Not Found | 도서/사본/대출 기록 없음 |
//! | `ConflictError` | 409 Conflict | 중복 ISBN, 대출 한도 초과, 미납 연체료 |
//! | `DatabaseError` | 500 Internal Server Error | MongoDB 오류 |
//! | `RedisError` | 500 Internal Server Error | 캐시/세션 오류 |
//! | `InternalError` | 500 Internal Server Error | 예상치 못한 오류 |
//!
//! 응답 본문은 항상 `{"error": "<message>"}` 형식입니다.
//!
//! ```rust,ignore
//! use crate::core::errors::AppError;
//!
//! let book = book_repo.find_by_id(&book_id).await?
//!     .ok_or_else(|| AppError::NotFound("도서를 찾을 수 없습니다".to_string()))?;
//! ```

use actix_web::http::StatusCode;
use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// `thiserror`로 `Error` trait을 구현하고, 변형마다 HTTP 상태 코드가 하나씩 대응됩니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// MongoDB 연산 실패
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis 연산 실패 (세션, 블랙리스트, 설정 캐시)
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 클라이언트 입력이 형식이나 범위 요구사항을 만족하지 않음
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 요청한 리소스가 존재하지 않음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 비즈니스 규칙 위반
    ///
    /// 중복 ISBN, 대출 한도 초과, 이미 반납된 대출 반납 시도,
    /// 대출 중인 사본 삭제 시도 등이 여기에 해당합니다.
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 사용자 신원을 확인할 수 없음
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 인증은 되었으나 작업 권한이 없음
    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 예상하지 못한 시스템 오류
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 에러 변형에 대응하는 HTTP 상태 코드
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    /// 5xx 에러는 서버 로그에 남기고, 클라이언트에는 메시지만 전달합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let status = self.status();

        if status.is_server_error() {
            log::error!("요청 처리 실패: {}", self);
        }

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> Self {
        AppError::DatabaseError(error.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(error: redis::RedisError) -> Self {
        AppError::RedisError(error.to_string())
    }
}

/// `Result<T, AppError>` 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 컨텍스트와 함께 `AppError::InternalError`로 변환하는 확장 trait
///
/// ```rust,ignore
/// let hash = bcrypt::hash(&password, cost).context("비밀번호 해싱 실패")?;
/// ```
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }
}

/// JSON/쿼리/경로 추출 실패를 `{"error": ...}` 400 응답으로 변환하는 설정
///
/// `App::app_data`에 등록하면 actix 기본 텍스트 에러 대신 일관된 JSON 본문을 반환합니다.
pub fn json_extractor_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("잘못된 JSON 요청입니다: {}", err)).into()
    })
}

pub fn query_extractor_config() -> actix_web::web::QueryConfig {
    actix_web::web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("잘못된 쿼리 파라미터입니다: {}", err)).into()
    })
}

pub fn path_extractor_config() -> actix_web::web::PathConfig {
    actix_web::web::PathConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("잘못된 경로 파라미터입니다: {}", err)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("isbn은 필수입니다".to_string());
        assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("도서를 찾을 수 없습니다".to_string());
        assert_eq!(error.error_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_error_response() {
        let error = AppError::ConflictError("대출 한도를 초과했습니다".to_string());
        assert_eq!(error.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_authentication_error_response() {
        let error = AppError::AuthenticationError("Invalid token".to_string());
        assert_eq!(error.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authorization_error_response() {
        let error = AppError::AuthorizationError("Insufficient permissions".to_string());
        assert_eq!(error.error_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_server_errors_map_to_500() {
        for error in [
            AppError::DatabaseError("down".to_string()),
            AppError::RedisError("down".to_string()),
            AppError::InternalError("boom".to_string()),
        ] {
            assert_eq!(error.error_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[actix_web::test]
    async fn test_error_body_is_json_with_error_field() {
        let error = AppError::ConflictError("이미 반납된 대출입니다".to_string());
        let response = error.error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert!(json["error"].as_str().unwrap().contains("이미 반납된 대출입니다"));
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        match app_result {
            Err(AppError::InternalError(msg)) => {
                assert!(msg.contains("Additional context"));
                assert!(msg.contains("original error"));
            }
            _ => panic!("Expected InternalError"),
        }
    }
}
