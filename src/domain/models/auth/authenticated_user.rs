//! 인증된 사용자 정보
//!
//! `AuthMiddleware`가 JWT를 검증한 뒤 Request Extensions에 저장하며,
//! 핸들러는 추출자(`FromRequest`)로 받아 사용합니다.
//!
//! ```rust,ignore
//! #[get("/my")]
//! pub async fn my_loans(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
//!     let loans = CirculationService::instance().my_transactions(&user).await?;
//!     Ok(HttpResponse::Ok().json(loans))
//! }
//! ```

use std::future::{ready, Ready};
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use crate::core::errors::AppError;
use crate::domain::entities::users::UserRole;
use crate::utils::string_utils::parse_object_id;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|&role| self.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::ADMIN)
    }

    /// 사서 또는 관리자
    pub fn is_staff(&self) -> bool {
        self.has_any_role(&[UserRole::ADMIN, UserRole::LIBRARIAN])
    }

    pub fn object_id(&self) -> Result<ObjectId, AppError> {
        parse_object_id(&self.user_id, "사용자 ID")
            .map_err(|_| AppError::AuthenticationError("토큰의 사용자 정보가 올바르지 않습니다".to_string()))
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthenticationError(
                "인증되지 않은 요청입니다".to_string()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: ObjectId::new().to_hex(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_role_checks() {
        let librarian = user(&["librarian"]);
        assert!(librarian.is_staff());
        assert!(!librarian.is_admin());
        assert!(librarian.has_any_role(&["admin", "librarian"]));

        let student = user(&["student"]);
        assert!(!student.is_staff());
        assert!(!student.has_any_role(&["admin", "librarian"]));
    }

    #[test]
    fn test_object_id_rejects_malformed_subject() {
        let broken = AuthenticatedUser { user_id: "nope".to_string(), roles: vec![] };
        assert!(matches!(broken.object_id(), Err(AppError::AuthenticationError(_))));
        assert!(user(&["admin"]).object_id().is_ok());
    }

    #[test]
    fn test_extractor_without_middleware_is_unauthorized() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        let result = AuthenticatedUser::from_request(&req, &mut actix_web::dev::Payload::None).into_inner();
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }
}
