//! 변경 요청의 수행자 정보 (감사 로그용)

use std::future::{ready, Ready};
use actix_web::{FromRequest, HttpRequest};
use mongodb::bson::oid::ObjectId;
use crate::core::errors::AppError;
use crate::utils::request::client_ip;
use super::AuthenticatedUser;

/// 인증된 사용자와 요청 IP
///
/// 변경 작업 핸들러는 `AuthenticatedUser` 대신 `Actor`를 받아 서비스에 넘기고,
/// 서비스는 이를 그대로 감사 로그에 기록합니다.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: AuthenticatedUser,
    pub id: ObjectId,
    pub ip_address: Option<String>,
}

impl Actor {
    pub fn new(user: AuthenticatedUser, ip_address: Option<String>) -> Result<Self, AppError> {
        let id = user.object_id()?;
        Ok(Self { user, id, ip_address })
    }

    pub fn is_staff(&self) -> bool {
        self.user.is_staff()
    }
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = AuthenticatedUser::from_request(req, payload)
            .into_inner()
            .and_then(|user| Actor::new(user, client_ip(req)));

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test::TestRequest, HttpMessage};

    #[test]
    fn test_actor_carries_user_and_ip() {
        let user = AuthenticatedUser {
            user_id: ObjectId::new().to_hex(),
            roles: vec!["librarian".to_string()],
        };
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "10.0.0.7, 172.16.0.1"))
            .to_http_request();
        req.extensions_mut().insert(user.clone());

        let actor = Actor::from_request(&req, &mut actix_web::dev::Payload::None)
            .into_inner()
            .unwrap();

        assert_eq!(actor.id.to_hex(), user.user_id);
        assert_eq!(actor.ip_address.as_deref(), Some("10.0.0.7"));
        assert!(actor.is_staff());
    }

    #[test]
    fn test_actor_requires_authentication() {
        let req = TestRequest::default().to_http_request();
        let result = Actor::from_request(&req, &mut actix_web::dev::Payload::None).into_inner();
        assert!(matches!(result, Err(AppError::AuthenticationError(_))));
    }
}
