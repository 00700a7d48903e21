//! AuthMiddleware 인증 로직
use std::rc::Rc;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::{Error, HttpMessage, HttpResponse, ResponseError};
use futures_util::future::LocalBoxFuture;
use crate::core::errors::AppError;
use crate::domain::models::auth::{AuthMode, AuthenticatedUser, RequiredRole};
use crate::domain::models::token::TokenType;
use crate::services::auth::{SessionService, TokenService};

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
    pub required_role: Option<RequiredRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode.clone();
        let required_role = self.required_role.clone();

        Box::pin(async move {
            let auth_result = authenticate(&req).await;

            match (&mode, auth_result) {
                (AuthMode::Required, Err(err)) => {
                    log::warn!("인증 실패 - {} {}: {}", req.method(), req.path(), err);
                    let (req, _) = req.into_parts();
                    return Ok(ServiceResponse::new(req, failure_response(&err)).map_into_right_body());
                },
                (AuthMode::Required, Ok(user)) => {
                    if let Some(ref required) = required_role {
                        if !required.is_satisfied(&user.roles) {
                            log::warn!(
                                "권한 부족: 사용자 ID {} ({:?}), 필요 권한: {:?}",
                                user.user_id, user.roles, required
                            );
                            let response = HttpResponse::Forbidden().json(serde_json::json!({
                                "error": "접근 권한이 없습니다"
                            }));
                            let (req, _) = req.into_parts();
                            return Ok(ServiceResponse::new(req, response).map_into_right_body());
                        }
                    }

                    log::debug!("인증 성공: 사용자 ID {}", user.user_id);
                    req.extensions_mut().insert(user);
                },
                (AuthMode::Optional, Ok(user)) => {
                    let allowed = required_role
                        .as_ref()
                        .map_or(true, |required| required.is_satisfied(&user.roles));
                    if allowed {
                        req.extensions_mut().insert(user);
                    }
                },
                (AuthMode::Optional, Err(AppError::AuthenticationError(_))) => {
                    log::debug!("선택적 인증: 토큰 없음, 요청 진행");
                },
                (AuthMode::Optional, Err(err)) => {
                    let (req, _) = req.into_parts();
                    return Ok(ServiceResponse::new(req, failure_response(&err)).map_into_right_body());
                },
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// 인증 실패 응답
///
/// 토큰 문제(`AuthenticationError`)만 401이고, 블랙리스트 조회 중 Redis 장애 같은
/// 인프라 오류는 `AppError`의 상태 코드(500)를 그대로 따릅니다.
fn failure_response(err: &AppError) -> HttpResponse {
    err.error_response()
}

/// Authorization 헤더의 액세스 토큰을 검증하고 블랙리스트 여부를 확인합니다.
async fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("인증 토큰이 필요합니다".to_string()))?;

    let token_service = TokenService::instance();
    let token = token_service.extract_bearer_token(auth_header)?;
    let claims = token_service.verify_token(token, TokenType::Access)?;

    if SessionService::instance().is_blacklisted(token).await? {
        return Err(AppError::AuthenticationError("로그아웃된 토큰입니다".to_string()));
    }

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        roles: claims.roles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    #[actix_web::test]
    async fn test_token_failure_is_unauthorized() {
        let res = failure_response(&AppError::AuthenticationError("로그아웃된 토큰입니다".to_string()));
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let body = to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "로그아웃된 토큰입니다");
    }

    #[actix_web::test]
    async fn test_blacklist_store_outage_is_server_error() {
        let outage = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
        let res = failure_response(&AppError::from(outage));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].is_string());
    }
}
