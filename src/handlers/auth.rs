//! Authentication HTTP Handlers
//!
//! | 메서드 | 경로 | 인증 |
//! |--------|------|------|
//! | `POST` | `/api/v1/auth/register` | 불필요 (학생 가입) |
//! | `POST` | `/api/v1/auth/login` | 불필요 |
//! | `POST` | `/api/v1/auth/refresh` | 불필요 (리프레시 토큰) |
//! | `POST` | `/api/v1/auth/logout` | 필요 |
//! | `GET`  | `/api/v1/auth/me` | 필요 |
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use validator::Validate;
use crate::{
    core::errors::AppError,
    domain::{
        dto::{
            users::{LoginRequest, RefreshTokenRequest, RegisterRequest},
            MessageResponse,
        },
        models::auth::AuthenticatedUser,
    },
    middlewares::AuthMiddleware,
    services::{
        auth::{SessionService, TokenService},
        users::UserService,
    },
    utils::request::client_ip,
};

/// 학생 자가 가입
///
/// # Endpoint
/// `POST /api/v1/auth/register`
#[post("/register")]
pub async fn register(
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let user_service = UserService::instance();
    let user = user_service.register(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(user))
}

/// 이메일/비밀번호 로그인
///
/// 성공 시 사용자 정보와 액세스/리프레시 토큰 쌍을 반환합니다.
/// 리프레시 토큰은 Redis에 저장되어 이후 갱신 요청에서 대조됩니다.
///
/// # Endpoint
/// `POST /api/v1/auth/login`
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let session_service = SessionService::instance();
    let response = session_service
        .login(payload.into_inner(), client_ip(&req))
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// 리프레시 토큰으로 새 토큰 쌍 발급 (기존 리프레시 토큰은 폐기)
///
/// # Endpoint
/// `POST /api/v1/auth/refresh`
#[post("/refresh")]
pub async fn refresh(
    payload: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let session_service = SessionService::instance();
    let tokens = session_service.refresh(&payload.refresh_token).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// 로그아웃
///
/// 저장된 리프레시 토큰을 삭제하고, 현재 액세스 토큰을 남은 유효 시간 동안 블랙리스트에 올립니다.
///
/// # Endpoint
/// `POST /api/v1/auth/logout`
#[post("/logout", wrap = "AuthMiddleware::required()")]
pub async fn logout(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("인증 토큰이 필요합니다".to_string()))?;

    let access_token = TokenService::instance().extract_bearer_token(auth_header)?;
    SessionService::instance().logout(access_token).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("로그아웃되었습니다")))
}

/// 현재 로그인한 사용자 정보
///
/// # Endpoint
/// `GET /api/v1/auth/me`
#[get("/me", wrap = "AuthMiddleware::required()")]
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let user_service = UserService::instance();
    let current = user_service.get_current_user(&user).await?;

    Ok(HttpResponse::Ok().json(current))
}
