//! # User Management HTTP Handlers
//!
//! 관리자 전용 계정 관리 엔드포인트입니다. 스코프 전체에 `AuthMiddleware::admin()`이 적용됩니다.
//!
//! | 메서드 | 경로 | 설명 | 상태 코드 |
//! |--------|------|------|-----------|
//! | `POST` | `/api/v1/users` | 계정 생성 (모든 역할) | 201 Created |
//! | `GET` | `/api/v1/users` | 계정 목록 (역할/검색/활성 필터) | 200 OK |
//! | `GET` | `/api/v1/users/{id}` | 계정 조회 | 200 OK |
//! | `PATCH` | `/api/v1/users/{id}/status` | 활성화/비활성화 | 200 OK |
use actix_web::{get, patch, post, web, HttpResponse};
use validator::Validate;
use crate::{
    core::errors::AppError,
    domain::{
        dto::users::{CreateUserRequest, UpdateUserStatusRequest, UserListQuery},
        models::auth::Actor,
    },
    services::users::UserService,
};

#[post("")]
pub async fn create_user(
    actor: Actor,
    payload: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = UserService::instance();
    let user = service.create_user(payload.into_inner(), &actor).await?;

    Ok(HttpResponse::Created().json(user))
}

#[get("")]
pub async fn list_users(
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    let users = service.list_users(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(users))
}

#[get("/{user_id}")]
pub async fn get_user(
    user_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    let user = service.get_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// 계정 활성 상태 변경
///
/// 대출 중인 도서가 있는 계정의 비활성화는 409로 거부됩니다.
#[patch("/{user_id}/status")]
pub async fn update_user_status(
    actor: Actor,
    user_id: web::Path<String>,
    payload: web::Json<UpdateUserStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let service = UserService::instance();
    let user = service
        .update_status(&user_id, payload.into_inner(), &actor)
        .await?;

    Ok(HttpResponse::Ok().json(user))
}
