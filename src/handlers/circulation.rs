//! 대출/반납 HTTP 핸들러
//!
//! | 메서드 | 경로 | 권한 |
//! |--------|------|------|
//! | `POST` | `/api/v1/circulation/issue` | 사서/관리자 |
//! | `POST` | `/api/v1/circulation/return/{transaction_id}` | 사서/관리자 |
//! | `POST` | `/api/v1/circulation/renew/{transaction_id}` | 사서/관리자, 본인 |
//! | `POST` | `/api/v1/circulation/lost/{transaction_id}` | 사서/관리자 |
//! | `GET`  | `/api/v1/circulation/transactions` | 사서/관리자 |
//! | `GET`  | `/api/v1/circulation/transactions/{id}` | 사서/관리자, 본인 |
//! | `GET`  | `/api/v1/circulation/my` | 로그인 사용자 |
use actix_web::{get, post, web, HttpResponse};
use validator::Validate;
use crate::{
    core::errors::AppError,
    domain::{
        dto::circulation::{IssueBookRequest, MyTransactionsQuery, TransactionListQuery},
        models::auth::{Actor, AuthenticatedUser},
    },
    middlewares::AuthMiddleware,
    services::circulation::CirculationService,
};

#[post("/issue", wrap = "AuthMiddleware::staff()")]
pub async fn issue_book(
    actor: Actor,
    payload: web::Json<IssueBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CirculationService::instance();
    let transaction = service.issue_book(payload.into_inner(), &actor).await?;

    Ok(HttpResponse::Created().json(transaction))
}

/// 반납 처리. 연체료는 UTC 날짜 기준 연체 일수 × `fine_per_day`로 확정됩니다.
#[post("/return/{transaction_id}", wrap = "AuthMiddleware::staff()")]
pub async fn return_book(
    actor: Actor,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transaction = service.return_book(&transaction_id, &actor).await?;

    Ok(HttpResponse::Ok().json(transaction))
}

#[post("/renew/{transaction_id}", wrap = "AuthMiddleware::required()")]
pub async fn renew_loan(
    actor: Actor,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transaction = service.renew_loan(&transaction_id, &actor).await?;

    Ok(HttpResponse::Ok().json(transaction))
}

#[post("/lost/{transaction_id}", wrap = "AuthMiddleware::staff()")]
pub async fn mark_lost(
    actor: Actor,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transaction = service.mark_lost(&transaction_id, &actor).await?;

    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/transactions", wrap = "AuthMiddleware::staff()")]
pub async fn list_transactions(
    query: web::Query<TransactionListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transactions = service.list_transactions(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(transactions))
}

#[get("/transactions/{transaction_id}", wrap = "AuthMiddleware::required()")]
pub async fn get_transaction(
    user: AuthenticatedUser,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transaction = service.get_transaction(&transaction_id, &user).await?;

    Ok(HttpResponse::Ok().json(transaction))
}

#[get("/my", wrap = "AuthMiddleware::required()")]
pub async fn my_transactions(
    user: AuthenticatedUser,
    query: web::Query<MyTransactionsQuery>,
) -> Result<HttpResponse, AppError> {
    let service = CirculationService::instance();
    let transactions = service.my_transactions(&user, query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(transactions))
}
