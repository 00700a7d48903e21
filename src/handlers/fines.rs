//! 연체료 HTTP 핸들러
use actix_web::{get, post, web, HttpResponse};
use crate::{
    core::errors::AppError,
    domain::{
        dto::fines::FineListQuery,
        models::auth::{Actor, AuthenticatedUser},
    },
    middlewares::AuthMiddleware,
    services::circulation::FineService,
};

/// `?paid=false`면 미납 연체료만
#[get("", wrap = "AuthMiddleware::staff()")]
pub async fn list_fines(
    query: web::Query<FineListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = FineService::instance();
    let fines = service.list_fines(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(fines))
}

#[get("/my", wrap = "AuthMiddleware::required()")]
pub async fn my_fines(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let service = FineService::instance();
    let fines = service.my_fines(&user).await?;

    Ok(HttpResponse::Ok().json(fines))
}

#[post("/{transaction_id}/pay", wrap = "AuthMiddleware::staff()")]
pub async fn pay_fine(
    actor: Actor,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = FineService::instance();
    let fine = service.pay_fine(&transaction_id, &actor).await?;

    Ok(HttpResponse::Ok().json(fine))
}
