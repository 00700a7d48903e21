//! 도서 카탈로그와 사본 HTTP 핸들러
//!
//! 조회는 로그인한 모든 사용자, 변경은 사서/관리자만 가능합니다.
//! 같은 경로에 권한이 다른 메서드가 있어 핸들러 단위로 미들웨어를 적용합니다.
use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use futures_util::StreamExt;
use validator::Validate;
use crate::{
    config::UploadConfig,
    core::errors::AppError,
    domain::{
        dto::{
            books::{BookListQuery, CreateBookRequest, UpdateBookRequest},
            copies::{AddCopiesRequest, CopyListQuery, UpdateCopyStatusRequest},
        },
        models::auth::Actor,
    },
    middlewares::AuthMiddleware,
    services::books::{BookImportService, BookService, CopyService},
};

#[post("", wrap = "AuthMiddleware::staff()")]
pub async fn create_book(
    actor: Actor,
    payload: web::Json<CreateBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = BookService::instance();
    let book = service.create_book(payload.into_inner(), &actor).await?;

    Ok(HttpResponse::Created().json(book))
}

#[get("", wrap = "AuthMiddleware::required()")]
pub async fn list_books(
    query: web::Query<BookListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let books = service.list_books(query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(books))
}

/// CSV 일괄 등록
///
/// 본문은 `text/csv` 원문입니다. `CSV_MAX_BYTES`를 넘으면 읽기를 중단하고 400을 반환합니다.
///
/// # Endpoint
/// `POST /api/v1/books/bulk-upload`
#[post("/bulk-upload", wrap = "AuthMiddleware::staff()")]
pub async fn bulk_upload(
    actor: Actor,
    mut payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let max_bytes = UploadConfig::csv_max_bytes();
    let mut body = web::BytesMut::new();

    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::ValidationError(format!("요청 본문을 읽을 수 없습니다: {}", e)))?;
        if body.len() + chunk.len() > max_bytes {
            return Err(AppError::ValidationError(format!(
                "CSV 파일 크기가 최대 {}바이트를 초과했습니다",
                max_bytes
            )));
        }
        body.extend_from_slice(&chunk);
    }

    let service = BookImportService::instance();
    let report = service.import_csv(&body, &actor).await?;

    Ok(HttpResponse::Ok().json(report))
}

#[get("/{book_id}", wrap = "AuthMiddleware::required()")]
pub async fn get_book(
    book_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    let book = service.get_book(&book_id).await?;

    Ok(HttpResponse::Ok().json(book))
}

#[put("/{book_id}", wrap = "AuthMiddleware::staff()")]
pub async fn update_book(
    actor: Actor,
    book_id: web::Path<String>,
    payload: web::Json<UpdateBookRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = BookService::instance();
    let book = service
        .update_book(&book_id, payload.into_inner(), &actor)
        .await?;

    Ok(HttpResponse::Ok().json(book))
}

/// 대출 중인 사본이 있으면 409
#[delete("/{book_id}", wrap = "AuthMiddleware::staff()")]
pub async fn delete_book(
    actor: Actor,
    book_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = BookService::instance();
    service.delete_book(&book_id, &actor).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[post("/{book_id}/copies", wrap = "AuthMiddleware::staff()")]
pub async fn add_copies(
    actor: Actor,
    book_id: web::Path<String>,
    payload: web::Json<AddCopiesRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CopyService::instance();
    let copies = service
        .add_copies(&book_id, payload.into_inner(), &actor)
        .await?;

    Ok(HttpResponse::Created().json(copies))
}

#[get("/{book_id}/copies", wrap = "AuthMiddleware::required()")]
pub async fn list_copies(
    book_id: web::Path<String>,
    query: web::Query<CopyListQuery>,
) -> Result<HttpResponse, AppError> {
    let service = CopyService::instance();
    let copies = service.list_copies(&book_id, query.into_inner()).await?;

    Ok(HttpResponse::Ok().json(copies))
}

// `/api/v1/copies` 스코프 (스코프 전체 사서/관리자)

#[get("/{copy_id}")]
pub async fn get_copy(
    copy_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CopyService::instance();
    let copy = service.get_copy(&copy_id).await?;

    Ok(HttpResponse::Ok().json(copy))
}

/// 수동 상태 변경. `issued`로의 변경과 `issued`에서의 변경은 409입니다.
#[patch("/{copy_id}/status")]
pub async fn update_copy_status(
    actor: Actor,
    copy_id: web::Path<String>,
    payload: web::Json<UpdateCopyStatusRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CopyService::instance();
    let copy = service
        .update_status(&copy_id, payload.into_inner(), &actor)
        .await?;

    Ok(HttpResponse::Ok().json(copy))
}

#[delete("/{copy_id}")]
pub async fn delete_copy(
    actor: Actor,
    copy_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CopyService::instance();
    service.delete_copy(&copy_id, &actor).await?;

    Ok(HttpResponse::NoContent().finish())
}
