//! API 라우트 설정 모듈
//!
//! 기능별 스코프를 `/api/v1` 아래에 등록합니다.
//!
//! # Auth Middleware Usage
//!
//! 스코프 전체가 한 권한으로 묶이는 경우 스코프에 미들웨어를 적용합니다.
//!
//! ```rust,ignore
//! cfg.service(
//!     web::scope("/api/v1/users")
//!         .wrap(AuthMiddleware::admin())
//!         .service(handlers::users::list_users)
//! );
//! ```
//!
//! 같은 경로에 권한이 다른 메서드가 있으면(`GET /books` 전체, `POST /books` 사서/관리자)
//! 핸들러 매크로의 `wrap` 인자로 리소스 단위에 적용합니다.
//!
//! | 스코프 | 권한 |
//! |--------|------|
//! | `/api/v1/auth` | 핸들러별 (가입/로그인/갱신은 공개) |
//! | `/api/v1/users` | 관리자 |
//! | `/api/v1/books` | 조회: 로그인, 변경: 사서/관리자 |
//! | `/api/v1/copies` | 사서/관리자 |
//! | `/api/v1/circulation` | 핸들러별 |
//! | `/api/v1/fines` | 핸들러별 |
//! | `/api/v1/audit-logs` | 관리자 |
//! | `/api/v1/config` | 조회: 로그인, 변경: 관리자 |
//! | `/api/v1/feedback` | 로그인, 답변: 사서/관리자 |

use crate::handlers;
use crate::middlewares::AuthMiddleware;
use actix_web::{get, web, HttpResponse};
use serde_json::json;

/// 모든 라우트를 설정합니다
///
/// ```rust,ignore
/// let app = App::new().configure(configure_all_routes);
/// ```
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);

    configure_auth_routes(cfg);
    configure_user_routes(cfg);
    configure_catalog_routes(cfg);
    configure_circulation_routes(cfg);
    configure_admin_routes(cfg);
    configure_feedback_routes(cfg);
}

fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/auth")
            .service(handlers::auth::register)
            .service(handlers::auth::login)
            .service(handlers::auth::refresh)
            .service(handlers::auth::logout)
            .service(handlers::auth::me)
    );
}

fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(AuthMiddleware::admin())
            .service(handlers::users::create_user)
            .service(handlers::users::list_users)
            .service(handlers::users::get_user)
            .service(handlers::users::update_user_status)
    );
}

/// 도서, CSV 일괄 등록, 사본
///
/// `/bulk-upload`는 `/{book_id}`보다 먼저 등록합니다.
fn configure_catalog_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/books")
            .service(handlers::books::bulk_upload)
            .service(handlers::books::create_book)
            .service(handlers::books::list_books)
            .service(handlers::books::get_book)
            .service(handlers::books::update_book)
            .service(handlers::books::delete_book)
            .service(handlers::books::add_copies)
            .service(handlers::books::list_copies)
    );

    cfg.service(
        web::scope("/api/v1/copies")
            .wrap(AuthMiddleware::staff())
            .service(handlers::books::get_copy)
            .service(handlers::books::update_copy_status)
            .service(handlers::books::delete_copy)
    );
}

/// 대출/반납과 연체료
///
/// `/transactions`는 `/transactions/{id}`보다 먼저 등록합니다.
fn configure_circulation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/circulation")
            .service(handlers::circulation::issue_book)
            .service(handlers::circulation::return_book)
            .service(handlers::circulation::renew_loan)
            .service(handlers::circulation::mark_lost)
            .service(handlers::circulation::list_transactions)
            .service(handlers::circulation::get_transaction)
            .service(handlers::circulation::my_transactions)
    );

    cfg.service(
        web::scope("/api/v1/fines")
            .service(handlers::fines::list_fines)
            .service(handlers::fines::my_fines)
            .service(handlers::fines::pay_fine)
    );
}

fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/audit-logs")
            .wrap(AuthMiddleware::admin())
            .service(handlers::admin::list_audit_logs)
    );

    cfg.service(
        web::scope("/api/v1/config")
            .service(handlers::admin::get_config)
            .service(handlers::admin::update_config)
    );
}

fn configure_feedback_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/feedback")
            .service(handlers::feedback::create_feedback)
            .service(handlers::feedback::list_feedback)
            .service(handlers::feedback::get_feedback)
            .service(handlers::feedback::reply_feedback)
            .service(handlers::feedback::close_feedback)
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "library_service_backend",
///   "version": "0.1.0",
///   "timestamp": "2024-01-01T00:00:00+00:00"
/// }
/// ```
#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "library_service_backend");
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_protected_routes_require_token() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;

        for uri in [
            "/api/v1/books",
            "/api/v1/users",
            "/api/v1/circulation/my",
            "/api/v1/fines/my",
            "/api/v1/audit-logs",
            "/api/v1/config",
            "/api/v1/feedback",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_staff_routes_require_token() {
        let app = test::init_service(App::new().configure(configure_all_routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/circulation/issue")
            .set_json(json!({ "student_id": "65f000000000000000000001", "book_id": "65f000000000000000000002" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
