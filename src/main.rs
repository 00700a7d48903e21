//! 도서관 관리 백엔드 메인 애플리케이션
//!
//! MongoDB, Redis 연결과 싱글톤 레지스트리를 초기화하고, 컬렉션 인덱스와
//! 운영 정책 시드를 준비한 뒤 Actix-web HTTP 서버를 구동합니다.

use std::io;
use std::sync::Arc;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, App, HttpServer};
use actix_governor::{Governor, GovernorConfigBuilder};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use library_service_backend::caching::redis::RedisClient;
use library_service_backend::config::{RateLimitConfig, ServerConfig};
use library_service_backend::core::errors::{
    json_extractor_config, path_extractor_config, query_extractor_config, AppError,
};
use library_service_backend::core::registry::ServiceLocator;
use library_service_backend::db::Database;
use library_service_backend::repositories::{
    audit::AuditLogRepository,
    books::{BookCopyRepository, BookRepository},
    circulation::TransactionRepository,
    feedback::FeedbackRepository,
    settings::SystemConfigRepository,
    users::UserRepository,
};
use library_service_backend::routes::configure_all_routes;
use library_service_backend::services::settings::ConfigService;
use library_service_backend::utils::display_terminal::print_key_values;

#[actix_web::main]
async fn main() -> io::Result<()> {
    load_env_file();
    init_logging();

    info!("🚀 도서관 관리 서비스 시작중...");

    let (database, redis_client) = initialize_data_stores().await?;

    ServiceLocator::set(database);
    ServiceLocator::set(redis_client);

    ServiceLocator::initialize_all()
        .await
        .map_err(|e| io::Error::other(format!("서비스 초기화 실패: {}", e)))?;

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    prepare_collections()
        .await
        .map_err(|e| io::Error::other(format!("컬렉션 준비 실패: {}", e)))?;

    start_http_server().await
}

/// 컬렉션 인덱스를 만들고 운영 정책 문서를 시드합니다.
///
/// 유니크 인덱스(email, username, isbn, barcode, config key)가 중복 방지의 최종 보장이므로
/// 인덱스 생성 실패는 기동 실패로 처리합니다.
async fn prepare_collections() -> Result<(), AppError> {
    info!("🗂️ 인덱스 생성 중...");

    ServiceLocator::get::<UserRepository>().create_indexes().await?;
    ServiceLocator::get::<BookRepository>().create_indexes().await?;
    ServiceLocator::get::<BookCopyRepository>().create_indexes().await?;
    ServiceLocator::get::<TransactionRepository>().create_indexes().await?;
    ServiceLocator::get::<AuditLogRepository>().create_indexes().await?;
    ServiceLocator::get::<SystemConfigRepository>().create_indexes().await?;
    ServiceLocator::get::<FeedbackRepository>().create_indexes().await?;

    let config = ConfigService::instance().ensure_seeded().await?;

    print_key_values("📚 LIBRARY POLICY", &[
        ("loan_period_days", config.loan_period_days.to_string()),
        ("max_books_per_student", config.max_books_per_student.to_string()),
        ("fine_per_day", format!("{:.2}", config.fine_per_day)),
        ("lost_book_fee", format!("{:.2}", config.lost_book_fee)),
        ("max_renewals", config.max_renewals.to_string()),
    ]);

    Ok(())
}

/// HTTP 서버를 구성하고 실행합니다
///
/// 미들웨어 적용 순서 (바깥쪽부터): Rate Limiting → CORS → Logger → 경로 정규화
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server() -> io::Result<()> {
    let bind_address = ServerConfig::bind_address();
    let workers = ServerConfig::workers();

    info!("🌐 서버가 http://{} 에서 실행중입니다 (workers: {})", bind_address, workers);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API: http://{}/api/v1", bind_address);

    let rate_limit_config = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit_config.per_second)
        .burst_size(rate_limit_config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| io::Error::other("Rate Limiting 설정이 올바르지 않습니다"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit_config.per_second,
        rate_limit_config.burst_size
    );

    HttpServer::new(move || {
        let cors = configure_cors();

        App::new()
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())

            // 추출자 오류도 {"error": ...} 형식의 400으로 응답
            .app_data(json_extractor_config())
            .app_data(query_extractor_config())
            .app_data(path_extractor_config())

            .configure(configure_all_routes)
    })
        .bind(bind_address)?
        .workers(workers)
        .run()
        .await
}

/// 환경별 설정 파일을 로드합니다
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// `RUST_LOG`가 없으면 "info,actix_web=info"
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=info"));
}

/// MongoDB와 Redis 연결을 초기화합니다
async fn initialize_data_stores() -> io::Result<(Arc<Database>, Arc<RedisClient>)> {
    info!("📡 데이터베이스 연결 중...");

    let database = Database::new()
        .await
        .map_err(|e| io::Error::other(format!("데이터베이스 연결 실패: {}", e)))?;

    info!("✅ MongoDB 연결 성공");

    let redis_client = RedisClient::new()
        .await
        .map_err(|e| io::Error::other(format!("Redis 연결 실패: {}", e)))?;

    info!("✅ Redis 연결 성공");

    Ok((Arc::new(database), Arc::new(redis_client)))
}

/// 프론트엔드 개발 서버와의 통신을 위한 CORS 설정
fn configure_cors() -> Cors {
    Cors::default()
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
        ])
        .supports_credentials()
        .max_age(3600)
}
