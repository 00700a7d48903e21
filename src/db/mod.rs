//! # MongoDB 연결 관리
//!
//! 애플리케이션 전체에서 공유하는 MongoDB 클라이언트 래퍼입니다.
//! 시작 시 한 번 생성되어 `ServiceLocator::set()`으로 등록되고,
//! 각 `#[repository]`가 `db: Arc<Database>` 필드로 주입받습니다.
//!
//! 모든 컬렉션(`users`, `books`, `book_copies`, `transactions`, `audit_logs`,
//! `system_config`, `feedback`)은 같은 데이터베이스(`DATABASE_NAME`)에 위치합니다.

use mongodb::{Client, options::ClientOptions};
use log::info;
use crate::config::DataStoreConfig;

#[derive(Clone)]
pub struct Database {
    client: Client,
    database_name: String,
}

impl Database {
    /// 환경 설정으로 클라이언트를 만들고 `ping`으로 연결을 확인합니다.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let mongodb_uri = DataStoreConfig::mongodb_uri();
        let database_name = DataStoreConfig::database_name();

        let mut client_options = ClientOptions::parse(&mongodb_uri).await?;
        client_options.app_name = Some("library_service".to_string());

        let client = Client::with_options(client_options)?;

        client
            .database(&database_name)
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("✅ MongoDB 연결 성공: {}", database_name);

        Ok(Self {
            client,
            database_name,
        })
    }

    pub fn get_database(&self) -> mongodb::Database {
        self.client.database(&self.database_name)
    }
}
