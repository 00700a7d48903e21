//! # Configuration Module
//!
//! 환경 변수 기반 설정입니다. `PROFILE`에 따라 `.env.dev` / `.env.prod` / `.env`가
//! 먼저 로드되고(`main.rs`), 각 설정 구조체는 정적 메서드로 값을 읽습니다.
//!
//! | 구조체 | 환경 변수 |
//! |--------|-----------|
//! | `ServerConfig` | `HOST`, `PORT`, `SERVER_WORKERS` |
//! | `DataStoreConfig` | `MONGODB_URI`, `DATABASE_NAME`, `REDIS_URL` |
//! | `PasswordConfig` | `BCRYPT_COST`, `ENVIRONMENT` |
//! | `JwtConfig` | `JWT_SECRET`, `JWT_EXPIRATION_HOURS`, `JWT_REFRESH_EXPIRATION_DAYS` |
//! | `RateLimitConfig` | `RATE_LIMIT_PER_SECOND`, `RATE_LIMIT_BURST_SIZE` |
//! | `UploadConfig` | `CSV_MAX_BYTES`, `CSV_MAX_ROWS` |
//! | `LibraryDefaults` | `DEFAULT_LOAN_PERIOD_DAYS`, `DEFAULT_MAX_BOOKS_PER_STUDENT`, `DEFAULT_FINE_PER_DAY`, `DEFAULT_LOST_BOOK_FEE`, `DEFAULT_MAX_RENEWALS` |

pub mod auth_config;
pub mod data_config;
pub mod library_config;

pub use auth_config::*;
pub use data_config::*;
pub use library_config::*;
