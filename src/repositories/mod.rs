//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! `#[repository]` 매크로를 사용하여 싱글톤으로 관리되는 리포지토리들을 제공합니다.
//! MongoDB를 주 저장소로 사용하고, 세션과 설정 캐시는 Redis에 둡니다.
//!
//! 여러 문서에 걸친 트랜잭션은 사용하지 않습니다. 일관성이 필요한 갱신은
//! 상태/카운터 조건을 필터에 포함한 단일 문서 원자 연산(`find_one_and_update`)으로 처리합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use crate::repositories::books::BookRepository;
//!
//! let book_repo = BookRepository::instance();
//! let book = book_repo.find_by_isbn("9788966260959").await?;
//! ```

use futures_util::TryStreamExt;
use mongodb::{
    bson::Document,
    error::{ErrorKind, WriteFailure},
    Collection,
};
use serde::de::DeserializeOwned;
use crate::core::errors::AppError;
use crate::domain::dto::Pagination;

pub mod audit;
pub mod books;
pub mod circulation;
pub mod feedback;
pub mod settings;
pub mod tokens;
pub mod users;

/// 유니크 인덱스 위반(E11000) 여부
pub(crate) fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// 필터에 맞는 문서를 정렬/페이지 단위로 조회하고 전체 건수를 함께 반환합니다.
pub(crate) async fn find_paged<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
    pagination: Pagination,
) -> Result<(Vec<T>, u64), AppError>
where
    T: DeserializeOwned + Send + Sync,
{
    let total = collection.count_documents(filter.clone()).await?;

    let items = collection
        .find(filter)
        .sort(sort)
        .skip(pagination.skip())
        .limit(pagination.limit)
        .await?
        .try_collect::<Vec<T>>()
        .await?;

    Ok((items, total))
}

/// 페이지 없이 필터에 맞는 모든 문서를 조회합니다.
pub(crate) async fn find_all<T>(
    collection: &Collection<T>,
    filter: Document,
    sort: Document,
) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Send + Sync,
{
    let items = collection
        .find(filter)
        .sort(sort)
        .await?
        .try_collect::<Vec<T>>()
        .await?;

    Ok(items)
}
