//! 공통 DTO: 페이지네이션과 단순 메시지 응답

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// 정규화된 페이지 정보
///
/// 잘못된 값은 오류 대신 허용 범위로 보정합니다. (`page < 1` → 1, `limit` → 1..=100)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pagination {
    pub page: u64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: Option<u64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// MongoDB `skip` 값
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 페이지 단위 목록 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: i64,
    pub total_pages: u64,
}

impl<T> PagedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        let total_pages = total.div_ceil(pagination.limit as u64);

        Self {
            items,
            total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PagedResponse<U> {
        PagedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps_values() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(3), Some(500)), Pagination { page: 3, limit: 100 });
        assert_eq!(Pagination::new(Some(3), Some(10)).skip(), 20);
    }

    #[test]
    fn test_paged_response_total_pages() {
        let paged = PagedResponse::new(vec![1, 2, 3], 41, Pagination::new(Some(1), Some(20)));
        assert_eq!(paged.total_pages, 3);

        let empty: PagedResponse<i32> = PagedResponse::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages, 0);

        let mapped = paged.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total, 41);
    }
}
