//! 도서관 운영 정책 기본값
//!
//! `system_config` 문서가 아직 없을 때 시드 값으로 사용됩니다.
//! 운영 중 변경은 `PUT /api/v1/config`로 하며, 이 값들은 최초 기동 시에만 의미가 있습니다.

use super::data_config::env_or;

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryDefaults {
    pub loan_period_days: i64,
    pub max_books_per_student: i64,
    pub fine_per_day: f64,
    pub lost_book_fee: f64,
    pub max_renewals: i32,
}

impl LibraryDefaults {
    pub const LOAN_PERIOD_DAYS: i64 = 14;
    pub const MAX_BOOKS_PER_STUDENT: i64 = 3;
    pub const FINE_PER_DAY: f64 = 1.0;
    pub const LOST_BOOK_FEE: f64 = 50.0;
    pub const MAX_RENEWALS: i32 = 1;

    pub fn from_env() -> Self {
        Self {
            loan_period_days: env_or("DEFAULT_LOAN_PERIOD_DAYS", Self::LOAN_PERIOD_DAYS),
            max_books_per_student: env_or("DEFAULT_MAX_BOOKS_PER_STUDENT", Self::MAX_BOOKS_PER_STUDENT),
            fine_per_day: env_or("DEFAULT_FINE_PER_DAY", Self::FINE_PER_DAY),
            lost_book_fee: env_or("DEFAULT_LOST_BOOK_FEE", Self::LOST_BOOK_FEE),
            max_renewals: env_or("DEFAULT_MAX_RENEWALS", Self::MAX_RENEWALS),
        }
    }
}

impl Default for LibraryDefaults {
    fn default() -> Self {
        Self {
            loan_period_days: Self::LOAN_PERIOD_DAYS,
            max_books_per_student: Self::MAX_BOOKS_PER_STUDENT,
            fine_per_day: Self::FINE_PER_DAY,
            lost_book_fee: Self::LOST_BOOK_FEE,
            max_renewals: Self::MAX_RENEWALS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let defaults = LibraryDefaults::default();
        assert_eq!(defaults.loan_period_days, 14);
        assert_eq!(defaults.max_books_per_student, 3);
        assert_eq!(defaults.fine_per_day, 1.0);
        assert_eq!(defaults.lost_book_fee, 50.0);
        assert_eq!(defaults.max_renewals, 1);
    }
}
