//! 연체료 계산
//!
//! 연체 일수는 시각이 아닌 **UTC 달력 날짜** 차이로 계산합니다.
//! 반납 예정일 당일 반납은 연체가 아니며, 예정일 다음 날 00:00 이후 반납부터 1일로 셉니다.

use chrono::{DateTime, Utc};

/// 반납 예정일 `due`와 기준 시각 `at` 사이의 연체 일수 (연체가 아니면 0)
pub fn overdue_days(due: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (at.date_naive() - due.date_naive()).num_days().max(0)
}

/// 연체 일수 × 일일 연체료 (소수점 둘째 자리 반올림)
pub fn compute_fine(due: DateTime<Utc>, at: DateTime<Utc>, fine_per_day: f64) -> f64 {
    round_money(overdue_days(due, at) as f64 * fine_per_day.max(0.0))
}

/// 분실 처리 시 부과액: 분실 시점까지의 연체료 + 분실 수수료
pub fn lost_book_charge(due: DateTime<Utc>, at: DateTime<Utc>, fine_per_day: f64, lost_book_fee: f64) -> f64 {
    round_money(compute_fine(due, at, fine_per_day) + lost_book_fee.max(0.0))
}

/// `now` 기준 연체 판정 경계 (UTC 당일 00:00)
///
/// 반납 예정일이 이 시각보다 이전인 대출 중 기록이 연체 상태입니다.
pub fn overdue_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

/// 금액을 소수점 둘째 자리로 반올림
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_on_time_return_has_no_fine() {
        let due = at(2024, 5, 10, 18);
        assert_eq!(overdue_days(due, at(2024, 5, 9, 10)), 0);
        assert_eq!(overdue_days(due, at(2024, 5, 10, 23)), 0);
        assert_eq!(compute_fine(due, at(2024, 5, 10, 23), 1.0), 0.0);
    }

    #[test]
    fn test_partial_day_counts_by_calendar_date() {
        let due = at(2024, 5, 10, 18);
        assert_eq!(overdue_days(due, at(2024, 5, 11, 0)), 1);
        assert_eq!(overdue_days(due, at(2024, 5, 11, 1)), 1);
    }

    #[test]
    fn test_n_days_late() {
        let due = at(2024, 2, 27, 12);
        // 윤년 2월 29일 포함
        assert_eq!(overdue_days(due, at(2024, 3, 2, 9)), 4);
        assert_eq!(compute_fine(due, at(2024, 3, 2, 9), 1.5), 6.0);
    }

    #[test]
    fn test_fine_is_rounded_to_cents() {
        let due = at(2024, 1, 1, 12);
        assert_eq!(compute_fine(due, at(2024, 1, 4, 12), 0.333), 1.0);
        assert_eq!(compute_fine(due, at(2024, 1, 2, 12), 0.125), 0.13);
        assert_eq!(round_money(50.0 + 0.1 + 0.2), 50.3);
    }

    #[test]
    fn test_lost_book_charge_adds_fee() {
        let due = at(2024, 1, 1, 12);
        assert_eq!(lost_book_charge(due, at(2024, 1, 3, 9), 1.0, 50.0), 52.0);
        assert_eq!(lost_book_charge(due, at(2023, 12, 30, 9), 1.0, 50.0), 50.0);
    }

    #[test]
    fn test_overdue_cutoff_matches_overdue_days() {
        let now = at(2024, 5, 11, 15);
        let cutoff = overdue_cutoff(now);
        assert_eq!(cutoff, at(2024, 5, 11, 0));

        // 경계 직전 예정일은 연체, 경계 이후 예정일은 연체 아님
        let just_before = cutoff - chrono::Duration::seconds(1);
        assert_eq!(overdue_days(just_before, now), 1);
        assert_eq!(overdue_days(cutoff, now), 0);
    }

    #[test]
    fn test_negative_rate_is_treated_as_zero() {
        let due = at(2024, 1, 1, 12);
        assert_eq!(compute_fine(due, at(2024, 1, 5, 12), -2.0), 0.0);
    }
}
