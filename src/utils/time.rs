//! BSON 날짜와 chrono 날짜 간 변환
//!
//! 문서에는 `bson::DateTime`(밀리초 UTC)으로 저장하고, 날짜 계산과 API 응답에는
//! `chrono::DateTime<Utc>`를 사용합니다.

use chrono::{DateTime, Duration, Utc};
use mongodb::bson;

pub fn now() -> bson::DateTime {
    bson::DateTime::now()
}

pub fn to_chrono(value: bson::DateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

pub fn to_bson(value: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(value.timestamp_millis())
}

/// 기준 시각에 일 수를 더한 BSON 날짜
pub fn add_days(base: bson::DateTime, days: i64) -> bson::DateTime {
    to_bson(to_chrono(base) + Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_conversion_keeps_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(to_chrono(to_bson(at)), at);
    }

    #[test]
    fn test_add_days_crosses_month_boundary() {
        let issued = to_bson(Utc.with_ymd_and_hms(2024, 2, 20, 12, 0, 0).unwrap());
        let due = add_days(issued, 14);
        assert_eq!(to_chrono(due), Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap());
    }
}
