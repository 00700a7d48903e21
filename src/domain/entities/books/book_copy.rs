//! 물리 사본 엔티티 (`book_copies` 컬렉션)
//!
//! 사본 상태 전이:
//!
//! ```text
//!            issue            return
//! available ───────▶ issued ───────▶ available
//!    │  ▲                │
//!    │  │ repair         │ report lost
//!    ▼  │                ▼
//!  damaged ─────────▶  lost ───────▶ available (found)
//! ```
//!
//! `issued` 진입/이탈은 대출/반납/분실 처리에서만 일어나며, 수동 상태 변경으로는 불가능합니다.

use std::fmt;
use std::str::FromStr;
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Issued,
    Lost,
    Damaged,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "available",
            CopyStatus::Issued => "issued",
            CopyStatus::Lost => "lost",
            CopyStatus::Damaged => "damaged",
        }
    }

    /// 수동 상태 변경 허용 여부
    pub fn can_transition_manually(&self, to: CopyStatus) -> bool {
        use CopyStatus::*;
        matches!(
            (self, to),
            (Available, Damaged) | (Damaged, Available) | (Available, Lost) | (Damaged, Lost) | (Lost, Available)
        )
    }

    /// `total_copies`에 포함되는 상태인지
    pub fn counts_toward_total(&self) -> bool {
        !matches!(self, CopyStatus::Lost)
    }

    /// `available_copies`에 포함되는 상태인지
    pub fn counts_as_available(&self) -> bool {
        matches!(self, CopyStatus::Available)
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available" => Ok(CopyStatus::Available),
            "issued" => Ok(CopyStatus::Issued),
            "lost" => Ok(CopyStatus::Lost),
            "damaged" => Ok(CopyStatus::Damaged),
            other => Err(format!("지원하지 않는 사본 상태입니다: {}", other)),
        }
    }
}

/// 상태 변경에 따른 도서 카운터 변화량 `(total, available)`
pub fn counter_delta(from: CopyStatus, to: CopyStatus) -> (i64, i64) {
    let total = to.counts_toward_total() as i64 - from.counts_toward_total() as i64;
    let available = to.counts_as_available() as i64 - from.counts_as_available() as i64;
    (total, available)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCopy {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub book_id: ObjectId,
    pub barcode: String,
    pub status: CopyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelf_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_note: Option<String>,
    pub acquired_at: DateTime,
    pub updated_at: DateTime,
}

impl BookCopy {
    pub fn new(book_id: ObjectId, isbn: &str, shelf_location: Option<String>) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            book_id,
            barcode: generate_barcode(isbn),
            status: CopyStatus::Available,
            shelf_location,
            condition_note: None,
            acquired_at: now,
            updated_at: now,
        }
    }

    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }
}

/// `LIB-<isbn>-<8자리 대문자 hex>` 형식 바코드 생성
pub fn generate_barcode(isbn: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    format!("LIB-{}-{}", isbn, suffix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_transition_table() {
        use CopyStatus::*;

        assert!(Available.can_transition_manually(Damaged));
        assert!(Damaged.can_transition_manually(Available));
        assert!(Available.can_transition_manually(Lost));
        assert!(Damaged.can_transition_manually(Lost));
        assert!(Lost.can_transition_manually(Available));

        assert!(!Available.can_transition_manually(Issued));
        assert!(!Issued.can_transition_manually(Available));
        assert!(!Issued.can_transition_manually(Lost));
        assert!(!Lost.can_transition_manually(Damaged));
        assert!(!Available.can_transition_manually(Available));
    }

    #[test]
    fn test_counter_delta() {
        use CopyStatus::*;

        assert_eq!(counter_delta(Available, Damaged), (0, -1));
        assert_eq!(counter_delta(Damaged, Available), (0, 1));
        assert_eq!(counter_delta(Available, Lost), (-1, -1));
        assert_eq!(counter_delta(Damaged, Lost), (-1, 0));
        assert_eq!(counter_delta(Lost, Available), (1, 1));
        assert_eq!(counter_delta(Issued, Lost), (-1, 0));
    }

    #[test]
    fn test_barcode_format() {
        let barcode = generate_barcode("9780306406157");
        let suffix = barcode.strip_prefix("LIB-9780306406157-").unwrap();

        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_ne!(barcode, generate_barcode("9780306406157"));
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [CopyStatus::Available, CopyStatus::Issued, CopyStatus::Lost, CopyStatus::Damaged] {
            assert_eq!(status.as_str().parse::<CopyStatus>(), Ok(status));
        }
        assert!("borrowed".parse::<CopyStatus>().is_err());
    }
}
