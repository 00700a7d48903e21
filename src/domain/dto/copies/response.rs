use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::entities::books::{BookCopy, CopyStatus};
use crate::utils::time::to_chrono;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyResponse {
    pub id: String,
    pub book_id: String,
    pub barcode: String,
    pub status: CopyStatus,
    pub shelf_location: Option<String>,
    pub condition_note: Option<String>,
    pub acquired_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookCopy> for CopyResponse {
    fn from(copy: BookCopy) -> Self {
        Self {
            id: copy.id.map(|id| id.to_hex()).unwrap_or_default(),
            book_id: copy.book_id.to_hex(),
            barcode: copy.barcode,
            status: copy.status,
            shelf_location: copy.shelf_location,
            condition_note: copy.condition_note,
            acquired_at: to_chrono(copy.acquired_at),
            updated_at: to_chrono(copy.updated_at),
        }
    }
}
