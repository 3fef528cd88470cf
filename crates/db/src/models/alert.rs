//! Alert record entity model.

use chrono::{TimeZone, Utc};
use serde::Serialize;
use sqlx::FromRow;
use webcheck_core::store::AlertRecord;
use webcheck_core::types::DbId;
use webcheck_core::AlertCategory;

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub url: String,
    pub category: String,
    pub created_at_ms: i64,
}

impl Alert {
    /// Convert to the domain record. Returns `None` for an unknown category
    /// or an out-of-range timestamp.
    pub fn to_record(&self) -> Option<AlertRecord> {
        Some(AlertRecord {
            created_at: Utc.timestamp_millis_opt(self.created_at_ms).single()?,
            url: self.url.clone(),
            category: AlertCategory::parse(&self.category)?,
        })
    }
}
