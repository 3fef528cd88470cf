//! Event entity model.

use serde::Serialize;
use sqlx::FromRow;
use webcheck_core::types::{DbId, Timestamp};

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub level: String,
    pub message: String,
    pub created_at: Timestamp,
}
