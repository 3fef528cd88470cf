//! Diff record entity model.

use serde::Serialize;
use sqlx::FromRow;
use webcheck_core::types::{DbId, Timestamp};

/// A row from the `diffs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Diff {
    pub id: DbId,
    pub url: String,
    pub ratio: f64,
    pub diff: String,
    pub created_at: Timestamp,
}
