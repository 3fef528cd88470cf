//! Baseline entity model.
//!
//! Content is stored as a JSON array of lines so that every sequence,
//! including an empty one or one holding a single blank line, reads back
//! exactly as written.

use serde::Serialize;
use sqlx::FromRow;
use webcheck_core::types::{DbId, Timestamp};

/// A row from the `baselines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Baseline {
    pub id: DbId,
    pub url: String,
    pub content: String,
    pub updated_at: Timestamp,
}

impl Baseline {
    /// The stored content decoded back into lines.
    pub fn lines(&self) -> Result<Vec<String>, serde_json::Error> {
        decode_lines(&self.content)
    }
}

pub fn encode_lines(lines: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(lines)
}

pub fn decode_lines(content: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(content)
}
