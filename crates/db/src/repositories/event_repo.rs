//! Repository for the `events` table.

use sqlx::SqlitePool;
use webcheck_core::types::{DbId, Timestamp};

use crate::models::event::Event;

/// Column list for `events` queries.
const COLUMNS: &str = "id, level, message, created_at";

/// Provides read/write operations for operational events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event row, returning the generated ID.
    pub async fn insert(
        pool: &SqlitePool,
        level: &str,
        message: &str,
        created_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events (level, message, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(level)
        .bind(message)
        .bind(created_at)
        .fetch_one(pool)
        .await
    }

    /// List recent events ordered newest-first.
    pub async fn list_recent(
        pool: &SqlitePool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
