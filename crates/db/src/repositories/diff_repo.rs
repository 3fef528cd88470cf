//! Repository for the `diffs` table (append-only).

use sqlx::SqlitePool;
use webcheck_core::types::{DbId, Timestamp};

use crate::models::diff::Diff;

const COLUMNS: &str = "id, url, ratio, diff, created_at";

pub struct DiffRepo;

impl DiffRepo {
    /// Insert a new diff row, returning the generated ID.
    pub async fn insert(
        pool: &SqlitePool,
        url: &str,
        ratio: f64,
        diff: &str,
        created_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO diffs (url, ratio, diff, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(url)
        .bind(ratio)
        .bind(diff)
        .bind(created_at)
        .fetch_one(pool)
        .await
    }

    /// List diffs recorded for `url`, newest first.
    pub async fn list_for_url(
        pool: &SqlitePool,
        url: &str,
        limit: i64,
    ) -> Result<Vec<Diff>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM diffs WHERE url = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        );
        sqlx::query_as::<_, Diff>(&query)
            .bind(url)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
