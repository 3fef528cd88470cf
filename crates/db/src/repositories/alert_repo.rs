//! Repository for the `alerts` table.
//!
//! Timestamps are passed as epoch milliseconds; callers convert at the
//! boundary.

use sqlx::SqlitePool;
use webcheck_core::types::DbId;

use crate::models::alert::Alert;

const COLUMNS: &str = "id, url, category, created_at_ms";

pub struct AlertRepo;

impl AlertRepo {
    /// Whether an alert for `(url, category)` exists strictly after `after_ms`.
    pub async fn exists_after(
        pool: &SqlitePool,
        url: &str,
        category: &str,
        after_ms: i64,
    ) -> Result<bool, sqlx::Error> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM alerts WHERE url = ? AND category = ? AND created_at_ms > ?\
             )",
        )
        .bind(url)
        .bind(category)
        .bind(after_ms)
        .fetch_one(pool)
        .await?;
        Ok(exists != 0)
    }

    pub async fn insert(
        pool: &SqlitePool,
        url: &str,
        category: &str,
        created_at_ms: i64,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO alerts (url, category, created_at_ms) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(url)
        .bind(category)
        .bind(created_at_ms)
        .fetch_one(pool)
        .await
    }

    /// Delete alerts at or before `cutoff_ms`.
    ///
    /// Returns the number of rows deleted.
    pub async fn delete_through(pool: &SqlitePool, cutoff_ms: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts WHERE created_at_ms <= ?")
            .bind(cutoff_ms)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// List alerts for `url`, newest first.
    pub async fn list_for_url(pool: &SqlitePool, url: &str) -> Result<Vec<Alert>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM alerts WHERE url = ? ORDER BY created_at_ms DESC, id DESC");
        sqlx::query_as::<_, Alert>(&query)
            .bind(url)
            .fetch_all(pool)
            .await
    }
}
