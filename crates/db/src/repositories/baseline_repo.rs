//! Repository for the `baselines` table.

use sqlx::SqlitePool;
use webcheck_core::types::Timestamp;

use crate::models::baseline::Baseline;

/// Column list for `baselines` queries.
const COLUMNS: &str = "id, url, content, updated_at";

/// Provides read/upsert operations for per-URL baselines.
pub struct BaselineRepo;

impl BaselineRepo {
    /// Find the baseline for `url`.
    pub async fn find_by_url(pool: &SqlitePool, url: &str) -> Result<Option<Baseline>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM baselines WHERE url = ?");
        sqlx::query_as::<_, Baseline>(&query)
            .bind(url)
            .fetch_optional(pool)
            .await
    }

    /// Create the baseline for `url` or replace it entirely.
    ///
    /// A single `INSERT ... ON CONFLICT` statement, so readers never observe a
    /// partially written row.
    pub async fn upsert(
        pool: &SqlitePool,
        url: &str,
        content: &str,
        updated_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO baselines (url, content, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (url) DO UPDATE SET \
                content = excluded.content, \
                updated_at = excluded.updated_at",
        )
        .bind(url)
        .bind(content)
        .bind(updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Number of stored baselines.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM baselines")
            .fetch_one(pool)
            .await
    }
}
