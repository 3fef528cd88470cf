//! [`SqliteStore`]: the store traits from `webcheck_core` over a SQLite pool.

use async_trait::async_trait;
use webcheck_core::store::{AlertLog, AlertRecord, BaselineStore, DiffLog, DiffRecord, EventSink};
use webcheck_core::types::Timestamp;
use webcheck_core::{AlertCategory, CoreError, CoreResult, EventLevel};

use crate::models::baseline::encode_lines;
use crate::repositories::{AlertRepo, BaselineRepo, DiffRepo, EventRepo};
use crate::DbPool;

/// Persistent monitor state backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn persistence(e: sqlx::Error) -> CoreError {
    CoreError::Persistence(e.to_string())
}

fn corrupt_content(url: &str, e: serde_json::Error) -> CoreError {
    CoreError::Persistence(format!("stored baseline for {url} is unreadable: {e}"))
}

#[async_trait]
impl BaselineStore for SqliteStore {
    async fn get_baseline(&self, url: &str) -> CoreResult<Option<Vec<String>>> {
        let row = BaselineRepo::find_by_url(&self.pool, url)
            .await
            .map_err(persistence)?;
        row.map(|baseline| baseline.lines().map_err(|e| corrupt_content(url, e)))
            .transpose()
    }

    async fn set_baseline(&self, url: &str, at: Timestamp, lines: &[String]) -> CoreResult<()> {
        let content = encode_lines(lines).map_err(|e| corrupt_content(url, e))?;
        BaselineRepo::upsert(&self.pool, url, &content, at)
            .await
            .map_err(persistence)
    }
}

#[async_trait]
impl DiffLog for SqliteStore {
    async fn save_diff(&self, record: &DiffRecord) -> CoreResult<()> {
        DiffRepo::insert(
            &self.pool,
            &record.url,
            record.ratio,
            &record.diff,
            record.created_at,
        )
        .await
        .map_err(persistence)?;
        Ok(())
    }
}

#[async_trait]
impl AlertLog for SqliteStore {
    async fn has_alert_after(
        &self,
        url: &str,
        category: AlertCategory,
        after: Timestamp,
    ) -> CoreResult<bool> {
        AlertRepo::exists_after(&self.pool, url, category.as_str(), after.timestamp_millis())
            .await
            .map_err(persistence)
    }

    async fn insert_alert(&self, record: &AlertRecord) -> CoreResult<()> {
        AlertRepo::insert(
            &self.pool,
            &record.url,
            record.category.as_str(),
            record.created_at.timestamp_millis(),
        )
        .await
        .map_err(persistence)?;
        Ok(())
    }

    async fn prune_alerts(&self, cutoff: Timestamp) -> CoreResult<u64> {
        AlertRepo::delete_through(&self.pool, cutoff.timestamp_millis())
            .await
            .map_err(persistence)
    }
}

#[async_trait]
impl EventSink for SqliteStore {
    async fn record_event(&self, at: Timestamp, level: EventLevel, message: &str) -> CoreResult<()> {
        EventRepo::insert(&self.pool, level.as_str(), message, at)
            .await
            .map_err(persistence)?;
        Ok(())
    }
}
