//! Persistence interfaces consumed by the run orchestrator.
//!
//! The orchestrator never touches a database directly; it works through these
//! narrow traits so that the SQLite store and the in-memory store are
//! interchangeable.

use async_trait::async_trait;

use crate::alert::{AlertCategory, EventLevel};
use crate::error::CoreResult;
use crate::types::Timestamp;

/// A drift event worth keeping for later inspection. Append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRecord {
    pub created_at: Timestamp,
    pub url: String,
    pub ratio: f64,
    pub diff: String,
}

/// One raised-and-sent alert occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub created_at: Timestamp,
    pub url: String,
    pub category: AlertCategory,
}

/// Last-known-good content per URL.
#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// The stored lines for `url`, or `None` when no baseline exists yet.
    async fn get_baseline(&self, url: &str) -> CoreResult<Option<Vec<String>>>;

    /// Create or fully replace the baseline for `url`.
    async fn set_baseline(&self, url: &str, at: Timestamp, lines: &[String]) -> CoreResult<()>;
}

/// Append-only log of detected drift.
#[async_trait]
pub trait DiffLog: Send + Sync {
    async fn save_diff(&self, record: &DiffRecord) -> CoreResult<()>;
}

/// Log of sent alerts backing the deduplicator.
#[async_trait]
pub trait AlertLog: Send + Sync {
    /// Whether an alert for `(url, category)` exists with a timestamp strictly
    /// after `after`.
    async fn has_alert_after(
        &self,
        url: &str,
        category: AlertCategory,
        after: Timestamp,
    ) -> CoreResult<bool>;

    async fn insert_alert(&self, record: &AlertRecord) -> CoreResult<()>;

    /// Remove every alert with a timestamp at or before `cutoff`, returning
    /// how many were removed.
    async fn prune_alerts(&self, cutoff: Timestamp) -> CoreResult<u64>;
}

/// Durable record of operational events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn record_event(&self, at: Timestamp, level: EventLevel, message: &str) -> CoreResult<()>;
}

/// Everything a monitoring pass persists, reachable through one handle.
pub trait MonitorStore: BaselineStore + DiffLog + AlertLog + EventSink {}

impl<T: BaselineStore + DiffLog + AlertLog + EventSink> MonitorStore for T {}
