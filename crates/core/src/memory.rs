//! In-process implementation of every store trait.
//!
//! Used by the orchestrator tests and anywhere a throwaway store is enough.
//! [`MemoryStore::fail_baseline_reads`] lets a caller simulate an unreachable
//! baseline store for a single URL.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::alert::{AlertCategory, EventLevel};
use crate::error::{CoreError, CoreResult};
use crate::store::{AlertLog, AlertRecord, BaselineStore, DiffLog, DiffRecord, EventSink};
use crate::types::Timestamp;

/// A recorded operational event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEvent {
    pub at: Timestamp,
    pub level: EventLevel,
    pub message: String,
}

#[derive(Default)]
struct Inner {
    baselines: BTreeMap<String, (Timestamp, Vec<String>)>,
    diffs: Vec<DiffRecord>,
    alerts: Vec<AlertRecord>,
    events: Vec<MemoryEvent>,
    failing_urls: BTreeSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))
    }

    fn snapshot<T>(&self, read: impl FnOnce(&Inner) -> T) -> Option<T> {
        self.inner.lock().ok().map(|inner| read(&inner))
    }

    /// Make every baseline read for `url` fail with a persistence error.
    pub fn fail_baseline_reads(&self, url: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_urls.insert(url.to_string());
        }
    }

    /// Stored baseline for `url` with its last write time.
    pub fn baseline(&self, url: &str) -> Option<(Timestamp, Vec<String>)> {
        self.snapshot(|inner| inner.baselines.get(url).cloned()).flatten()
    }

    pub fn baseline_count(&self) -> usize {
        self.snapshot(|inner| inner.baselines.len()).unwrap_or_default()
    }

    pub fn diffs(&self) -> Vec<DiffRecord> {
        self.snapshot(|inner| inner.diffs.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.snapshot(|inner| inner.alerts.clone()).unwrap_or_default()
    }

    pub fn events(&self) -> Vec<MemoryEvent> {
        self.snapshot(|inner| inner.events.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BaselineStore for MemoryStore {
    async fn get_baseline(&self, url: &str) -> CoreResult<Option<Vec<String>>> {
        let inner = self.lock()?;
        if inner.failing_urls.contains(url) {
            return Err(CoreError::Persistence(format!("baseline for {url} is unreadable")));
        }
        Ok(inner.baselines.get(url).map(|(_, lines)| lines.clone()))
    }

    async fn set_baseline(&self, url: &str, at: Timestamp, lines: &[String]) -> CoreResult<()> {
        self.lock()?
            .baselines
            .insert(url.to_string(), (at, lines.to_vec()));
        Ok(())
    }
}

#[async_trait]
impl DiffLog for MemoryStore {
    async fn save_diff(&self, record: &DiffRecord) -> CoreResult<()> {
        self.lock()?.diffs.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl AlertLog for MemoryStore {
    async fn has_alert_after(
        &self,
        url: &str,
        category: AlertCategory,
        after: Timestamp,
    ) -> CoreResult<bool> {
        Ok(self
            .lock()?
            .alerts
            .iter()
            .any(|a| a.url == url && a.category == category && a.created_at > after))
    }

    async fn insert_alert(&self, record: &AlertRecord) -> CoreResult<()> {
        self.lock()?.alerts.push(record.clone());
        Ok(())
    }

    async fn prune_alerts(&self, cutoff: Timestamp) -> CoreResult<u64> {
        let mut inner = self.lock()?;
        let before = inner.alerts.len();
        inner.alerts.retain(|a| a.created_at > cutoff);
        Ok((before - inner.alerts.len()) as u64)
    }
}

#[async_trait]
impl EventSink for MemoryStore {
    async fn record_event(&self, at: Timestamp, level: EventLevel, message: &str) -> CoreResult<()> {
        self.lock()?.events.push(MemoryEvent {
            at,
            level,
            message: message.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[tokio::test]
    async fn set_baseline_replaces_rather_than_duplicates() {
        let store = MemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();

        store.set_baseline("u", t0, &["a".into(), "b".into()]).await.unwrap();
        store.set_baseline("u", t1, &["c".into()]).await.unwrap();

        assert_eq!(store.baseline_count(), 1);
        assert_eq!(store.baseline("u"), Some((t1, vec!["c".to_string()])));
        assert_eq!(store.get_baseline("u").await.unwrap(), Some(vec!["c".to_string()]));
    }

    #[tokio::test]
    async fn missing_baseline_is_none_not_error() {
        let store = MemoryStore::new();
        assert_eq!(store.get_baseline("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failing_url_surfaces_persistence_error() {
        let store = MemoryStore::new();
        store.fail_baseline_reads("u");
        assert_matches!(store.get_baseline("u").await, Err(CoreError::Persistence(_)));
        assert_eq!(store.get_baseline("v").await.unwrap(), None);
    }

    #[tokio::test]
    async fn prune_removes_alerts_at_or_before_cutoff() {
        let store = MemoryStore::new();
        let cutoff = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        for offset in [-1, 0, 1] {
            store
                .insert_alert(&AlertRecord {
                    created_at: cutoff + chrono::Duration::minutes(offset),
                    url: "u".into(),
                    category: AlertCategory::ContentDrift,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.prune_alerts(cutoff).await.unwrap(), 2);
        assert_eq!(store.alerts().len(), 1);
    }
}
