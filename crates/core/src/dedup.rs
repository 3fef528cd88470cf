//! Time-windowed alert suppression.
//!
//! An alert for `(url, category)` is suppressed while an earlier alert for the
//! same key sits inside the repeat window. The decision only ever looks at
//! records newer than `now - window`, so pruning old records is an
//! optimisation and never changes an outcome.

use chrono::{DateTime, Duration, Utc};

use crate::alert::AlertCategory;
use crate::error::CoreResult;
use crate::store::{AlertLog, AlertRecord};
use crate::types::Timestamp;

/// Sliding-window filter over the alert log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deduplicator {
    window: Duration,
}

impl Deduplicator {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Window of `minutes`, saturating at the largest representable span.
    pub fn from_minutes(minutes: i64) -> Self {
        Self::new(Duration::try_minutes(minutes).unwrap_or(Duration::MAX))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Alerts at or before this instant no longer suppress anything.
    /// Saturates at the earliest representable instant.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.checked_sub_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// True iff an alert for `(url, category)` was recorded after
    /// `now - window`.
    pub async fn should_suppress<L: AlertLog + ?Sized>(
        &self,
        log: &L,
        url: &str,
        category: AlertCategory,
        now: Timestamp,
    ) -> CoreResult<bool> {
        log.has_alert_after(url, category, self.cutoff(now)).await
    }

    pub async fn record<L: AlertLog + ?Sized>(
        &self,
        log: &L,
        url: &str,
        category: AlertCategory,
        now: Timestamp,
    ) -> CoreResult<()> {
        log.insert_alert(&AlertRecord {
            created_at: now,
            url: url.to_string(),
            category,
        })
        .await
    }

    pub async fn prune<L: AlertLog + ?Sized>(&self, log: &L, now: Timestamp) -> CoreResult<u64> {
        log.prune_alerts(self.cutoff(now)).await
    }

    /// Suppression check followed by an opportunistic prune. A failed prune
    /// is logged and does not affect the decision.
    pub async fn check_and_prune<L: AlertLog + ?Sized>(
        &self,
        log: &L,
        url: &str,
        category: AlertCategory,
        now: Timestamp,
    ) -> CoreResult<bool> {
        let suppress = self.should_suppress(log, url, category, now).await?;
        match self.prune(log, now).await {
            Ok(0) => {}
            Ok(pruned) => tracing::debug!(pruned, "Pruned expired alert records"),
            Err(e) => tracing::warn!(error = %e, "Failed to prune expired alert records"),
        }
        Ok(suppress)
    }
}
