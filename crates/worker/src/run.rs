//! One monitoring pass over the configured URLs.
//!
//! URLs are processed strictly one after another. For each URL the pass
//! consults the baseline, fetches the page, compares it against the baseline,
//! audits its external resources, and routes every finding through the
//! deduplicator. Surviving alerts are delivered as a single message once all
//! URLs are done.
//!
//! Failures stay local: a fetch error becomes a connectivity finding, and a
//! baseline store error abandons that URL for this pass. Neither stops the
//! remaining URLs.

use webcheck_core::diff::{self, DEFAULT_CONTEXT_LINES};
use webcheck_core::externals;
use webcheck_core::store::{DiffRecord, MonitorStore};
use webcheck_core::transport::{Fetcher, MailTransport};
use webcheck_core::types::Timestamp;
use webcheck_core::{AlertBatch, CoreError, CoreResult, Deduplicator, EventLevel, Finding};

use crate::config::MonitorConfig;

// ---------------------------------------------------------------------------
// Context and report
// ---------------------------------------------------------------------------

/// Everything a pass needs, passed explicitly so the clock and collaborators
/// can be substituted.
pub struct RunContext<'a> {
    /// Timestamp applied to every record written during the pass.
    pub now: Timestamp,
    pub config: &'a MonitorConfig,
    pub store: &'a dyn MonitorStore,
    pub fetcher: &'a dyn Fetcher,
    pub mailer: &'a dyn MailTransport,
}

/// What happened to the alert batch at the end of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// No alerts survived deduplication.
    NothingToSend,
    Sent,
    /// Alerts existed but no recipients are configured.
    NoRecipients,
    Failed(String),
}

/// Summary of a completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// URLs whose processing ran to completion (including fetch failures).
    pub urls_checked: usize,
    /// URLs abandoned because the baseline store failed.
    pub urls_abandoned: usize,
    pub baselines_created: usize,
    pub alerts_suppressed: usize,
    pub batch: AlertBatch,
    pub delivery: DeliveryOutcome,
}

impl Default for RunReport {
    fn default() -> Self {
        Self {
            urls_checked: 0,
            urls_abandoned: 0,
            baselines_created: 0,
            alerts_suppressed: 0,
            batch: AlertBatch::new(),
            delivery: DeliveryOutcome::NothingToSend,
        }
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

/// Run one pass over `ctx.config.urls`.
pub async fn run_pass(ctx: &RunContext<'_>) -> RunReport {
    let dedup = ctx.config.deduplicator();
    let mut report = RunReport::default();

    emit(
        ctx,
        EventLevel::Info,
        format!("Starting new test run with {} URLs", ctx.config.urls.len()),
    )
    .await;

    for url in &ctx.config.urls {
        emit(ctx, EventLevel::Info, format!("Testing URL : {url}")).await;

        let findings = match check_url(ctx, url, &mut report).await {
            Ok(findings) => findings,
            Err(e) => {
                emit(
                    ctx,
                    EventLevel::Fail,
                    format!("Abandoning {url} for this run : {e}"),
                )
                .await;
                report.urls_abandoned += 1;
                continue;
            }
        };
        report.urls_checked += 1;

        for finding in &findings {
            route_finding(ctx, &dedup, finding, &mut report).await;
        }
    }

    report.delivery = deliver_batch(ctx, &report.batch).await;
    report
}

/// Compare one URL against its baseline and collect findings.
///
/// Returns `Err` only when the baseline store fails.
async fn check_url(
    ctx: &RunContext<'_>,
    url: &str,
    report: &mut RunReport,
) -> CoreResult<Vec<Finding>> {
    let baseline = ctx.store.get_baseline(url).await?;

    let lines = match ctx.fetcher.fetch(url, ctx.config.fetch_timeout()).await {
        Ok(lines) => lines,
        Err(e) => {
            let reason = match e {
                CoreError::Connectivity { reason, .. } => reason,
                other => other.to_string(),
            };
            let finding = Finding::ConnectivityFailure {
                url: url.to_string(),
                reason,
            };
            emit(ctx, EventLevel::Fail, detection_event(&finding)).await;
            return Ok(vec![finding]);
        }
    };

    let Some(baseline) = baseline else {
        ctx.store.set_baseline(url, ctx.now, &lines).await?;
        report.baselines_created += 1;
        emit(ctx, EventLevel::Info, format!("Wrote new baseline for url : {url}")).await;
        return Ok(Vec::new());
    };

    let mut findings = Vec::new();

    let ratio = diff::ratio(&baseline, &lines);
    if ratio < ctx.config.min_diff_ratio {
        let diff_text = diff::render_diff(&baseline, &lines, DEFAULT_CONTEXT_LINES);
        let record = DiffRecord {
            created_at: ctx.now,
            url: url.to_string(),
            ratio,
            diff: diff_text.clone(),
        };
        if let Err(e) = ctx.store.save_diff(&record).await {
            emit(ctx, EventLevel::Fail, format!("Could not save diff for {url} : {e}")).await;
        }
        findings.push(Finding::ContentDrift {
            url: url.to_string(),
            ratio,
            threshold: ctx.config.min_diff_ratio,
            diff: diff_text,
        });
    }

    let untrusted = externals::untrusted_hosts(&lines, &ctx.config.trusted_srcs);
    if !untrusted.is_empty() {
        findings.push(Finding::UntrustedExternal {
            url: url.to_string(),
            hosts: untrusted,
        });
    }

    for finding in &findings {
        emit(ctx, EventLevel::Fail, detection_event(finding)).await;
    }
    Ok(findings)
}

/// One-line event text logged when a finding is first detected.
fn detection_event(finding: &Finding) -> String {
    match finding {
        Finding::ConnectivityFailure { url, reason } => {
            format!("Error retrieving {url} : {reason}")
        }
        Finding::ContentDrift {
            url,
            ratio,
            threshold,
            ..
        } => format!("Difference detected ({ratio}) in URL {url} that is over threshold ({threshold})"),
        Finding::UntrustedExternal { url, hosts } => format!(
            "Externals in URL {url} not in whitelist: {}",
            hosts.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Add `finding` to the batch unless an alert for the same key was sent
/// within the repeat window.
///
/// When the alert history cannot be read the alert is sent anyway.
async fn route_finding(
    ctx: &RunContext<'_>,
    dedup: &Deduplicator,
    finding: &Finding,
    report: &mut RunReport,
) {
    let url = finding.url();
    let category = finding.category();

    let suppress = match dedup.check_and_prune(ctx.store, url, category, ctx.now).await {
        Ok(suppress) => suppress,
        Err(e) => {
            emit(
                ctx,
                EventLevel::Warn,
                format!("Could not read alert history for {category}::{url} ({e}), alerting anyway"),
            )
            .await;
            false
        }
    };

    if suppress {
        emit(
            ctx,
            EventLevel::Info,
            format!("Recent alerts for {category}::{url}, not alerting this time"),
        )
        .await;
        report.alerts_suppressed += 1;
        return;
    }

    emit(
        ctx,
        EventLevel::Info,
        format!("No recent alerts for {category}::{url}, generating one."),
    )
    .await;
    report.batch.push(finding);
    if let Err(e) = dedup.record(ctx.store, url, category, ctx.now).await {
        emit(
            ctx,
            EventLevel::Warn,
            format!("Could not record alert for {category}::{url} : {e}"),
        )
        .await;
    }
}

async fn deliver_batch(ctx: &RunContext<'_>, batch: &AlertBatch) -> DeliveryOutcome {
    if batch.is_empty() {
        emit(ctx, EventLevel::Info, "Run completed without generating alerts".into()).await;
        return DeliveryOutcome::NothingToSend;
    }

    emit(ctx, EventLevel::Warn, "Run resulted in issues being identified".into()).await;

    let config = ctx.config;
    let (Some(from), false) = (config.alert_from.as_deref(), config.alert_to.is_empty()) else {
        emit(
            ctx,
            EventLevel::Fail,
            "Did not send alert, 'alert_to' not defined in config".into(),
        )
        .await;
        return DeliveryOutcome::NoRecipients;
    };

    match ctx
        .mailer
        .deliver(&config.alert_subject, from, &config.alert_to, &batch.compose())
        .await
    {
        Ok(()) => {
            emit(
                ctx,
                EventLevel::Info,
                format!("Successfully sent alert ({})", config.alert_to.join(", ")),
            )
            .await;
            DeliveryOutcome::Sent
        }
        Err(e) => {
            emit(ctx, EventLevel::Fail, format!("Error sending alert : {e}")).await;
            DeliveryOutcome::Failed(e.to_string())
        }
    }
}

/// Write an operational event to the tracing output and the event store.
///
/// Events are for visibility only; a failure to persist one is logged and
/// otherwise ignored.
async fn emit(ctx: &RunContext<'_>, level: EventLevel, message: String) {
    match level {
        EventLevel::Info => tracing::info!("{message}"),
        EventLevel::Warn => tracing::warn!("{message}"),
        EventLevel::Fail => tracing::error!("{message}"),
    }
    if let Err(e) = ctx.store.record_event(ctx.now, level, &message).await {
        tracing::warn!(error = %e, "Failed to persist event");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn detection_event_lists_hosts_on_one_line() {
        let finding = Finding::UntrustedExternal {
            url: "https://example.org/".into(),
            hosts: BTreeSet::from(["b.evil.net".to_string(), "a.evil.net".to_string()]),
        };
        assert_eq!(
            detection_event(&finding),
            "Externals in URL https://example.org/ not in whitelist: a.evil.net, b.evil.net"
        );
    }

    #[test]
    fn detection_event_for_drift_omits_diff_body() {
        let finding = Finding::ContentDrift {
            url: "https://example.org/".into(),
            ratio: 0.25,
            threshold: 0.9,
            diff: "-a\n+b".into(),
        };
        assert_eq!(
            detection_event(&finding),
            "Difference detected (0.25) in URL https://example.org/ that is over threshold (0.9)"
        );
    }

    #[test]
    fn default_report_has_nothing_to_send() {
        let report = RunReport::default();
        assert!(report.batch.is_empty());
        assert_eq!(report.delivery, DeliveryOutcome::NothingToSend);
    }
}
