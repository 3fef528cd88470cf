//! Alert categories, per-URL findings, and the outgoing alert batch.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Default subject line of the composed alert message.
pub const DEFAULT_ALERT_SUBJECT: &str = "WebCheck alert";

/// Separator placed between individual alert messages in a batch.
const BATCH_SEPARATOR: &str = "\n\n\n";

// ---------------------------------------------------------------------------
// AlertCategory
// ---------------------------------------------------------------------------

/// The kind of problem an alert reports. Deduplication is keyed on
/// `(url, category)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    ConnectivityFailure,
    ContentDrift,
    UntrustedExternal,
}

impl AlertCategory {
    /// All categories in the order findings are dispatched for a URL.
    pub const ALL: [AlertCategory; 3] = [
        AlertCategory::ConnectivityFailure,
        AlertCategory::ContentDrift,
        AlertCategory::UntrustedExternal,
    ];

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectivityFailure => "connectivity_failure",
            Self::ContentDrift => "content_drift",
            Self::UntrustedExternal => "untrusted_external",
        }
    }

    /// Parse the stored representation produced by [`AlertCategory::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EventLevel
// ---------------------------------------------------------------------------

/// Severity of an operational event written to the event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Warn,
    Fail,
}

impl EventLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// A problem detected for one URL during one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    ConnectivityFailure {
        url: String,
        reason: String,
    },
    ContentDrift {
        url: String,
        ratio: f64,
        threshold: f64,
        diff: String,
    },
    UntrustedExternal {
        url: String,
        hosts: BTreeSet<String>,
    },
}

impl Finding {
    pub fn category(&self) -> AlertCategory {
        match self {
            Self::ConnectivityFailure { .. } => AlertCategory::ConnectivityFailure,
            Self::ContentDrift { .. } => AlertCategory::ContentDrift,
            Self::UntrustedExternal { .. } => AlertCategory::UntrustedExternal,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::ConnectivityFailure { url, .. }
            | Self::ContentDrift { url, .. }
            | Self::UntrustedExternal { url, .. } => url,
        }
    }

    /// The alert text contributed to the outgoing batch.
    pub fn message(&self) -> String {
        match self {
            Self::ConnectivityFailure { url, reason } => {
                format!("Error retrieving {url} : {reason}")
            }
            Self::ContentDrift {
                url,
                ratio,
                threshold,
                diff,
            } => format!(
                "Difference detected ({ratio}) in URL {url} that is over threshold ({threshold}):\n{diff}\n"
            ),
            Self::UntrustedExternal { url, hosts } => format!(
                "Externals in URL {url} not in whitelist: \n\t{}",
                hosts.iter().map(String::as_str).collect::<Vec<_>>().join("\n\t")
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertBatch
// ---------------------------------------------------------------------------

/// Alert messages that survived deduplication during one pass, delivered as
/// a single composed message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertBatch {
    entries: Vec<(AlertCategory, String, String)>,
}

impl AlertBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: &Finding) {
        self.entries
            .push((finding.category(), finding.url().to_string(), finding.message()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(category, url)` of each entry in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = (AlertCategory, &str)> {
        self.entries.iter().map(|(c, u, _)| (*c, u.as_str()))
    }

    /// The message body: every alert text separated by two blank lines.
    pub fn compose(&self) -> String {
        self.entries
            .iter()
            .map(|(_, _, message)| message.as_str())
            .collect::<Vec<_>>()
            .join(BATCH_SEPARATOR)
    }
}
