//! Monitor configuration.
//!
//! The monitored URL list and alerting policy live in a JSON file whose path
//! is given on the command line (or via `WEBCHECK_CONFIG`). Process-level
//! settings such as the database location and SMTP credentials come from the
//! environment.
//!
//! | Key                    | Required | Default          |
//! |------------------------|----------|------------------|
//! | `urls`                 | yes      | --               |
//! | `min_diff_ratio`       | yes      | --               |
//! | `trusted_srcs`         | yes      | --               |
//! | `alert_repeat_minutes` | no       | `30`             |
//! | `default_timeout`      | no       | `20` (seconds)   |
//! | `alert_from`           | no       | --               |
//! | `alert_to`             | no       | `[]`             |
//! | `alert_smtprelay`      | no       | `SMTP_HOST`, then `localhost` |
//! | `alert_subject`        | no       | `WebCheck alert` |

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;
use validator::{Validate, ValidationError, ValidationErrors};
use webcheck_core::alert::DEFAULT_ALERT_SUBJECT;
use webcheck_core::{CoreError, Deduplicator};
use webcheck_events::EmailConfig;

/// Default alert repeat window in minutes.
pub const DEFAULT_ALERT_REPEAT_MINUTES: i64 = 30;

/// Default per-request fetch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Longest accepted repeat window: ten years.
pub const MAX_ALERT_REPEAT_MINUTES: i64 = 5_256_000;

/// Longest accepted fetch timeout: one hour.
pub const MAX_TIMEOUT_SECS: u64 = 3_600;

/// Relay used when neither the config file nor `SMTP_HOST` names one.
const FALLBACK_SMTP_HOST: &str = "localhost";

/// Config file extensions stripped when deriving the database name.
const CONFIG_EXTENSIONS: &[&str] = &["json", "cfg"];

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file '{path}' cannot be opened/read: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Config file '{path}' cannot be parsed as JSON: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Config file '{path}' is invalid: {source}")]
    Invalid {
        path: String,
        source: ValidationErrors,
    },
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        CoreError::Configuration(err.to_string())
    }
}

// ---------------------------------------------------------------------------
// MonitorConfig
// ---------------------------------------------------------------------------

/// Everything a monitoring pass needs to know about what to check and whom
/// to tell.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_sender"))]
pub struct MonitorConfig {
    #[validate(length(min = 1), custom(function = "validate_urls"))]
    pub urls: Vec<String>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub min_diff_ratio: f64,

    pub trusted_srcs: Vec<String>,

    #[serde(default = "default_alert_repeat_minutes")]
    #[validate(range(min = 1, max = MAX_ALERT_REPEAT_MINUTES))]
    pub alert_repeat_minutes: i64,

    /// Per-request fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, max = MAX_TIMEOUT_SECS))]
    pub default_timeout: u64,

    #[serde(default)]
    #[validate(email)]
    pub alert_from: Option<String>,

    #[serde(default)]
    pub alert_to: Vec<String>,

    #[serde(default)]
    pub alert_smtprelay: Option<String>,

    #[serde(default = "default_alert_subject")]
    pub alert_subject: String,
}

fn default_alert_repeat_minutes() -> i64 {
    DEFAULT_ALERT_REPEAT_MINUTES
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_alert_subject() -> String {
    DEFAULT_ALERT_SUBJECT.to_string()
}

fn validate_urls(urls: &[String]) -> Result<(), ValidationError> {
    for raw in urls {
        let valid = Url::parse(raw)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            return Err(ValidationError::new("url")
                .with_message(Cow::Owned(format!("'{raw}' is not an absolute http(s) URL"))));
        }
    }
    Ok(())
}

fn validate_sender(config: &MonitorConfig) -> Result<(), ValidationError> {
    if !config.alert_to.is_empty() && config.alert_from.is_none() {
        return Err(ValidationError::new("alert_from")
            .with_message(Cow::Borrowed("'alert_from' is required when 'alert_to' is set")));
    }
    Ok(())
}

impl MonitorConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(path: &str, raw: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate().map_err(|source| ConfigError::Invalid {
            path: path.to_string(),
            source,
        })?;
        Ok(config)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout)
    }

    pub fn deduplicator(&self) -> Deduplicator {
        Deduplicator::from_minutes(self.alert_repeat_minutes)
    }

    /// SMTP relay settings: the configured relay host if any, otherwise
    /// `SMTP_HOST`, otherwise `localhost`. Port and credentials always come
    /// from the environment.
    pub fn mail_relay(&self) -> EmailConfig {
        match &self.alert_smtprelay {
            Some(host) => EmailConfig::relay(host.clone()).with_env_overrides(),
            None => EmailConfig::from_env()
                .unwrap_or_else(|| EmailConfig::relay(FALLBACK_SMTP_HOST).with_env_overrides()),
        }
    }
}

/// Read, parse and validate the config file at `path`.
pub fn load(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    MonitorConfig::from_json(&display, &raw)
}

/// Config file name without a `.json` / `.cfg` extension.
pub fn config_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, ext)) if CONFIG_EXTENSIONS.contains(&ext) => stem.to_string(),
        _ => name,
    }
}

/// SQLite database next to the config file, named after it.
pub fn default_database_url(config_path: &Path) -> String {
    let dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let db_path = dir.join(format!("{}.db", config_stem(config_path)));
    format!("sqlite://{}", db_path.display())
}
