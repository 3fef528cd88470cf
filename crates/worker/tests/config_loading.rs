//! Loading the monitor configuration from disk.

use std::io::Write;
use std::path::Path;

use assert_matches::assert_matches;
use tempfile::NamedTempFile;
use webcheck_worker::config::{self, ConfigError};

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(body.as_bytes()).unwrap();
    file
}

#[test]
fn valid_file_applies_defaults() {
    let file = write_config(
        r#"{
            "urls": ["https://www.example.org/", "http://intranet.example.org/status"],
            "min_diff_ratio": 0.95,
            "trusted_srcs": ["example.org", "cdn.net"]
        }"#,
    );

    let config = config::load(file.path()).unwrap();

    assert_eq!(config.urls.len(), 2);
    assert_eq!(config.min_diff_ratio, 0.95);
    assert_eq!(config.trusted_srcs, vec!["example.org", "cdn.net"]);
    assert_eq!(config.alert_repeat_minutes, config::DEFAULT_ALERT_REPEAT_MINUTES);
    assert_eq!(config.fetch_timeout().as_secs(), config::DEFAULT_TIMEOUT_SECS);
    assert_eq!(config.alert_subject, "WebCheck alert");
    assert!(config.alert_to.is_empty());
    assert_eq!(config.deduplicator().window(), chrono::Duration::minutes(30));
}

#[test]
fn explicit_alerting_settings_are_kept() {
    let file = write_config(
        r#"{
            "urls": ["https://www.example.org/"],
            "min_diff_ratio": 0.8,
            "trusted_srcs": [],
            "alert_repeat_minutes": 120,
            "default_timeout": 5,
            "alert_from": "monitor@example.org",
            "alert_to": ["ops@example.org", "sec@example.org"],
            "alert_smtprelay": "relay.example.org",
            "alert_subject": "Site drift"
        }"#,
    );

    let config = config::load(file.path()).unwrap();

    assert_eq!(config.alert_repeat_minutes, 120);
    assert_eq!(config.fetch_timeout().as_secs(), 5);
    assert_eq!(config.alert_from.as_deref(), Some("monitor@example.org"));
    assert_eq!(config.alert_to.len(), 2);
    assert_eq!(config.alert_smtprelay.as_deref(), Some("relay.example.org"));
    assert_eq!(config.alert_subject, "Site drift");
}

#[test]
fn missing_file_is_a_read_error() {
    let result = config::load(Path::new("/nonexistent/webcheck/sites.json"));
    assert_matches!(result, Err(ConfigError::Read { .. }));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let file = write_config("{ \"urls\": [");
    assert_matches!(config::load(file.path()), Err(ConfigError::Parse { .. }));
}

#[test]
fn missing_required_key_is_a_parse_error() {
    let file = write_config(r#"{"urls": ["https://www.example.org/"], "trusted_srcs": []}"#);
    let err = config::load(file.path()).unwrap_err();
    assert_matches!(err, ConfigError::Parse { .. });
    assert!(err.to_string().contains("min_diff_ratio"));
}

#[test]
fn empty_url_list_is_invalid() {
    let file = write_config(r#"{"urls": [], "min_diff_ratio": 0.9, "trusted_srcs": []}"#);
    assert_matches!(config::load(file.path()), Err(ConfigError::Invalid { .. }));
}

#[test]
fn ratio_outside_unit_interval_is_invalid() {
    let file = write_config(
        r#"{"urls": ["https://www.example.org/"], "min_diff_ratio": 1.5, "trusted_srcs": []}"#,
    );
    assert_matches!(config::load(file.path()), Err(ConfigError::Invalid { .. }));
}

#[test]
fn relative_url_is_invalid() {
    let file = write_config(r#"{"urls": ["www.example.org"], "min_diff_ratio": 0.9, "trusted_srcs": []}"#);
    assert_matches!(config::load(file.path()), Err(ConfigError::Invalid { .. }));
}

#[test]
fn recipients_without_sender_are_invalid() {
    let file = write_config(
        r#"{
            "urls": ["https://www.example.org/"],
            "min_diff_ratio": 0.9,
            "trusted_srcs": [],
            "alert_to": ["ops@example.org"]
        }"#,
    );
    assert_matches!(config::load(file.path()), Err(ConfigError::Invalid { .. }));
}

#[test]
fn oversized_repeat_window_is_rejected_at_load() {
    let file = write_config(
        r#"{
            "urls": ["https://www.example.org/"],
            "min_diff_ratio": 0.9,
            "trusted_srcs": [],
            "alert_repeat_minutes": 1000000000000
        }"#,
    );
    let err = config::load(file.path()).unwrap_err();
    assert_matches!(err, ConfigError::Invalid { .. });
    assert!(err.to_string().contains("alert_repeat_minutes"));
}
