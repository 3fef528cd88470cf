#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use webcheck_core::transport::{Fetcher, MailTransport};
use webcheck_core::types::Timestamp;
use webcheck_core::{CoreError, CoreResult};
use webcheck_worker::MonitorConfig;

/// A fixed point in time for passes that do not care about the clock.
pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

/// Build a validated config for `urls` with sensible alerting defaults.
pub fn config(urls: &[&str]) -> MonitorConfig {
    let raw = serde_json::json!({
        "urls": urls,
        "min_diff_ratio": 0.9,
        "trusted_srcs": ["example.org"],
        "alert_repeat_minutes": 30,
        "alert_from": "monitor@example.org",
        "alert_to": ["ops@example.org"],
    });
    MonitorConfig::from_json("test", &raw.to_string()).unwrap()
}

pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Returns canned pages or connectivity failures per URL.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, CoreResult<Vec<String>>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(lines(body)));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Err(CoreError::Connectivity {
                url: url.to_string(),
                reason: reason.to_string(),
            }),
        );
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> CoreResult<Vec<String>> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(lines)) => Ok(lines.clone()),
            Some(Err(CoreError::Connectivity { reason, .. })) => Err(CoreError::Connectivity {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            _ => Err(CoreError::Connectivity {
                url: url.to_string(),
                reason: "no route to host".to_string(),
            }),
        }
    }
}

/// A delivered (or attempted) alert message.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub subject: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub body: String,
}

/// Records every delivery attempt; optionally fails them all.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn deliver(
        &self,
        subject: &str,
        from: &str,
        recipients: &[String],
        body: &str,
    ) -> CoreResult<()> {
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            from: from.to_string(),
            recipients: recipients.to_vec(),
            body: body.to_string(),
        });
        if self.failing {
            return Err(CoreError::Delivery("relay refused connection".to_string()));
        }
        Ok(())
    }
}
