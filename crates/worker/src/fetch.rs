//! HTTP page retrieval.
//!
//! [`HttpFetcher`] implements [`Fetcher`] with `reqwest`. The body is decoded
//! using the charset announced in `Content-Type` (UTF-8 when absent), split
//! into lines, and stripped of trailing whitespace. Any failure, including a
//! non-success status, is a connectivity failure for that URL only.

use std::time::Duration;

use async_trait::async_trait;
use webcheck_core::transport::Fetcher;
use webcheck_core::{CoreError, CoreResult};

/// User agent announced to monitored sites.
const USER_AGENT: &str = concat!("webcheck/", env!("CARGO_PKG_VERSION"));

/// Retrieves monitored pages over HTTP(S).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a shared connection pool.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> CoreResult<Vec<String>> {
        let failure = |reason: String| CoreError::Connectivity {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| failure(describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| failure(describe(&e)))?;
        let lines = split_lines(&body);
        tracing::debug!(url, lines = lines.len(), "Fetched page");
        Ok(lines)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// Split a decoded body into lines without trailing whitespace.
pub fn split_lines(body: &str) -> Vec<String> {
    body.lines().map(|line| line.trim_end().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_trims_line_ends_and_handles_crlf() {
        assert_eq!(
            split_lines("<html>  \r\n<body>\t\n</html>"),
            vec!["<html>", "<body>", "</html>"]
        );
    }

    #[test]
    fn split_lines_of_empty_body_is_empty() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn new_does_not_fail() {
        assert!(HttpFetcher::new().is_ok());
    }
}
