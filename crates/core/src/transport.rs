//! Outbound I/O interfaces: page retrieval and alert mail delivery.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreResult;

/// Retrieves a page as decoded text lines.
///
/// Implementations report every failure (timeout, refused connection,
/// protocol error, non-success status) as [`CoreError::Connectivity`].
///
/// [`CoreError::Connectivity`]: crate::error::CoreError::Connectivity
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> CoreResult<Vec<String>>;
}

/// Delivers a composed alert message.
///
/// Failures are reported as [`CoreError::Delivery`] and are never retried
/// within a pass.
///
/// [`CoreError::Delivery`]: crate::error::CoreError::Delivery
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(
        &self,
        subject: &str,
        from: &str,
        recipients: &[String],
        body: &str,
    ) -> CoreResult<()>;
}
