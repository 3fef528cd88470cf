//! Alert delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send the
//! plain-text alert batch produced by a monitoring pass. Relay settings come
//! from environment variables ([`EmailConfig::from_env`]) or from the relay
//! host named in the monitor configuration ([`EmailConfig::relay`]).

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use webcheck_core::transport::MailTransport;
use webcheck_core::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port for an unauthenticated local relay.
const DEFAULT_SMTP_PORT: u16 = 25;

/// Upper bound on a single SMTP conversation.
const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 25).
    pub smtp_port: u16,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Upgrade the connection with STARTTLS before sending.
    pub starttls: bool,
}

impl EmailConfig {
    /// Plain relay on `host` with default port and no credentials.
    pub fn relay(host: impl Into<String>) -> Self {
        Self {
            smtp_host: host.into(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            starttls: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable         | Required | Default |
    /// |------------------|----------|---------|
    /// | `SMTP_HOST`      | yes      | --      |
    /// | `SMTP_PORT`      | no       | `25`    |
    /// | `SMTP_USER`      | no       | --      |
    /// | `SMTP_PASSWORD`  | no       | --      |
    /// | `SMTP_STARTTLS`  | no       | `false` |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self::relay(smtp_host).with_env_overrides())
    }

    /// Apply port, credentials and STARTTLS settings from the environment,
    /// keeping the host.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = std::env::var("SMTP_PORT").ok().and_then(|p| p.parse().ok()) {
            self.smtp_port = port;
        }
        self.smtp_user = std::env::var("SMTP_USER").ok().or(self.smtp_user);
        self.smtp_password = std::env::var("SMTP_PASSWORD").ok().or(self.smtp_password);
        if let Ok(flag) = std::env::var("SMTP_STARTTLS") {
            self.starttls = matches!(flag.trim(), "1" | "true" | "yes");
        }
        self
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends composed alert batches via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    /// Create a new email delivery service with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmailConfig {
        &self.config
    }

    /// Assemble the plain-text message without touching the network.
    pub fn build_message(
        subject: &str,
        from: &str,
        recipients: &[String],
        body: &str,
    ) -> Result<Message, EmailError> {
        if recipients.is_empty() {
            return Err(EmailError::Build("no recipients".to_string()));
        }

        let mut builder = Message::builder()
            .from(from.parse::<Mailbox>()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        builder
            .body(body.to_string())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let builder = if self.config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        };
        let mut builder = builder
            .port(self.config.smtp_port)
            .timeout(Some(SMTP_TIMEOUT));

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }

    /// Send one alert message to every recipient.
    pub async fn send(
        &self,
        subject: &str,
        from: &str,
        recipients: &[String],
        body: &str,
    ) -> Result<(), EmailError> {
        let email = Self::build_message(subject, from, recipients, body)?;
        self.transport()?.send(email).await?;

        tracing::info!(
            recipients = recipients.len(),
            smtp_host = %self.config.smtp_host,
            "Alert email sent"
        );
        Ok(())
    }
}

#[async_trait]
impl MailTransport for EmailDelivery {
    async fn deliver(
        &self,
        subject: &str,
        from: &str,
        recipients: &[String],
        body: &str,
    ) -> CoreResult<()> {
        self.send(subject, from, recipients, body)
            .await
            .map_err(|e| CoreError::Delivery(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
