//! Outbound alert delivery for the web page monitor.
//!
//! - [`delivery::email`] -- SMTP delivery of the composed alert batch,
//!   implementing [`webcheck_core::transport::MailTransport`].

pub mod delivery;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
