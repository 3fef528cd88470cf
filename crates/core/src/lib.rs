//! `webcheck-core` -- change-detection and alert-deduplication engine.
//!
//! Pure domain logic with no database or network access:
//!
//! - [`diff`] -- line-sequence similarity ratio and unified diff rendering.
//! - [`externals`] -- external resource extraction and trust classification.
//! - [`dedup`] -- time-windowed alert suppression.
//! - [`alert`] -- alert categories, findings, and the outgoing batch.
//! - [`store`] / [`transport`] -- the narrow interfaces the orchestrator
//!   consumes; [`memory`] implements the store side in process.

pub mod alert;
pub mod dedup;
pub mod diff;
pub mod error;
pub mod externals;
pub mod memory;
pub mod store;
pub mod transport;
pub mod types;

pub use alert::{AlertBatch, AlertCategory, EventLevel, Finding};
pub use dedup::Deduplicator;
pub use error::{CoreError, CoreResult};
