//! Row models, one module per table.

pub mod alert;
pub mod baseline;
pub mod diff;
pub mod event;
