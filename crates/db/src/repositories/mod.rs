//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&SqlitePool` as the first argument.

pub mod alert_repo;
pub mod baseline_repo;
pub mod diff_repo;
pub mod event_repo;

pub use alert_repo::AlertRepo;
pub use baseline_repo::BaselineRepo;
pub use diff_repo::DiffRepo;
pub use event_repo::EventRepo;
