pub mod config;
pub mod fetch;
pub mod run;
pub mod scheduler;

pub use config::MonitorConfig;
pub use fetch::HttpFetcher;
pub use run::{run_pass, DeliveryOutcome, RunContext, RunReport};
