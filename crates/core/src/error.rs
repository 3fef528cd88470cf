/// Failure taxonomy for a monitoring pass.
///
/// Connectivity, persistence and delivery failures are scoped to a single URL
/// or to the final alert delivery; only configuration defects stop a run.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Error retrieving {url} : {reason}")]
    Connectivity { url: String, reason: String },

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Delivery failure: {0}")]
    Delivery(String),

    #[error("Configuration defect: {0}")]
    Configuration(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
