//! Error taxonomy for the service layer.

/// All errors the service layer can surface to a caller.
///
/// Overflow is deliberately absent: an oversized result degrades into a
/// successful response carrying a `resource_uri`, never an error.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Spreadsheet or requested sheet absent. Fatal for the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad caller input (non-positive sample size, malformed cursor).
    /// Raised before any remote fetch.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Remote fetch failure, propagated unchanged. No local retry.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
