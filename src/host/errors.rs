//! Host errors
//!
//! Failures raised by the storage layer or the host pipeline. The facet
//! engine wraps them without translation.

use thiserror::Error;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Host-layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Statement rejected or failed while running
    #[error("Statement failed: {0}")]
    Statement(String),

    /// Storage cannot be reached
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
