//! Facet error types
//!
//! Error codes:
//! - FACET_UNKNOWN_KIND
//! - FACET_HOST_FAILURE
//! - FACET_INVALID_ROW
//! - FACET_CONFIG_INVALID
//!
//! Every error aborts the `get_facets` call it occurs in. Nothing is
//! retried and no partial result is kept.

use thiserror::Error;

use crate::host::HostError;

/// Result type for facet operations
pub type FacetResult<T> = Result<T, FacetError>;

/// Facet errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FacetError {
    /// Declared kind is not taxonomy, meta or column
    #[error("Unknown facet kind '{kind}' for facet '{facet}'")]
    UnknownFacetKind { facet: String, kind: String },

    /// Storage or host pipeline failure, passed through unchanged
    #[error(transparent)]
    Host(#[from] HostError),

    /// A captured row lacks a value or a usable count
    #[error("Invalid row for facet '{facet}': {reason}")]
    InvalidRow { facet: String, reason: String },

    /// Facet configuration could not be read or parsed
    #[error("Invalid facet configuration: {0}")]
    Config(String),
}

impl FacetError {
    pub fn unknown_kind(facet: impl Into<String>, kind: impl Into<String>) -> Self {
        FacetError::UnknownFacetKind {
            facet: facet.into(),
            kind: kind.into(),
        }
    }

    pub fn invalid_row(facet: impl Into<String>, reason: impl Into<String>) -> Self {
        FacetError::InvalidRow {
            facet: facet.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FacetError::UnknownFacetKind { .. } => "FACET_UNKNOWN_KIND",
            FacetError::Host(_) => "FACET_HOST_FAILURE",
            FacetError::InvalidRow { .. } => "FACET_INVALID_ROW",
            FacetError::Config(_) => "FACET_CONFIG_INVALID",
        }
    }
}
