//! Error types for the reconciliation engine.

use crate::remote::RemoteError;
use thiserror::Error;

/// All possible errors from the engine.
///
/// Every variant is terminal for the item being reconciled: the engine never
/// retries or recovers locally, it turns the error into a failed
/// [`Outcome`](crate::Outcome).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    // Resolution errors
    #[error("tag '{0}' not found")]
    TagNotFound(String),

    #[error("multiple manufacturers ({count}) found with {field} '{value}'")]
    AmbiguousMatch {
        field: String,
        value: String,
        count: usize,
    },

    #[error("no existing manufacturer matches lookup: {0}")]
    LookupTargetMissing(String),

    #[error("cannot derive a slug from name '{0}'")]
    MissingSlug(String),

    // Collaborator errors
    #[error("remote request failed: {message}")]
    RemoteRequestFailed {
        message: String,
        detail: Option<serde_json::Value>,
    },

    // Caller errors
    #[error("invalid state: {0}")]
    InvalidOperation(String),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

impl Error {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::TagNotFound(_) => "tag_not_found",
            Error::AmbiguousMatch { .. } => "ambiguous_match",
            Error::LookupTargetMissing(_) => "lookup_target_missing",
            Error::MissingSlug(_) => "missing_slug",
            Error::RemoteRequestFailed { .. } => "remote_request_failed",
            Error::InvalidOperation(_) => "invalid_operation",
            Error::InvalidSnapshot(_) => "invalid_snapshot",
        }
    }

    /// Raw error detail reported by the remote collaborator, if any.
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            Error::RemoteRequestFailed { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::RemoteRequestFailed {
            message: err.message,
            detail: err.detail,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
