//! Unified error handling for the command-line runner.

use crate::config::ConfigError;
use crate::manifest::ManifestError;
use std::path::PathBuf;

/// Exit code when every item succeeded.
pub const EXIT_OK: u8 = 0;
/// Exit code when at least one item failed.
pub const EXIT_ITEM_FAILED: u8 = 1;
/// Exit code for configuration, manifest and usage errors.
pub const EXIT_USAGE: u8 = 2;

/// Application error type.
///
/// These abort the run before (or instead of) reconciling anything. Item
/// failures are not errors here: they are reported in the batch result.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Snapshot error: {0}")]
    Engine(#[from] dcim_sync_engine::Error),

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        EXIT_USAGE
    }
}

/// Result type alias for the runner.
pub type Result<T> = std::result::Result<T, AppError>;
