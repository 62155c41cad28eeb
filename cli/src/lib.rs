//! dcim-sync - declarative sync of NetBox DCIM manufacturers.
//!
//! Reads a manifest of desired manufacturers, reconciles it against NetBox
//! (or an offline inventory snapshot) with `dcim-sync-engine`, and prints the
//! batch result as JSON.

pub mod config;
pub mod error;
pub mod manifest;
pub mod netbox;
pub mod runner;

pub use config::{Config, ConfigError};
pub use error::{AppError, Result};
pub use manifest::{Manifest, ManifestError};
pub use netbox::NetBoxClient;
pub use runner::{run, Args};
