//! Manifest files declaring the desired manufacturers.
//!
//! A manifest is YAML, or JSON when the file name ends in `.json`. It holds
//! either a bare list of items or a document with a `manufacturers` list and
//! an optional `state`:
//!
//! ```yaml
//! state: merged
//! manufacturers:
//!   - name: Juniper
//!     tags: [networking]
//!   - name: HP
//!     lookup:
//!       slug: hp
//! ```

use dcim_sync_engine::{ManufacturerInput, Stage};
use serde::Deserialize;
use std::path::Path;

/// Parsed manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Stage to apply when none is given on the command line
    #[serde(default)]
    pub state: Option<Stage>,
    pub manufacturers: Vec<ManufacturerInput>,
}

/// File syntax, picked from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// Manifest errors.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Manifest item {index} has an empty name")]
    EmptyName { index: usize },
}

impl Manifest {
    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, Format::from_path(path))
    }

    /// Parse manifest text in the given format.
    pub fn parse(text: &str, format: Format) -> Result<Self, ManifestError> {
        let manifest = match format {
            Format::Json => match serde_json::from_str::<serde_json::Value>(text)? {
                serde_json::Value::Array(_) => Self::from_items(serde_json::from_str(text)?),
                _ => serde_json::from_str(text)?,
            },
            Format::Yaml => match serde_yaml::from_str::<serde_yaml::Value>(text)? {
                serde_yaml::Value::Sequence(_) => Self::from_items(serde_yaml::from_str(text)?),
                _ => serde_yaml::from_str(text)?,
            },
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn from_items(manufacturers: Vec<ManufacturerInput>) -> Self {
        Self {
            state: None,
            manufacturers,
        }
    }

    fn validate(&self) -> Result<(), ManifestError> {
        match self
            .manufacturers
            .iter()
            .position(|item| item.name.trim().is_empty())
        {
            Some(index) => Err(ManifestError::EmptyName { index }),
            None => Ok(()),
        }
    }
}
