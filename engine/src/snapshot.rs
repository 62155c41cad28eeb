//! Inventory snapshots.
//!
//! A snapshot is a JSON document holding manufacturers and tags. It seeds a
//! [`MemoryInventory`](crate::MemoryInventory) for offline runs and captures
//! the resulting state afterwards.

use crate::{error::Result, Error, ExistingRecord, TagRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Point-in-time contents of an inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    /// Defaults to the current version when absent
    #[serde(default = "current_format_version")]
    pub format_version: u32,
    #[serde(default)]
    pub manufacturers: Vec<ExistingRecord>,
    #[serde(default)]
    pub tags: Vec<TagRef>,
}

fn current_format_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

impl Default for InventorySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl InventorySnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            manufacturers: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON and validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the format version and that identifiers are unique.
    pub fn validate(&self) -> Result<()> {
        if self.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        let mut seen = BTreeSet::new();
        if let Some(dup) = self.manufacturers.iter().find(|m| !seen.insert(m.id)) {
            return Err(Error::InvalidSnapshot(format!(
                "duplicate manufacturer id {}",
                dup.id
            )));
        }
        seen.clear();
        if let Some(dup) = self.tags.iter().find(|t| !seen.insert(t.id)) {
            return Err(Error::InvalidSnapshot(format!("duplicate tag id {}", dup.id)));
        }
        Ok(())
    }
}
