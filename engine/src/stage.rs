//! Requested reconciliation state.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What the caller wants the remote inventory to look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Partial, additive: only fields the caller supplied are written (default)
    #[default]
    Merged,
    /// Full replace: the record is forced to exactly the declared state
    #[serde(alias = "overridden", alias = "replaced")]
    Override,
    /// The record must not exist
    #[serde(alias = "deleted")]
    Absent,
    /// Read-only fetch of the matching record
    Gathered,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Merged => "merged",
            Stage::Override => "override",
            Stage::Absent => "absent",
            Stage::Gathered => "gathered",
        }
    }

    /// Whether an optional field (description, tags) belongs in the payload.
    ///
    /// `override` always carries them, `merged` only when the caller supplied
    /// them, and the non-writing stages never do.
    pub fn includes_optional(&self, supplied: bool) -> bool {
        match self {
            Stage::Override => true,
            Stage::Merged => supplied,
            Stage::Absent | Stage::Gathered => false,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merged" => Ok(Stage::Merged),
            "override" | "overridden" | "replaced" => Ok(Stage::Override),
            "absent" | "deleted" => Ok(Stage::Absent),
            "gathered" => Ok(Stage::Gathered),
            other => Err(Error::InvalidOperation(other.to_string())),
        }
    }
}
