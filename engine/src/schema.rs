//! The fixed set of fields the engine manages.
//!
//! Only these fields are ever read from or written to a remote manufacturer.
//! Everything else the remote system stores is left alone.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A field the engine is allowed to read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagedField {
    Name,
    Slug,
    Description,
    Tags,
}

impl ManagedField {
    /// Every managed field, in canonical order.
    pub const ALL: [ManagedField; 4] = [
        ManagedField::Name,
        ManagedField::Slug,
        ManagedField::Description,
        ManagedField::Tags,
    ];

    /// Field name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagedField::Name => "name",
            ManagedField::Slug => "slug",
            ManagedField::Description => "description",
            ManagedField::Tags => "tags",
        }
    }

    /// Whether the field is one of the optional attributes whose absence in
    /// `merged` must never be read as "clear this field".
    pub fn is_optional(&self) -> bool {
        matches!(self, ManagedField::Description | ManagedField::Tags)
    }
}

impl std::fmt::Display for ManagedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of managed fields.
pub type FieldSet = BTreeSet<ManagedField>;
