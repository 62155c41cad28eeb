//! Field-level comparison of desired and current state.
//!
//! [`diff`] is pure: it never talks to the remote system, so the merge and
//! override rules can be exercised with plain values.

use crate::{ExistingRecord, FieldSet, ManagedField, Payload, Stage, TagSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// New values for the managed fields that must be written.
///
/// Absent fields are left untouched by the remote system, so this doubles as
/// the body of a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Changes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagSet>,
}

impl Changes {
    /// Fields carried by this change set.
    pub fn fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        if self.name.is_some() {
            fields.insert(ManagedField::Name);
        }
        if self.slug.is_some() {
            fields.insert(ManagedField::Slug);
        }
        if self.description.is_some() {
            fields.insert(ManagedField::Description);
        }
        if self.tags.is_some() {
            fields.insert(ManagedField::Tags);
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Drop one field from the change set.
    pub fn remove(&mut self, field: ManagedField) {
        match field {
            ManagedField::Name => self.name = None,
            ManagedField::Slug => self.slug = None,
            ManagedField::Description => self.description = None,
            ManagedField::Tags => self.tags = None,
        }
    }
}

/// What it takes to converge one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delta {
    /// No existing record: it must be created
    Create,
    /// Existing record; the changes may be empty
    Update(Changes),
}

impl Delta {
    pub fn is_create(&self) -> bool {
        matches!(self, Delta::Create)
    }

    /// True for an existing record with nothing to write.
    pub fn is_empty(&self) -> bool {
        matches!(self, Delta::Update(changes) if changes.is_empty())
    }

    pub fn changes(&self) -> Option<&Changes> {
        match self {
            Delta::Create => None,
            Delta::Update(changes) => Some(changes),
        }
    }
}

/// Compare a payload with the current record.
///
/// Only fields present in the payload are compared; tags compare as sets.
/// In `merged`, a differing description or tag set is dropped when the raw
/// input never supplied it, so an omitted optional field is never read as
/// "clear this field".
pub fn diff(existing: Option<&ExistingRecord>, payload: &Payload, stage: Stage) -> Delta {
    let Some(current) = existing else {
        return Delta::Create;
    };

    let mut changes = Changes::default();
    if payload.name != current.name {
        changes.name = Some(payload.name.clone());
    }
    if let Some(slug) = payload.slug.as_ref().filter(|slug| **slug != current.slug) {
        changes.slug = Some(slug.clone());
    }
    if let Some(description) = payload
        .description
        .as_ref()
        .filter(|description| **description != current.description)
    {
        changes.description = Some(description.clone());
    }
    if let Some(tags) = payload.tags.as_ref().filter(|tags| **tags != current.tags) {
        changes.tags = Some(tags.clone());
    }

    if stage == Stage::Merged {
        for field in ManagedField::ALL.into_iter().filter(ManagedField::is_optional) {
            if !payload.supplies(field) {
                changes.remove(field);
            }
        }
    }

    debug!(
        id = current.id,
        fields = ?changes.fields(),
        "computed delta"
    );
    Delta::Update(changes)
}
