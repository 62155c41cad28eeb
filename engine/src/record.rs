//! Canonical views of the remote records the engine works with.

use crate::{Changes, RecordId, TagId, TagSet};
use serde::{Deserialize, Serialize};

/// Current state of a manufacturer as held by the remote inventory.
///
/// Only the managed fields are represented. Tags are the remote tag
/// identifiers, kept as a set so that ordering never shows up as a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingRecord {
    /// Remote identity
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    /// Empty when the remote record has no description
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: TagSet,
}

impl ExistingRecord {
    /// Create a record with an empty description and no tags.
    pub fn new(id: RecordId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: String::new(),
            tags: TagSet::new(),
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the tag identifiers.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Apply a set of field changes in place, as the remote system would.
    pub fn apply(&mut self, changes: &Changes) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(slug) = &changes.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }
    }
}

/// A remote tag, as returned by a tag lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

impl TagRef {
    pub fn new(id: TagId, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }
}
