//! Desired-state input supplied by the caller, one per batch item.

use crate::{FieldSet, ManagedField, RecordId};
use serde::{Deserialize, Serialize};

/// Raw desired state of one manufacturer.
///
/// Read-only once deserialized. Optional fields distinguish "not supplied"
/// from "supplied empty": `tags: Some(vec![])` asks for no tags, `tags: None`
/// leaves whatever the remote record has (in `merged`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManufacturerInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Pins the item to one remote record by identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Overrides default matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup: Option<Lookup>,
}

impl ManufacturerInput {
    /// Input with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Managed fields the caller supplied directly on the item.
    pub fn supplied_fields(&self) -> FieldSet {
        let mut fields = FieldSet::new();
        fields.insert(ManagedField::Name);
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

    /// Whether the caller supplied a given managed field.
    pub fn supplies(&self, field: ManagedField) -> bool {
        self.supplied_fields().contains(&field)
    }

    /// The explicit lookup, if it names at least one managed field.
    pub fn explicit_lookup(&self) -> Option<&Lookup> {
        self.lookup.as_ref().filter(|lookup| !lookup.is_empty())
    }
}

/// Caller-specified matching criteria.
///
/// Restricted to the managed fields; any other key in the source document is
/// ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lookup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Lookup {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn by_description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Managed fields named by this lookup.
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

    /// Whether the lookup names a field that can identify a single target.
    pub fn targets_identity(&self) -> bool {
        self.name.is_some() || self.slug.is_some()
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(format!("name={name}"));
        }
        if let Some(slug) = &self.slug {
            parts.push(format!("slug={slug}"));
        }
        if let Some(description) = &self.description {
            parts.push(format!("description={description}"));
        }
        if let Some(tags) = &self.tags {
            parts.push(format!("tags=[{}]", tags.join(",")));
        }
        write!(f, "{{{}}}", parts.join(", "))
    }
}
