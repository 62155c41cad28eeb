//! Wire models for the NetBox REST API.

use dcim_sync_engine::{ExistingRecord, RecordId, TagId, TagRef};
use serde::Deserialize;

/// Paginated list response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: usize,
    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
    pub results: Vec<T>,
}

/// Tag as nested inside another object.
#[derive(Debug, Deserialize)]
pub struct NestedTag {
    pub id: TagId,
}

/// `dcim.manufacturer` as returned by NetBox.
#[derive(Debug, Deserialize)]
pub struct ManufacturerRecord {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
}

impl From<ManufacturerRecord> for ExistingRecord {
    fn from(record: ManufacturerRecord) -> Self {
        ExistingRecord {
            id: record.id,
            name: record.name,
            slug: record.slug,
            description: record.description.unwrap_or_default(),
            tags: record.tags.into_iter().map(|tag| tag.id).collect(),
        }
    }
}

/// `extras.tag` as returned by NetBox.
#[derive(Debug, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

impl From<TagRecord> for TagRef {
    fn from(tag: TagRecord) -> Self {
        TagRef::new(tag.id, tag.name, tag.slug)
    }
}
