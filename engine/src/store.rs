//! In-memory inventory.
//!
//! [`MemoryInventory`] implements both collaborator traits over an in-process
//! map. It behaves like the remote system where the engine can observe it:
//! slugs are unique, `name` and `slug` are required on create, and tag
//! references must exist. It also counts every write, which makes "no
//! redundant writes" and check-mode parity directly testable.

use crate::{
    remote::RemoteResult, Changes, ExistingRecord, InventorySnapshot, ManufacturerApi, Payload,
    RecordId, RemoteError, TagApi, TagId, TagRef, TagSet,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Number of mutating calls received, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteCounts {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

impl WriteCounts {
    pub fn total(&self) -> usize {
        self.creates + self.updates + self.deletes
    }
}

#[derive(Debug, Default)]
struct State {
    manufacturers: BTreeMap<RecordId, ExistingRecord>,
    tags: BTreeMap<TagId, TagRef>,
    writes: WriteCounts,
    read_failure: Option<RemoteError>,
    write_failure: Option<RemoteError>,
}

impl State {
    fn next_id(&self) -> RecordId {
        self.manufacturers.keys().next_back().map_or(1, |id| id + 1)
    }

    fn check_read(&self) -> RemoteResult<()> {
        self.read_failure.clone().map_or(Ok(()), Err)
    }

    fn check_write(&self) -> RemoteResult<()> {
        self.write_failure.clone().map_or(Ok(()), Err)
    }

    fn check_slug(&self, slug: &str, except: Option<RecordId>) -> RemoteResult<()> {
        let taken = self
            .manufacturers
            .values()
            .any(|m| m.slug == slug && Some(m.id) != except);
        if taken {
            return Err(bad_request(
                json!({"slug": ["manufacturer with this slug already exists."]}),
            ));
        }
        Ok(())
    }

    fn check_tags(&self, tags: &TagSet) -> RemoteResult<()> {
        match tags.iter().find(|id| !self.tags.contains_key(id)) {
            Some(id) => Err(bad_request(json!({
                "tags": [format!("Related object not found using the provided numeric ID: {id}")]
            }))),
            None => Ok(()),
        }
    }
}

fn bad_request(detail: serde_json::Value) -> RemoteError {
    RemoteError::new("400 Bad Request").with_detail(detail)
}

fn not_found(id: RecordId) -> RemoteError {
    RemoteError::new("404 Not Found")
        .with_detail(json!({"detail": format!("No manufacturer with id {id}.")}))
}

/// Manufacturers and tags held in process memory.
#[derive(Debug, Default)]
pub struct MemoryInventory {
    state: Mutex<State>,
}

impl MemoryInventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed a manufacturer. Seeding bypasses remote validation, so
    /// duplicate names (or slugs) can be staged on purpose.
    pub fn with_manufacturer(self, record: ExistingRecord) -> Self {
        self.insert_manufacturer(record);
        self
    }

    /// Builder: seed a tag.
    pub fn with_tag(self, tag: TagRef) -> Self {
        self.insert_tag(tag);
        self
    }

    pub fn insert_manufacturer(&self, record: ExistingRecord) {
        self.lock().manufacturers.insert(record.id, record);
    }

    pub fn insert_tag(&self, tag: TagRef) {
        self.lock().tags.insert(tag.id, tag);
    }

    /// Get a manufacturer by ID without counting as a remote read.
    pub fn get(&self, id: RecordId) -> Option<ExistingRecord> {
        self.lock().manufacturers.get(&id).cloned()
    }

    /// All manufacturers, ordered by ID.
    pub fn manufacturers(&self) -> Vec<ExistingRecord> {
        self.lock().manufacturers.values().cloned().collect()
    }

    /// Count of stored manufacturers.
    pub fn len(&self) -> usize {
        self.lock().manufacturers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mutating calls received so far (including rejected ones).
    pub fn writes(&self) -> WriteCounts {
        self.lock().writes
    }

    /// Make every subsequent read fail with `error`.
    pub fn fail_reads(&self, error: RemoteError) {
        self.lock().read_failure = Some(error);
    }

    /// Make every subsequent write fail with `error`.
    pub fn fail_writes(&self, error: RemoteError) {
        self.lock().write_failure = Some(error);
    }

    /// Load an inventory from a snapshot.
    pub fn from_snapshot(snapshot: InventorySnapshot) -> Self {
        let inventory = Self::new();
        {
            let mut state = inventory.lock();
            for record in snapshot.manufacturers {
                state.manufacturers.insert(record.id, record);
            }
            for tag in snapshot.tags {
                state.tags.insert(tag.id, tag);
            }
        }
        inventory
    }

    /// Export the current contents as a snapshot.
    pub fn snapshot(&self) -> InventorySnapshot {
        let state = self.lock();
        let mut snapshot = InventorySnapshot::new();
        snapshot.manufacturers = state.manufacturers.values().cloned().collect();
        snapshot.tags = state.tags.values().cloned().collect();
        snapshot
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ManufacturerApi for MemoryInventory {
    async fn get_by_id(&self, id: RecordId) -> RemoteResult<Option<ExistingRecord>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.manufacturers.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> RemoteResult<Option<ExistingRecord>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.manufacturers.values().find(|m| m.slug == slug).cloned())
    }

    async fn filter_by_name(&self, name: &str) -> RemoteResult<Vec<ExistingRecord>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state
            .manufacturers
            .values()
            .filter(|m| m.name == name)
            .cloned()
            .collect())
    }

    async fn create(&self, payload: &Payload) -> RemoteResult<ExistingRecord> {
        let mut state = self.lock();
        state.writes.creates += 1;
        state.check_write()?;

        if payload.name.is_empty() {
            return Err(bad_request(json!({"name": ["This field may not be blank."]})));
        }
        let slug = match payload.slug.as_deref() {
            Some(slug) if !slug.is_empty() => slug,
            _ => return Err(bad_request(json!({"slug": ["This field is required."]}))),
        };
        state.check_slug(slug, None)?;
        let tags = payload.tags.clone().unwrap_or_default();
        state.check_tags(&tags)?;

        let record = ExistingRecord {
            id: state.next_id(),
            name: payload.name.clone(),
            slug: slug.to_string(),
            description: payload.description.clone().unwrap_or_default(),
            tags,
        };
        state.manufacturers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, changes: &Changes) -> RemoteResult<bool> {
        let mut state = self.lock();
        state.writes.updates += 1;
        state.check_write()?;

        if !state.manufacturers.contains_key(&id) {
            return Err(not_found(id));
        }
        if let Some(slug) = &changes.slug {
            state.check_slug(slug, Some(id))?;
        }
        if let Some(tags) = &changes.tags {
            state.check_tags(tags)?;
        }

        if let Some(record) = state.manufacturers.get_mut(&id) {
            record.apply(changes);
        }
        Ok(true)
    }

    async fn delete(&self, id: RecordId) -> RemoteResult<()> {
        let mut state = self.lock();
        state.writes.deletes += 1;
        state.check_write()?;

        state
            .manufacturers
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

#[async_trait]
impl TagApi for MemoryInventory {
    async fn find_tag_by_slug(&self, slug: &str) -> RemoteResult<Option<TagRef>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_tag_by_name(&self, name: &str) -> RemoteResult<Option<TagRef>> {
        let state = self.lock();
        state.check_read()?;
        Ok(state.tags.values().find(|t| t.name == name).cloned())
    }
}
