//! Collaborator contracts for the remote inventory.
//!
//! The engine never talks HTTP itself. Everything it needs from the remote
//! system goes through these two traits, which the transport layer (or an
//! in-memory double such as [`MemoryInventory`](crate::MemoryInventory))
//! implements. Every call is a suspension point; no retries or timeouts are
//! applied here.

use crate::{Changes, ExistingRecord, Payload, RecordId, TagRef};
use async_trait::async_trait;

/// Failure reported by a collaborator call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteError {
    /// Short description, e.g. the HTTP status line
    pub message: String,
    /// Raw error body as returned by the remote system
    pub detail: Option<serde_json::Value>,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Result type for collaborator calls.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Reads and writes of manufacturer records.
#[async_trait]
pub trait ManufacturerApi: Send + Sync {
    /// Fetch one record by its remote identity.
    async fn get_by_id(&self, id: RecordId) -> RemoteResult<Option<ExistingRecord>>;

    /// Fetch the record with this exact slug. Slugs are unique remotely.
    async fn get_by_slug(&self, slug: &str) -> RemoteResult<Option<ExistingRecord>>;

    /// Fetch every record with this exact name.
    async fn filter_by_name(&self, name: &str) -> RemoteResult<Vec<ExistingRecord>>;

    /// Create a record from a full payload.
    async fn create(&self, payload: &Payload) -> RemoteResult<ExistingRecord>;

    /// Write a set of field changes. Returns whether the remote system
    /// acknowledged the update.
    async fn update(&self, id: RecordId, changes: &Changes) -> RemoteResult<bool>;

    async fn delete(&self, id: RecordId) -> RemoteResult<()>;
}

/// Read-only tag lookups.
#[async_trait]
pub trait TagApi: Send + Sync {
    async fn find_tag_by_slug(&self, slug: &str) -> RemoteResult<Option<TagRef>>;

    async fn find_tag_by_name(&self, name: &str) -> RemoteResult<Option<TagRef>>;
}
