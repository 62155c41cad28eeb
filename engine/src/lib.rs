//! # dcim-sync engine
//!
//! Idempotent reconciliation of NetBox DCIM manufacturers.
//!
//! Given a declared list of manufacturers and a requested state, this crate
//! works out the smallest set of create, update and delete calls that brings
//! the remote inventory in line with the declaration, and reports one
//! structured [`Outcome`] per item.
//!
//! ## Design Principles
//!
//! - **No transport**: the engine only sees the remote inventory through the
//!   [`ManufacturerApi`] and [`TagApi`] traits
//! - **Pure rules**: payload building and diffing are plain functions over
//!   values, testable without any network double
//! - **No redundant writes**: an empty diff never reaches the remote system
//! - **Check mode parity**: a simulated run performs every read and reports
//!   the same classification as a real run, without a single write
//!
//! ## Pipeline
//!
//! For every input item:
//!
//! 1. [`PayloadBuilder`] turns the raw [`ManufacturerInput`] into a canonical
//!    [`Payload`], resolving tag names through [`TagResolver`]
//! 2. [`LookupResolver`] finds the [`ExistingRecord`] the item refers to, if any
//! 3. [`diff()`] computes the field-level [`Delta`] between the two
//! 4. [`Action::plan`] turns stage, lookup result and delta into an
//!    [`Action`], which the [`Reconciler`] performs (or only describes in
//!    check mode)
//!
//! ## Quick Start
//!
//! ```rust
//! use dcim_sync_engine::{
//!     BatchOptions, ManufacturerInput, MemoryInventory, Reconciler, Stage, TagRef,
//! };
//!
//! # futures::executor::block_on(async {
//! let inventory = MemoryInventory::new().with_tag(TagRef::new(7, "networking", "networking"));
//! let reconciler = Reconciler::new(&inventory, &inventory);
//!
//! let items = vec![ManufacturerInput::new("Juniper").with_tags(["networking"])];
//! let batch = reconciler
//!     .run_batch(&items, Stage::Merged, &BatchOptions::default())
//!     .await;
//!
//! assert!(batch.changed);
//! assert!(!batch.failed);
//! assert_eq!(inventory.writes().creates, 1);
//! # });
//! ```

pub mod diff;
pub mod error;
pub mod input;
pub mod lookup;
pub mod operation;
pub mod payload;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod schema;
pub mod slug;
pub mod snapshot;
pub mod stage;
pub mod store;
pub mod tags;

// Re-export main types at crate root
pub use diff::{diff, Changes, Delta};
pub use error::Error;
pub use input::{Lookup, ManufacturerInput};
pub use lookup::{Criteria, LookupResolver};
pub use operation::Action;
pub use payload::{Payload, PayloadBuilder};
pub use reconcile::{BatchOptions, BatchResult, Outcome, Reconciler};
pub use record::{ExistingRecord, TagRef};
pub use remote::{ManufacturerApi, RemoteError, TagApi};
pub use schema::{FieldSet, ManagedField};
pub use slug::slugify;
pub use snapshot::{InventorySnapshot, SNAPSHOT_FORMAT_VERSION};
pub use stage::Stage;
pub use store::{MemoryInventory, WriteCounts};
pub use tags::TagResolver;

/// Type aliases for clarity
pub type RecordId = u64;
pub type TagId = u64;
pub type TagSet = std::collections::BTreeSet<TagId>;
