//! Edge case tests for dcim-sync-engine
//!
//! These tests cover boundary conditions and unusual inputs.

use dcim_sync_engine::{
    slugify, BatchOptions, ExistingRecord, InventorySnapshot, Lookup, ManufacturerInput,
    MemoryInventory, Reconciler, RemoteError, Stage, TagRef,
};
use serde_json::json;

// ============================================================================
// Names and slugs
// ============================================================================

#[test]
fn unicode_names_slugify_to_ascii() {
    let cases = [
        ("Café Networks!", "cafe-networks"),
        ("Ærø Systems", "r-systems"),
        ("Škoda Electric", "skoda-electric"),
        ("日本電気", ""),
        ("  Hewlett   Packard  ", "hewlett-packard"),
        ("Dell_EMC", "dell_emc"),
    ];
    for (name, expected) in cases {
        assert_eq!(slugify(name), expected, "{name}");
    }
}

#[tokio::test]
async fn name_without_usable_slug_fails_on_create() {
    let inventory = MemoryInventory::new();
    let reconciler = Reconciler::new(&inventory, &inventory);

    for stage in [Stage::Merged, Stage::Override] {
        let outcome = reconciler
            .reconcile(&ManufacturerInput::new("日本電気"), stage, false)
            .await;

        assert!(outcome.failed);
        assert!(!outcome.changed);
        assert_eq!(outcome.error.as_deref(), Some("missing_slug"));
        assert_eq!(outcome.msg, "cannot derive a slug from name '日本電気'");
    }
    assert_eq!(inventory.writes().total(), 0);
}

#[tokio::test]
async fn unusable_slug_classified_the_same_in_check_mode() {
    let inventory = MemoryInventory::new();
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("日本電気");

    let simulated = reconciler.reconcile(&input, Stage::Merged, true).await;
    let real = reconciler.reconcile(&input, Stage::Merged, false).await;

    assert_eq!(simulated, real);
    assert!(simulated.failed);
    assert!(!simulated.changed);
}

#[tokio::test]
async fn explicit_slug_is_normalized_before_lookup() {
    let inventory =
        MemoryInventory::new().with_manufacturer(ExistingRecord::new(4, "Palo Alto", "palo-alto"));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("Palo Alto").with_slug("Palo Alto");

    let outcome = reconciler.reconcile(&input, Stage::Absent, false).await;

    assert!(outcome.changed);
    assert!(inventory.is_empty());
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn empty_tag_list_clears_tags_in_merged() {
    let inventory = MemoryInventory::new()
        .with_tag(TagRef::new(7, "networking", "networking"))
        .with_manufacturer(ExistingRecord::new(1, "Cisco", "cisco").with_tags([7]));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("Cisco")
        .with_tags(Vec::<String>::new())
        .with_lookup(Lookup::by_slug("cisco"));

    let outcome = reconciler.reconcile(&input, Stage::Merged, false).await;

    assert!(outcome.changed);
    assert!(inventory.get(1).unwrap().tags.is_empty());
}

#[tokio::test]
async fn duplicate_tag_names_collapse() {
    let inventory = MemoryInventory::new().with_tag(TagRef::new(7, "Networking", "networking"));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("Arista").with_tags(["networking", "Networking"]);

    let outcome = reconciler.reconcile(&input, Stage::Merged, false).await;

    assert_eq!(
        outcome.manufacturer.unwrap().tags,
        [7].into_iter().collect()
    );
}

#[tokio::test]
async fn unknown_tag_is_ignored_when_deleting() {
    let inventory =
        MemoryInventory::new().with_manufacturer(ExistingRecord::new(1, "Cisco", "cisco"));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("Cisco").with_tags(["does-not-exist"]);

    let outcome = reconciler.reconcile(&input, Stage::Absent, false).await;

    assert!(outcome.changed);
    assert!(!outcome.failed);
}

// ============================================================================
// Identifier pins
// ============================================================================

#[tokio::test]
async fn pinned_id_renames_record() {
    let inventory =
        MemoryInventory::new().with_manufacturer(ExistingRecord::new(9, "HP", "hp"));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("HPE").with_slug("hpe").with_id(9);

    let outcome = reconciler.reconcile(&input, Stage::Merged, false).await;

    assert_eq!(outcome.msg, "Manufacturer 'HPE' has been updated.");
    let record = inventory.get(9).unwrap();
    assert_eq!((record.name.as_str(), record.slug.as_str()), ("HPE", "hpe"));
}

#[tokio::test]
async fn pinned_id_that_misses_never_creates() {
    let inventory = MemoryInventory::new();
    let reconciler = Reconciler::new(&inventory, &inventory);

    for stage in [Stage::Merged, Stage::Override, Stage::Gathered] {
        let outcome = reconciler
            .reconcile(&ManufacturerInput::new("HPE").with_id(9), stage, false)
            .await;
        assert_eq!(outcome.error.as_deref(), Some("lookup_target_missing"), "{stage}");
    }
    assert_eq!(inventory.writes().total(), 0);
}

// ============================================================================
// Collaborator failures
// ============================================================================

#[tokio::test]
async fn read_failure_fails_every_item_without_writes() {
    let inventory = MemoryInventory::new();
    inventory.fail_reads(RemoteError::new("503 Service Unavailable").with_detail(json!("down")));
    let reconciler = Reconciler::new(&inventory, &inventory);
    let items = vec![
        ManufacturerInput::new("Cisco").with_lookup(Lookup::by_slug("cisco")),
        ManufacturerInput::new("Dell"),
    ];

    let batch = reconciler
        .run_batch(&items, Stage::Override, &BatchOptions::default())
        .await;

    assert!(batch.failed);
    assert!(!batch.changed);
    assert_eq!(batch.failures().count(), 2);
    assert_eq!(batch.results[0].details, Some(json!("down")));
    assert_eq!(inventory.writes().total(), 0);
}

#[tokio::test]
async fn fail_fast_with_concurrency_drains_in_flight_items() {
    let inventory = MemoryInventory::new();
    let reconciler = Reconciler::new(&inventory, &inventory);
    let items = vec![
        ManufacturerInput::new("A").with_tags(["missing"]),
        ManufacturerInput::new("B"),
        ManufacturerInput::new("C"),
        ManufacturerInput::new("D"),
    ];
    let options = BatchOptions {
        concurrency: 2,
        fail_fast: true,
        ..BatchOptions::default()
    };

    let batch = reconciler.run_batch(&items, Stage::Merged, &options).await;

    // A and B start together; B is drained, C and D never start
    assert_eq!(batch.results.len(), 2);
    assert!(batch.results[0].failed);
    assert!(batch.results[1].changed);
    assert_eq!(inventory.len(), 1);
}

#[tokio::test]
async fn empty_batch() {
    let inventory = MemoryInventory::new();
    let batch = Reconciler::new(&inventory, &inventory)
        .run_batch(&[], Stage::Merged, &BatchOptions::default())
        .await;

    assert!(batch.results.is_empty());
    assert!(!batch.changed);
    assert!(!batch.failed);
}

// ============================================================================
// Stages and snapshots
// ============================================================================

#[test]
fn stage_aliases() {
    assert_eq!("replaced".parse::<Stage>().unwrap(), Stage::Override);
    assert_eq!("deleted".parse::<Stage>().unwrap(), Stage::Absent);
    assert!("present".parse::<Stage>().is_err());
}

#[tokio::test]
async fn snapshot_seeds_offline_run() {
    let json = r#"{
        "formatVersion": 1,
        "manufacturers": [{"id": 1, "name": "Cisco", "slug": "cisco", "tags": [7]}],
        "tags": [{"id": 7, "name": "networking", "slug": "networking"}]
    }"#;
    let inventory = MemoryInventory::from_snapshot(InventorySnapshot::from_json(json).unwrap());
    let reconciler = Reconciler::new(&inventory, &inventory);
    let input = ManufacturerInput::new("Cisco")
        .with_tags(["networking"])
        .with_lookup(Lookup::by_slug("cisco"));

    let outcome = reconciler.reconcile(&input, Stage::Merged, false).await;

    assert!(!outcome.changed);
    assert_eq!(inventory.snapshot().manufacturers.len(), 1);
}
