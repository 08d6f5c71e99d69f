use uuid::Uuid;

use reclaim_domain::{ItemState, TrackedItem, attributes::Value};
use reclaim_storage::{FileStore, legacy::InventoryFormat};
use reclaim_testkit::{TestDataDir, legacy_stack, named_stack, stack};

fn open_store(dir: &TestDataDir) -> FileStore {
	FileStore::open(dir.join("recoveries")).expect("Failed to open file store.")
}

#[test]
fn tracking_round_trip_preserves_every_state() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();
	let records = vec![
		TrackedItem {
			attributes: stack("STONE", 5),
			state: ItemState::OnGround(Uuid::new_v4()),
			slot: None,
		},
		TrackedItem {
			attributes: named_stack("DIAMOND_SWORD", 1, "Edge"),
			state: ItemState::Despawned,
			slot: None,
		},
		TrackedItem::pending(legacy_stack("IRON_INGOT", 1)),
	];

	store.write_tracking(participant, &records).expect("Failed to write tracking document.");

	let loaded = store
		.read_tracking(participant)
		.expect("Failed to read tracking document.")
		.expect("Tracking document should exist.");

	assert_eq!(loaded, records);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn tracking_document_uses_documented_keys() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();
	let drop_id = Uuid::new_v4();

	store
		.write_tracking(participant, &[TrackedItem {
			attributes: stack("STONE", 5),
			state: ItemState::OnGround(drop_id),
			slot: None,
		}])
		.expect("Failed to write tracking document.");

	let raw = std::fs::read_to_string(store.tracking_path(participant)).expect("Failed to read.");
	let value: serde_yaml::Value = serde_yaml::from_str(&raw).expect("Failed to parse YAML.");

	assert_eq!(value["items"][0]["item"]["type"].as_str(), Some("STONE"));
	assert_eq!(value["items"][0]["dropId"].as_str(), Some(drop_id.to_string().as_str()));
	assert!(value["timestamp"].as_i64().is_some_and(|ts| ts > 0));

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn writing_empty_tracking_deletes_document() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	store
		.write_tracking(participant, &[TrackedItem::pending(stack("STONE", 1))])
		.expect("Failed to write tracking document.");
	store.write_tracking(participant, &[]).expect("Failed to delete tracking document.");

	assert!(!store.tracking_path(participant).exists());
	assert_eq!(store.read_tracking(participant).expect("Failed to read."), None);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn loss_snapshot_round_trip_yields_pending_records() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();
	let lost = vec![stack("STONE", 5), named_stack("BOW", 1, "Longshot")];

	store
		.write_loss_snapshot(participant, &lost, 1_700_000_000_000)
		.expect("Failed to write loss snapshot.");

	let loaded = store
		.read_loss_snapshot(participant)
		.expect("Failed to read loss snapshot.")
		.expect("Loss snapshot should exist.");
	let expected: Vec<_> = lost.into_iter().map(TrackedItem::pending).collect();

	assert_eq!(loaded.format, InventoryFormat::Current);
	assert_eq!(loaded.timestamp, Some(1_700_000_000_000));
	assert_eq!(loaded.records, expected);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn legacy_loss_snapshot_is_migrated() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	dir.write(
		format!("recoveries/{participant}.yml"),
		"\
inventory:
- type: STONE
  amount: 5
- null
- type: IRON_INGOT
  amount: 1
  meta:
    lore:
    - forged
- null
timestamp: 1700000000000
",
	)
	.expect("Failed to write legacy snapshot.");

	let snapshot = store
		.read_loss_snapshot(participant)
		.expect("Failed to read loss snapshot.")
		.expect("Loss snapshot should exist.");
	let loaded = &snapshot.records;

	assert_eq!(snapshot.format, InventoryFormat::Legacy);
	assert_eq!(snapshot.timestamp, Some(1_700_000_000_000));
	assert_eq!(loaded.len(), 2);
	assert!(loaded.iter().all(TrackedItem::is_pending));
	assert_eq!(loaded[0].attributes, stack("STONE", 5));
	assert_eq!(loaded[1].attributes.to_string(), "IRON_INGOT x1");
	assert!(loaded[1].attributes.get("meta").is_some());
	assert_eq!(loaded.iter().map(|record| record.slot).collect::<Vec<_>>(), [Some(0), Some(2)]);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn unreadable_entries_are_skipped() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	dir.write(
		format!("recoveries/{participant}-tracking.yml"),
		"\
items:
- item:
    type: STONE
    amount: 5
  dropId: not-a-uuid
- 17
- dropId: null
- item:
    type: DIRT
    amount: 2
  dropId: null
  despawned: true
timestamp: 1700000000000
",
	)
	.expect("Failed to write tracking document.");

	let loaded = store
		.read_tracking(participant)
		.expect("Failed to read tracking document.")
		.expect("Tracking document should exist.");

	assert_eq!(loaded, vec![
		TrackedItem::pending(stack("STONE", 5)),
		TrackedItem { attributes: stack("DIRT", 2), state: ItemState::Despawned, slot: None },
	]);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn lists_participants_by_document_kind() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let tracked = Uuid::new_v4();
	let snapshotted = Uuid::new_v4();

	store
		.write_tracking(tracked, &[TrackedItem::pending(stack("STONE", 1))])
		.expect("Failed to write tracking document.");
	store
		.write_loss_snapshot(snapshotted, &[stack("STONE", 1)], 1)
		.expect("Failed to write snapshot.");
	dir.write("recoveries/config.yml", "retentionDays: 30\n").expect("Failed to write stray file.");

	assert_eq!(store.tracked_participants().expect("Failed to list."), vec![tracked]);
	assert_eq!(store.snapshot_participants().expect("Failed to list."), vec![snapshotted]);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn integer_keyed_metadata_keeps_the_slot_readable() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	dir.write(
		format!("recoveries/{participant}.yml"),
		"\
inventory:
- type: STONE
  amount: 5
- type: IRON_SWORD
  amount: 1
  damage-map: {1: 3, 2: 4}
- type: DIRT
  amount: 2
timestamp: 1700000000000
",
	)
	.expect("Failed to write legacy snapshot.");

	let snapshot = store
		.read_loss_snapshot(participant)
		.expect("Failed to read loss snapshot.")
		.expect("Loss snapshot should exist.");

	assert_eq!(snapshot.records.len(), 3);

	let sword = snapshot.records[1].clone();
	let damage = sword.attributes.get("damage-map").and_then(Value::as_mapping).cloned();

	assert_eq!(damage.and_then(|map| map.get(Value::from(2_u32)).cloned()), Some(Value::from(4_u32)));

	store.write_tracking(participant, &[sword.clone()]).expect("Failed to write tracking document.");

	let loaded = store
		.read_tracking(participant)
		.expect("Failed to read tracking document.")
		.expect("Tracking document should exist.");

	assert_eq!(loaded, vec![sword]);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn tagged_metadata_round_trips_through_tracking() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	dir.write(
		format!("recoveries/{participant}-tracking.yml"),
		"\
items:
- item:
    type: DIAMOND_SWORD
    amount: 1
    meta: !CraftMetaItem
      display-name: Excalibur
  dropId: null
  despawned: true
timestamp: 1700000000000
",
	)
	.expect("Failed to write tracking document.");

	let loaded = store
		.read_tracking(participant)
		.expect("Failed to read tracking document.")
		.expect("Tracking document should exist.");

	assert!(matches!(loaded[0].attributes.get("meta"), Some(Value::Tagged(_))));

	store.write_tracking(participant, &loaded).expect("Failed to write tracking document.");

	let raw = std::fs::read_to_string(store.tracking_path(participant)).expect("Failed to read.");
	let reloaded = store
		.read_tracking(participant)
		.expect("Failed to read tracking document.")
		.expect("Tracking document should exist.");

	assert!(raw.contains("!CraftMetaItem"));
	assert_eq!(reloaded, loaded);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn writes_leave_no_staging_files() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let store = open_store(&dir);
	let participant = Uuid::new_v4();

	for amount in 1..=3 {
		store
			.write_tracking(participant, &[TrackedItem::pending(stack("STONE", amount))])
			.expect("Failed to write tracking document.");
	}

	store.write_loss_snapshot(participant, &[stack("STONE", 3)], 1).expect("Failed to write.");

	let mut names: Vec<_> = std::fs::read_dir(store.dir())
		.expect("Failed to list directory.")
		.map(|entry| entry.expect("Failed to read entry.").file_name())
		.collect();

	names.sort();

	assert_eq!(names, [
		std::ffi::OsString::from(format!("{participant}-tracking.yml")),
		std::ffi::OsString::from(format!("{participant}.yml")),
	]);

	dir.cleanup().expect("Failed to clean up test directory.");
}
