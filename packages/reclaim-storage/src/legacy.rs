//! Loss snapshots written before entries carried a `dropId`.
//!
//! Legacy `inventory` is the raw slot list: one attribute map per occupied slot and `null` for
//! empty ones. Each map becomes a pending record that remembers its slot; nulls are dropped.

use std::path::Path;

use serde_yaml::Value;

use reclaim_domain::{Attributes, TrackedItem};

const ENTRY_ITEM_KEY: &str = "item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFormat {
	Current,
	Legacy,
}

/// Current entries wrap the attribute map under `item`; legacy slots are the map itself.
pub fn detect(entries: &[Value]) -> InventoryFormat {
	let wrapped = entries.iter().filter(|entry| !entry.is_null()).any(|entry| {
		entry.as_mapping().and_then(|map| map.get(ENTRY_ITEM_KEY)).is_some_and(Value::is_mapping)
	});

	if wrapped { InventoryFormat::Current } else { InventoryFormat::Legacy }
}

pub fn decode_inventory(path: &Path, entries: &[Value]) -> Vec<TrackedItem> {
	let mut records = Vec::new();

	for (slot, entry) in entries.iter().enumerate() {
		if entry.is_null() {
			continue;
		}

		match entry {
			Value::Mapping(map) => {
				records.push(TrackedItem::pending(Attributes::from(map.clone())).in_slot(slot))
			},
			_ => tracing::warn!(path = ?path, slot, "Skipping unreadable legacy slot."),
		}
	}

	records
}
