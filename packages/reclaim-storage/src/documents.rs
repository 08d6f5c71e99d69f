//! YAML document formats.
//!
//! Tracking document, one per participant:
//!
//! ```yaml
//! items:
//! - item: { type: STONE, amount: 5 }
//!   dropId: 4f8c0a4e-0a53-4c9e-9a7e-0d1b2c3d4e5f
//!   slot: 3
//! timestamp: 1760774400000
//! ```
//!
//! The loss snapshot uses the same entry shape under `inventory`. Older snapshots store bare
//! attribute maps there instead, see [`crate::legacy`].

use std::path::Path;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	legacy::{self, InventoryFormat},
};
use reclaim_domain::{Attributes, ItemState, TrackedItem};

pub const ITEMS_KEY: &str = "items";
pub const INVENTORY_KEY: &str = "inventory";
pub const TIMESTAMP_KEY: &str = "timestamp";

const ENTRY_ITEM_KEY: &str = "item";
const ENTRY_DROP_ID_KEY: &str = "dropId";
const ENTRY_DESPAWNED_KEY: &str = "despawned";
const ENTRY_SLOT_KEY: &str = "slot";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemEntry {
	pub item: Attributes,
	#[serde(rename = "dropId")]
	pub drop_id: Option<Uuid>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub despawned: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub slot: Option<usize>,
}
impl From<&TrackedItem> for ItemEntry {
	fn from(record: &TrackedItem) -> Self {
		Self {
			item: record.attributes.clone(),
			drop_id: record.drop_id(),
			despawned: record.state == ItemState::Despawned,
			slot: record.slot,
		}
	}
}

#[derive(Debug, Serialize)]
struct TrackingDocument {
	items: Vec<ItemEntry>,
	timestamp: i64,
}

#[derive(Debug, Serialize)]
struct LossSnapshotDocument {
	inventory: Vec<ItemEntry>,
	timestamp: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LossSnapshot {
	pub format: InventoryFormat,
	pub records: Vec<TrackedItem>,
	pub timestamp: Option<i64>,
}

pub fn now_millis() -> i64 {
	(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn encode_tracking(path: &Path, records: &[TrackedItem], timestamp: i64) -> Result<String> {
	let document =
		TrackingDocument { items: records.iter().map(ItemEntry::from).collect(), timestamp };

	serde_yaml::to_string(&document)
		.map_err(|err| Error::Yaml { path: path.to_path_buf(), source: err })
}

pub fn decode_tracking(path: &Path, raw: &str) -> Result<Vec<TrackedItem>> {
	let root = parse_root(path, raw)?;

	match root.get(ITEMS_KEY) {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(Value::Sequence(entries)) => Ok(decode_entries(path, entries)),
		Some(_) => Err(Error::Malformed {
			path: path.to_path_buf(),
			message: "items must be a sequence.".to_string(),
		}),
	}
}

/// Snapshot entries are always written unmatched; the tracking document owns correlation state.
pub fn encode_loss_snapshot(path: &Path, lost: &[Attributes], timestamp: i64) -> Result<String> {
	let inventory = lost
		.iter()
		.map(|item| ItemEntry { item: item.clone(), drop_id: None, despawned: false, slot: None })
		.collect();

	serde_yaml::to_string(&LossSnapshotDocument { inventory, timestamp })
		.map_err(|err| Error::Yaml { path: path.to_path_buf(), source: err })
}

pub fn decode_loss_snapshot(path: &Path, raw: &str) -> Result<LossSnapshot> {
	let root = parse_root(path, raw)?;
	let timestamp = read_timestamp(&root);
	let entries = match root.get(INVENTORY_KEY) {
		None | Some(Value::Null) => {
			return Ok(LossSnapshot { format: InventoryFormat::Current, records: Vec::new(), timestamp });
		},
		Some(Value::Sequence(entries)) => entries,
		Some(_) => {
			return Err(Error::Malformed {
				path: path.to_path_buf(),
				message: "inventory must be a sequence.".to_string(),
			});
		},
	};
	let format = legacy::detect(entries);
	let records = match format {
		InventoryFormat::Current => decode_entries(path, entries),
		InventoryFormat::Legacy => legacy::decode_inventory(path, entries),
	};

	Ok(LossSnapshot { format, records, timestamp })
}

/// Reads `timestamp` as written by any version: an integer or a numeric string.
pub fn read_timestamp(root: &Mapping) -> Option<i64> {
	match root.get(TIMESTAMP_KEY)? {
		Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|n| n as i64)),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}

pub(crate) fn parse_root(path: &Path, raw: &str) -> Result<Mapping> {
	let value: Value = serde_yaml::from_str(raw)
		.map_err(|err| Error::Yaml { path: path.to_path_buf(), source: err })?;

	match value {
		Value::Mapping(root) => Ok(root),
		Value::Null => Ok(Mapping::new()),
		_ => Err(Error::Malformed {
			path: path.to_path_buf(),
			message: "document root must be a mapping.".to_string(),
		}),
	}
}

fn decode_entries(path: &Path, entries: &[Value]) -> Vec<TrackedItem> {
	entries
		.iter()
		.enumerate()
		.filter_map(|(index, entry)| match decode_entry(entry) {
			Ok(record) => Some(record),
			Err(message) => {
				tracing::warn!(path = ?path, index, %message, "Skipping unreadable item entry.");

				None
			},
		})
		.collect()
}

// A bad `dropId` only loses the correlation, never the item.
fn decode_entry(entry: &Value) -> std::result::Result<TrackedItem, String> {
	let map = entry.as_mapping().ok_or_else(|| "entry is not a mapping".to_string())?;
	let attributes = match map.get(ENTRY_ITEM_KEY) {
		Some(Value::Mapping(item)) => Attributes::from(item.clone()),
		Some(_) => return Err("item is not a mapping".to_string()),
		None => return Err("entry has no item".to_string()),
	};
	let drop_id = match map.get(ENTRY_DROP_ID_KEY) {
		Some(Value::String(text)) => Uuid::parse_str(text.trim()).ok(),
		_ => None,
	};
	let despawned = map.get(ENTRY_DESPAWNED_KEY).and_then(Value::as_bool).unwrap_or(false);
	let mut record = TrackedItem::from_parts(attributes, drop_id, despawned);

	record.slot = map
		.get(ENTRY_SLOT_KEY)
		.and_then(Value::as_u64)
		.and_then(|slot| usize::try_from(slot).ok());

	Ok(record)
}
