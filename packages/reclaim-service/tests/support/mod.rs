#![allow(dead_code)]

use std::{collections::HashMap, time::Duration};

use uuid::Uuid;

use reclaim_domain::{Attributes, Location, Position, TrackedItem};
use reclaim_service::{
	DocumentStore, DropEntity, Error, Participant, Result, Tracker, TrackerConfig, WorldMirror,
};
use reclaim_storage::{documents::LossSnapshot, legacy::InventoryFormat};

pub const REGION: &str = "overworld";
pub const PICKUP_DELAY: Duration = Duration::from_secs(2);

pub type TestTracker = Tracker<WorldMirror, MemoryDocuments>;

/// Document store kept in memory, recording every tracking write.
#[derive(Debug, Default)]
pub struct MemoryDocuments {
	pub tracking: HashMap<Uuid, Vec<TrackedItem>>,
	pub snapshots: HashMap<Uuid, LossSnapshot>,
	pub tracking_writes: Vec<(Uuid, Vec<TrackedItem>)>,
	pub fail_writes: bool,
}
impl MemoryDocuments {
	pub fn writes_for(&self, participant: Uuid) -> Vec<&[TrackedItem]> {
		self.tracking_writes
			.iter()
			.filter(|(owner, _)| *owner == participant)
			.map(|(_, records)| records.as_slice())
			.collect()
	}
}
impl DocumentStore for MemoryDocuments {
	fn write_tracking(&mut self, participant: Uuid, records: &[TrackedItem]) -> Result<()> {
		if self.fail_writes {
			return Err(Error::Storage { message: "Disk is full.".to_string() });
		}

		self.tracking_writes.push((participant, records.to_vec()));

		if records.is_empty() {
			self.tracking.remove(&participant);
		} else {
			self.tracking.insert(participant, records.to_vec());
		}

		Ok(())
	}

	fn read_tracking(&self, participant: Uuid) -> Result<Option<Vec<TrackedItem>>> {
		Ok(self.tracking.get(&participant).cloned())
	}

	fn write_loss_snapshot(
		&mut self,
		participant: Uuid,
		lost: &[Attributes],
		timestamp: i64,
	) -> Result<()> {
		if self.fail_writes {
			return Err(Error::Storage { message: "Disk is full.".to_string() });
		}

		self.snapshots.insert(participant, LossSnapshot {
			format: InventoryFormat::Current,
			records: lost.iter().cloned().map(TrackedItem::pending).collect(),
			timestamp: Some(timestamp),
		});

		Ok(())
	}

	fn read_loss_snapshot(&self, participant: Uuid) -> Result<Option<LossSnapshot>> {
		Ok(self.snapshots.get(&participant).cloned())
	}

	fn tracked_participants(&self) -> Result<Vec<Uuid>> {
		let mut participants: Vec<_> = self.tracking.keys().copied().collect();

		participants.sort();

		Ok(participants)
	}

	fn snapshot_participants(&self) -> Result<Vec<Uuid>> {
		let mut participants: Vec<_> = self.snapshots.keys().copied().collect();

		participants.sort();

		Ok(participants)
	}
}

pub fn site() -> Location {
	Location::new(REGION, Position::new(0.0, 64.0, 0.0))
}

pub fn near(dx: f64) -> Location {
	Location::new(REGION, Position::new(dx, 64.0, 0.0))
}

pub fn tracker() -> TestTracker {
	Tracker::new(TrackerConfig::default(), WorldMirror::new(), MemoryDocuments::default())
}

pub fn join(tracker: &mut TestTracker, name: &str) -> Uuid {
	let id = Uuid::new_v4();

	tracker.env_mut().join(Participant { id, name: name.to_string(), location: site() });

	id
}

/// Spawns a drop at `location` that is still pickup protected.
pub fn spawn_at(tracker: &mut TestTracker, location: Location, attributes: Attributes) -> Uuid {
	let id = Uuid::new_v4();
	let pickup_ready_at = tracker.now() + PICKUP_DELAY;

	tracker.env_mut().spawn(DropEntity { id, location, attributes, pickup_ready_at });

	id
}

pub fn spawn(tracker: &mut TestTracker, attributes: Attributes) -> Uuid {
	spawn_at(tracker, near(0.5), attributes)
}

pub fn lose(tracker: &mut TestTracker, participant: Uuid, items: Vec<Attributes>) {
	tracker.on_loss(participant, site(), items.into_iter().map(Some).collect());
}

pub fn records(tracker: &TestTracker, participant: Uuid) -> Vec<TrackedItem> {
	tracker.store().get_records(participant).map(<[TrackedItem]>::to_vec).unwrap_or_default()
}
