pub mod correlator;
pub mod events;
pub mod mirror;
pub mod persistence;
pub mod recovery;
pub mod reverse_index;
pub mod scheduler;
pub mod store;

mod error;

pub use error::{Error, Result};
pub use mirror::{Restoration, WorldMirror};
pub use recovery::{
	CommandError, CommandOutcome, CommandSender, ListingLine, ListingStatus, RecoverCommand,
	RecoverMode,
};
pub use reverse_index::ReverseIndex;
pub use scheduler::{Scheduler, Task, TaskHandle, TimerQueue};
pub use store::Store;

use std::{collections::HashMap, time::Duration};

use uuid::Uuid;

use reclaim_config::Config;
use reclaim_domain::{Attributes, ItemState, Location, TrackedItem};
use reclaim_storage::{
	FileStore,
	documents::{self, LossSnapshot},
	legacy::InventoryFormat,
};

/// A participant currently present in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
	pub id: Uuid,
	pub name: String,
	pub location: Location,
}

/// A live drop entity as seen by the correlator.
#[derive(Debug, Clone, PartialEq)]
pub struct DropEntity {
	pub id: Uuid,
	pub location: Location,
	pub attributes: Attributes,
	/// Clock value at which the entity becomes eligible for pickup.
	pub pickup_ready_at: Duration,
}
impl DropEntity {
	/// Still inside the spawn protection window, so nobody can have touched it yet.
	pub fn is_pickup_protected(&self, now: Duration) -> bool {
		now < self.pickup_ready_at
	}
}

/// Queries and effects against the live world.
pub trait Environment {
	/// Online participant lookup, case-insensitive on the name.
	fn find_participant(&self, name: &str) -> Option<Participant>;

	/// Live drops in `region`, always in the same order for the same world state.
	fn drops_in_region(&self, region: &str) -> Vec<DropEntity>;

	fn is_live(&self, entity: Uuid) -> bool;

	fn give_items(&mut self, participant: Uuid, items: Vec<Attributes>);
}

/// Durable tracking and loss documents.
pub trait DocumentStore {
	fn write_tracking(&mut self, participant: Uuid, records: &[TrackedItem]) -> Result<()>;

	fn read_tracking(&self, participant: Uuid) -> Result<Option<Vec<TrackedItem>>>;

	fn write_loss_snapshot(
		&mut self,
		participant: Uuid,
		lost: &[Attributes],
		timestamp: i64,
	) -> Result<()>;

	fn read_loss_snapshot(&self, participant: Uuid) -> Result<Option<LossSnapshot>>;

	fn tracked_participants(&self) -> Result<Vec<Uuid>>;

	fn snapshot_participants(&self) -> Result<Vec<Uuid>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
	pub correlation_delay: Duration,
	pub proximity: f64,
	pub persist_debounce: Duration,
}
impl From<&Config> for TrackerConfig {
	fn from(cfg: &Config) -> Self {
		Self {
			correlation_delay: cfg.correlation.delay(),
			proximity: cfg.correlation.proximity,
			persist_debounce: cfg.persistence.debounce(),
		}
	}
}
impl Default for TrackerConfig {
	fn default() -> Self {
		Self::from(&Config::default())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
	pub participants: usize,
	pub records: usize,
	pub migrated: usize,
	pub failed: usize,
}

/// Owner of the tracked-item store, the reverse index and the task queue.
///
/// Every method runs to completion before the next one starts; the caller serializes world events,
/// commands and timer ticks onto one thread.
pub struct Tracker<E, D> {
	pub(crate) cfg: TrackerConfig,
	pub(crate) env: E,
	pub(crate) documents: D,
	pub(crate) store: Store,
	pub(crate) index: ReverseIndex,
	pub(crate) timers: TimerQueue,
	pub(crate) persist_tasks: HashMap<Uuid, TaskHandle>,
}
impl<E, D> Tracker<E, D>
where
	E: Environment,
	D: DocumentStore,
{
	pub fn new(cfg: TrackerConfig, env: E, documents: D) -> Self {
		Self {
			cfg,
			env,
			documents,
			store: Store::new(),
			index: ReverseIndex::new(),
			timers: TimerQueue::new(),
			persist_tasks: HashMap::new(),
		}
	}

	/// Loads every tracking document, then migrates legacy loss snapshots that predate tracking.
	///
	/// A migrated snapshot is rewritten in the current format with its original timestamp, so it
	/// seeds the store exactly once.
	pub fn load_persisted(&mut self) -> Result<LoadReport> {
		let mut report = LoadReport::default();

		for participant in self.documents.tracked_participants()? {
			match self.documents.read_tracking(participant) {
				Ok(Some(records)) => {
					report.records += records.len();
					report.participants += 1;

					self.load_records(participant, records);
				},
				Ok(None) => {},
				Err(err) => {
					tracing::error!(%participant, error = %err, "Failed to load tracking document.");

					report.failed += 1;
				},
			}
		}

		for participant in self.documents.snapshot_participants()? {
			if self.store.contains(participant) {
				continue;
			}

			let snapshot = match self.documents.read_loss_snapshot(participant) {
				Ok(Some(snapshot)) if snapshot.format == InventoryFormat::Legacy => snapshot,
				Ok(_) => continue,
				Err(err) => {
					tracing::error!(%participant, error = %err, "Failed to load loss snapshot.");

					report.failed += 1;

					continue;
				},
			};
			let lost: Vec<Attributes> =
				snapshot.records.iter().map(|record| record.attributes.clone()).collect();
			let timestamp = snapshot.timestamp.unwrap_or_else(documents::now_millis);

			if let Err(err) = self.documents.write_loss_snapshot(participant, &lost, timestamp) {
				tracing::error!(%participant, error = %err, "Failed to rewrite legacy loss snapshot.");

				report.failed += 1;

				continue;
			}

			report.migrated += 1;

			if snapshot.records.is_empty() {
				continue;
			}

			tracing::info!(%participant, records = snapshot.records.len(), "Migrated legacy loss snapshot.");

			report.records += snapshot.records.len();
			report.participants += 1;

			self.load_records(participant, snapshot.records);
			self.persist_now(participant);
		}

		Ok(report)
	}

	/// Installs persisted records without scheduling a write.
	///
	/// A drop id that is already claimed, by another participant or by an earlier record, is
	/// demoted to pending so that no entity is ever claimed twice.
	pub fn load_records(&mut self, participant: Uuid, mut records: Vec<TrackedItem>) {
		self.index.remove_participant(participant);

		for record in &mut records {
			let Some(entity) = record.drop_id() else {
				continue;
			};

			if self.index.contains(entity) {
				tracing::warn!(%participant, %entity, "Dropping duplicate drop claim on load.");

				record.state = ItemState::Pending;
			} else {
				self.index.insert(entity, participant);
			}
		}

		self.store.set_records(participant, records);
	}

	/// Runs every task due at or before `now`, in deadline order.
	pub fn advance_to(&mut self, now: Duration) {
		while let Some((handle, task)) = self.timers.pop_due(now) {
			self.run_task(handle, task);
		}

		self.timers.advance_to(now);
	}

	pub fn advance(&mut self, by: Duration) {
		let now = self.now().saturating_add(by);

		self.advance_to(now);
	}

	pub fn now(&self) -> Duration {
		self.timers.now()
	}

	pub fn next_deadline(&self) -> Option<Duration> {
		self.timers.next_deadline()
	}

	pub fn pending_tasks(&self) -> usize {
		self.timers.len()
	}

	pub fn store(&self) -> &Store {
		&self.store
	}

	pub fn index(&self) -> &ReverseIndex {
		&self.index
	}

	pub fn env(&self) -> &E {
		&self.env
	}

	pub fn env_mut(&mut self) -> &mut E {
		&mut self.env
	}

	pub fn documents(&self) -> &D {
		&self.documents
	}

	pub fn documents_mut(&mut self) -> &mut D {
		&mut self.documents
	}

	fn run_task(&mut self, handle: TaskHandle, task: Task) {
		match task {
			Task::Correlate { participant, site } => {
				self.correlate(participant, &site);
			},
			Task::Persist { participant } => self.run_debounced_persist(participant, handle),
		}
	}
}

impl DocumentStore for FileStore {
	fn write_tracking(&mut self, participant: Uuid, records: &[TrackedItem]) -> Result<()> {
		Ok(FileStore::write_tracking(self, participant, records)?)
	}

	fn read_tracking(&self, participant: Uuid) -> Result<Option<Vec<TrackedItem>>> {
		Ok(FileStore::read_tracking(self, participant)?)
	}

	fn write_loss_snapshot(
		&mut self,
		participant: Uuid,
		lost: &[Attributes],
		timestamp: i64,
	) -> Result<()> {
		Ok(FileStore::write_loss_snapshot(self, participant, lost, timestamp)?)
	}

	fn read_loss_snapshot(&self, participant: Uuid) -> Result<Option<LossSnapshot>> {
		Ok(FileStore::read_loss_snapshot(self, participant)?)
	}

	fn tracked_participants(&self) -> Result<Vec<Uuid>> {
		Ok(FileStore::tracked_participants(self)?)
	}

	fn snapshot_participants(&self) -> Result<Vec<Uuid>> {
		Ok(FileStore::snapshot_participants(self)?)
	}
}
