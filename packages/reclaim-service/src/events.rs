//! Keeps the store and the reverse index in step with the live world.

use uuid::Uuid;

use crate::{DocumentStore, Environment, Tracker};
use reclaim_domain::{Attributes, ItemState, Location, TrackedItem};
use reclaim_storage::documents;

impl<E, D> Tracker<E, D>
where
	E: Environment,
	D: DocumentStore,
{
	/// Starts tracking everything `participant` held at `site`.
	///
	/// Empty slots are skipped; every record remembers the slot it came from. The previous loss,
	/// if any, is replaced.
	pub fn on_loss(&mut self, participant: Uuid, site: Location, inventory: Vec<Option<Attributes>>) {
		let records: Vec<TrackedItem> = inventory
			.into_iter()
			.enumerate()
			.filter_map(|(slot, item)| Some(TrackedItem::pending(item?).in_slot(slot)))
			.collect();
		let lost: Vec<Attributes> = records.iter().map(|record| record.attributes.clone()).collect();

		if let Err(err) =
			self.documents.write_loss_snapshot(participant, &lost, documents::now_millis())
		{
			tracing::error!(%participant, error = %err, "Failed to write loss snapshot.");
		}

		let released = self.index.remove_participant(participant);
		let count = records.len();

		self.store.set_records(participant, records);

		tracing::info!(%participant, items = count, released, "Tracking lost items.");

		if count > 0 {
			self.schedule_correlation(participant, site);
		}

		self.schedule_persist(participant);
	}

	/// A drop expired. Its record, if tracked, becomes recoverable.
	pub fn on_entity_removed(&mut self, entity: Uuid) -> bool {
		let Some(participant) = self.index.remove(entity) else {
			return false;
		};
		let changed = self
			.store
			.mutate(participant, |records| {
				let record = records.iter_mut().find(|record| record.is_on(entity))?;

				record.state = ItemState::Despawned;

				Some(())
			})
			.flatten()
			.is_some();

		tracing::debug!(%participant, %entity, changed, "Tracked drop expired.");

		self.schedule_persist(participant);

		changed
	}

	/// A drop was picked up by anyone. Its record stops being tracked.
	pub fn on_entity_picked_up(&mut self, entity: Uuid) -> bool {
		let Some(participant) = self.index.remove(entity) else {
			return false;
		};
		let changed = self
			.store
			.mutate(participant, |records| {
				let before = records.len();

				records.retain(|record| !record.is_on(entity));

				before != records.len()
			})
			.unwrap_or_default();

		tracing::debug!(%participant, %entity, changed, "Tracked drop picked up.");

		self.schedule_persist(participant);

		changed
	}

	/// `source` merged into `target`; `source` no longer exists.
	pub fn on_entity_merged(&mut self, source: Uuid, target: Uuid) -> bool {
		if source == target {
			return false;
		}

		let Some(source_owner) = self.index.owner(source) else {
			return false;
		};

		match self.index.owner(target) {
			Some(target_owner) => self.merge_tracked(source, source_owner, target, target_owner),
			None => self.repoint(source, source_owner, target),
		}
	}

	fn merge_tracked(
		&mut self,
		source: Uuid,
		source_owner: Uuid,
		target: Uuid,
		target_owner: Uuid,
	) -> bool {
		let Some(absorbed) = self.take_record(source_owner, source) else {
			return false;
		};

		self.index.remove(source);

		self.store.mutate(target_owner, |records| {
			if let Some(record) = records.iter_mut().find(|record| record.is_on(target)) {
				let amount = record.attributes.amount().saturating_add(absorbed.attributes.amount());

				record.attributes.set_amount(amount);
			}
		});

		tracing::debug!(%source, %target, %source_owner, %target_owner, "Merged tracked drops.");

		self.schedule_persist(target_owner);

		if source_owner != target_owner {
			self.schedule_persist(source_owner);
		}

		true
	}

	fn repoint(&mut self, source: Uuid, owner: Uuid, target: Uuid) -> bool {
		let changed = self
			.store
			.mutate(owner, |records| {
				let record = records.iter_mut().find(|record| record.is_on(source))?;

				record.state = ItemState::OnGround(target);

				Some(())
			})
			.flatten()
			.is_some();

		if !changed {
			return false;
		}

		self.index.remove(source);
		self.index.insert(target, owner);

		tracing::debug!(participant = %owner, %source, %target, "Followed drop into merge target.");

		self.schedule_persist(owner);

		true
	}

	fn take_record(&mut self, participant: Uuid, entity: Uuid) -> Option<TrackedItem> {
		self.store
			.mutate(participant, |records| {
				let position = records.iter().position(|record| record.is_on(entity))?;

				Some(records.remove(position))
			})
			.flatten()
	}
}
