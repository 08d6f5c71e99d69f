use std::collections::HashMap;

use uuid::Uuid;

use crate::store::Store;
use reclaim_domain::TrackedItem;

/// Drop entity id to the participant whose on-ground record points at it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReverseIndex {
	owners: HashMap<Uuid, Uuid>,
}
impl ReverseIndex {
	pub fn new() -> Self {
		Self::default()
	}

	/// The index implied by every on-ground record in `store`.
	pub fn derive(store: &Store) -> Self {
		let mut index = Self::new();

		for (participant, records) in store.iter() {
			for entity in records.iter().filter_map(TrackedItem::drop_id) {
				index.insert(entity, participant);
			}
		}

		index
	}

	pub fn owner(&self, entity: Uuid) -> Option<Uuid> {
		self.owners.get(&entity).copied()
	}

	pub fn contains(&self, entity: Uuid) -> bool {
		self.owners.contains_key(&entity)
	}

	pub fn insert(&mut self, entity: Uuid, participant: Uuid) -> Option<Uuid> {
		self.owners.insert(entity, participant)
	}

	pub fn remove(&mut self, entity: Uuid) -> Option<Uuid> {
		self.owners.remove(&entity)
	}

	/// Drops every entry owned by `participant`, returning how many were removed.
	pub fn remove_participant(&mut self, participant: Uuid) -> usize {
		let before = self.owners.len();

		self.owners.retain(|_, owner| *owner != participant);

		before - self.owners.len()
	}

	/// Replaces the participant's entries with one per on-ground record.
	pub fn rebuild_participant(&mut self, participant: Uuid, records: &[TrackedItem]) {
		self.remove_participant(participant);

		for entity in records.iter().filter_map(TrackedItem::drop_id) {
			self.insert(entity, participant);
		}
	}

	pub fn entities(&self) -> impl Iterator<Item = Uuid> + '_ {
		self.owners.keys().copied()
	}

	pub fn len(&self) -> usize {
		self.owners.len()
	}

	pub fn is_empty(&self) -> bool {
		self.owners.is_empty()
	}
}
