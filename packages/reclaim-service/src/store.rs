use std::collections::HashMap;

use uuid::Uuid;

use reclaim_domain::TrackedItem;

/// Lost items per participant, in original slot order.
///
/// A participant is either absent or holds at least one record; every mutation path prunes empty
/// entries before returning.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Store {
	entries: HashMap<Uuid, Vec<TrackedItem>>,
}
impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the participant's records wholesale.
	pub fn set_records(&mut self, participant: Uuid, records: Vec<TrackedItem>) {
		if records.is_empty() {
			self.entries.remove(&participant);
		} else {
			self.entries.insert(participant, records);
		}
	}

	pub fn get_records(&self, participant: Uuid) -> Option<&[TrackedItem]> {
		self.entries.get(&participant).map(Vec::as_slice)
	}

	/// Applies `f` to the participant's records and drops the entry if it ends up empty.
	///
	/// Returns `None` without calling `f` when the participant has no entry.
	pub fn mutate<F, R>(&mut self, participant: Uuid, f: F) -> Option<R>
	where
		F: FnOnce(&mut Vec<TrackedItem>) -> R,
	{
		let records = self.entries.get_mut(&participant)?;
		let out = f(records);

		if records.is_empty() {
			self.entries.remove(&participant);
		}

		Some(out)
	}

	pub fn remove(&mut self, participant: Uuid) -> Option<Vec<TrackedItem>> {
		self.entries.remove(&participant)
	}

	pub fn contains(&self, participant: Uuid) -> bool {
		self.entries.contains_key(&participant)
	}

	/// Participant ids in ascending order.
	pub fn participants(&self) -> Vec<Uuid> {
		let mut participants: Vec<_> = self.entries.keys().copied().collect();

		participants.sort();

		participants
	}

	pub fn iter(&self) -> impl Iterator<Item = (Uuid, &[TrackedItem])> {
		self.entries.iter().map(|(participant, records)| (*participant, records.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
