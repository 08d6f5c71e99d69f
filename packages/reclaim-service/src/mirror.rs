//! In-process view of the host world, fed by host events.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::{DropEntity, Environment, Participant};
use reclaim_domain::{Attributes, Location};

/// Items handed back to a participant, waiting to be delivered to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Restoration {
	pub participant: Uuid,
	pub items: Vec<Attributes>,
}

/// Online participants and live drops. Drops enumerate in spawn order.
#[derive(Debug, Default)]
pub struct WorldMirror {
	participants: BTreeMap<Uuid, Participant>,
	drops: BTreeMap<u64, DropEntity>,
	spawn_order: HashMap<Uuid, u64>,
	next_spawn: u64,
	restorations: Vec<Restoration>,
}
impl WorldMirror {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn join(&mut self, participant: Participant) {
		self.participants.insert(participant.id, participant);
	}

	pub fn move_to(&mut self, participant: Uuid, location: Location) -> bool {
		let Some(online) = self.participants.get_mut(&participant) else {
			return false;
		};

		online.location = location;

		true
	}

	pub fn leave(&mut self, participant: Uuid) -> Option<Participant> {
		self.participants.remove(&participant)
	}

	pub fn participant(&self, participant: Uuid) -> Option<&Participant> {
		self.participants.get(&participant)
	}

	/// Adds a drop; re-spawning a known id moves it to the end of the enumeration order.
	pub fn spawn(&mut self, drop: DropEntity) {
		self.remove(drop.id);

		let seq = self.next_spawn;

		self.next_spawn += 1;
		self.spawn_order.insert(drop.id, seq);
		self.drops.insert(seq, drop);
	}

	pub fn remove(&mut self, entity: Uuid) -> Option<DropEntity> {
		let seq = self.spawn_order.remove(&entity)?;

		self.drops.remove(&seq)
	}

	/// Folds `source` into `target`, adding its stack size. Returns false unless both are live.
	pub fn merge(&mut self, source: Uuid, target: Uuid) -> bool {
		if source == target || !self.is_live(target) {
			return false;
		}

		let Some(absorbed) = self.remove(source) else {
			return false;
		};

		if let Some(seq) = self.spawn_order.get(&target)
			&& let Some(drop) = self.drops.get_mut(seq)
		{
			let amount = drop.attributes.amount().saturating_add(absorbed.attributes.amount());

			drop.attributes.set_amount(amount);
		}

		true
	}

	pub fn drop_entity(&self, entity: Uuid) -> Option<&DropEntity> {
		self.drops.get(self.spawn_order.get(&entity)?)
	}

	pub fn drop_count(&self) -> usize {
		self.drops.len()
	}

	pub fn drain_restorations(&mut self) -> Vec<Restoration> {
		std::mem::take(&mut self.restorations)
	}
}
impl Environment for WorldMirror {
	fn find_participant(&self, name: &str) -> Option<Participant> {
		let name = name.trim();

		self.participants.values().find(|online| online.name.eq_ignore_ascii_case(name)).cloned()
	}

	fn drops_in_region(&self, region: &str) -> Vec<DropEntity> {
		self.drops.values().filter(|drop| drop.location.region == region).cloned().collect()
	}

	fn is_live(&self, entity: Uuid) -> bool {
		self.spawn_order.contains_key(&entity)
	}

	fn give_items(&mut self, participant: Uuid, items: Vec<Attributes>) {
		if items.is_empty() {
			return;
		}

		self.restorations.push(Restoration { participant, items });
	}
}
