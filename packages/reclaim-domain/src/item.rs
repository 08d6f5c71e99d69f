use uuid::Uuid;

use crate::Attributes;

/// Correlation status of one lost item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
	/// Lost, not yet matched to a drop entity.
	Pending,
	/// Matched to the live drop entity with this id.
	OnGround(Uuid),
	/// The matched drop entity expired. Only this state is offered for partial recovery.
	Despawned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedItem {
	pub attributes: Attributes,
	pub state: ItemState,
	/// Inventory slot the item was lost from, when known.
	pub slot: Option<usize>,
}
impl TrackedItem {
	pub fn pending(attributes: Attributes) -> Self {
		Self { attributes, state: ItemState::Pending, slot: None }
	}

	/// Rebuilds a record from its persisted fields. A despawned flag wins over a stale drop id.
	pub fn from_parts(attributes: Attributes, drop_id: Option<Uuid>, despawned: bool) -> Self {
		let state = match (drop_id, despawned) {
			(_, true) => ItemState::Despawned,
			(Some(id), false) => ItemState::OnGround(id),
			(None, false) => ItemState::Pending,
		};

		Self { attributes, state, slot: None }
	}

	pub fn in_slot(mut self, slot: usize) -> Self {
		self.slot = Some(slot);

		self
	}

	pub fn drop_id(&self) -> Option<Uuid> {
		match self.state {
			ItemState::OnGround(id) => Some(id),
			ItemState::Pending | ItemState::Despawned => None,
		}
	}

	pub fn is_pending(&self) -> bool {
		self.state == ItemState::Pending
	}

	pub fn is_despawned(&self) -> bool {
		self.state == ItemState::Despawned
	}

	pub fn is_on(&self, entity: Uuid) -> bool {
		self.state == ItemState::OnGround(entity)
	}
}
