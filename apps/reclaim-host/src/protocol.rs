//! Newline-delimited JSON exchanged with the host world.
//!
//! Inbound lines are [`HostEvent`]s tagged by `event`; outbound lines are [`HostAction`]s tagged by
//! `action`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reclaim_domain::{Attributes, Location, Position};
use reclaim_service::{
	CommandSender, DocumentStore, DropEntity, Participant, Restoration, Tracker, WorldMirror,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
	ParticipantJoined { participant: Uuid, name: String, region: String, position: Position },
	ParticipantMoved { participant: Uuid, region: String, position: Position },
	ParticipantLeft { participant: Uuid },
	EntitySpawned {
		entity: Uuid,
		region: String,
		position: Position,
		item: Attributes,
		#[serde(default)]
		pickup_delay_ms: u64,
	},
	ParticipantLost {
		participant: Uuid,
		region: String,
		position: Position,
		#[serde(default)]
		inventory: Vec<Option<Attributes>>,
	},
	EntityExpired { entity: Uuid },
	EntityPickedUp { entity: Uuid },
	EntityMerged { source: Uuid, target: Uuid },
	Command {
		sender: String,
		#[serde(default)]
		admin: bool,
		#[serde(default)]
		args: Vec<String>,
	},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostAction {
	Reply { recipient: String, message: String },
	Restore { participant: Uuid, items: Vec<Attributes> },
}
impl From<Restoration> for HostAction {
	fn from(restoration: Restoration) -> Self {
		Self::Restore { participant: restoration.participant, items: restoration.items }
	}
}

/// Parses and applies one input line. Malformed lines are logged and skipped.
pub fn handle_line<D>(tracker: &mut Tracker<WorldMirror, D>, line: &str) -> Vec<HostAction>
where
	D: DocumentStore,
{
	let line = line.trim();

	if line.is_empty() {
		return Vec::new();
	}

	match serde_json::from_str::<HostEvent>(line) {
		Ok(event) => dispatch(tracker, event),
		Err(err) => {
			tracing::warn!(error = %err, "Skipping malformed host event.");

			Vec::new()
		},
	}
}

pub fn dispatch<D>(tracker: &mut Tracker<WorldMirror, D>, event: HostEvent) -> Vec<HostAction>
where
	D: DocumentStore,
{
	match event {
		HostEvent::ParticipantJoined { participant, name, region, position } => {
			tracker.env_mut().join(Participant {
				id: participant,
				name,
				location: Location::new(region, position),
			});
		},
		HostEvent::ParticipantMoved { participant, region, position } => {
			if !tracker.env_mut().move_to(participant, Location::new(region, position)) {
				tracing::debug!(%participant, "Ignoring move of an unknown participant.");
			}
		},
		HostEvent::ParticipantLeft { participant } => {
			tracker.env_mut().leave(participant);
		},
		HostEvent::EntitySpawned { entity, region, position, item, pickup_delay_ms } => {
			let pickup_ready_at = tracker.now().saturating_add(Duration::from_millis(pickup_delay_ms));

			tracker.env_mut().spawn(DropEntity {
				id: entity,
				location: Location::new(region, position),
				attributes: item,
				pickup_ready_at,
			});
		},
		HostEvent::ParticipantLost { participant, region, position, inventory } => {
			tracker.on_loss(participant, Location::new(region, position), inventory);
		},
		HostEvent::EntityExpired { entity } => {
			tracker.env_mut().remove(entity);
			tracker.on_entity_removed(entity);
		},
		HostEvent::EntityPickedUp { entity } => {
			tracker.env_mut().remove(entity);
			tracker.on_entity_picked_up(entity);
		},
		HostEvent::EntityMerged { source, target } => {
			tracker.env_mut().merge(source, target);
			tracker.on_entity_merged(source, target);
		},
		HostEvent::Command { sender, admin, args } => {
			let sender = CommandSender { name: sender, is_admin: admin };
			let message = tracker.handle_command(&sender, args.as_slice());
			let mut actions: Vec<HostAction> =
				tracker.env_mut().drain_restorations().into_iter().map(HostAction::from).collect();

			actions.push(HostAction::Reply { recipient: sender.name, message });

			return actions;
		},
	}

	Vec::new()
}
