//! Binds pending records to the drop entities spawned by a loss.
//!
//! Matching is greedy first-fit: records in slot order, candidates in enumeration order.

use std::{collections::HashSet, time::Duration};

use uuid::Uuid;

use crate::{DocumentStore, DropEntity, Environment, Scheduler, Task, Tracker};
use reclaim_domain::{ItemState, Location, TrackedItem};

/// Filters applied to every candidate drop.
#[derive(Debug, Clone, Copy)]
pub struct MatchWindow<'a> {
	pub site: &'a Location,
	pub proximity: f64,
	pub now: Duration,
}
impl MatchWindow<'_> {
	/// Near the loss site and still inside its pickup protection window.
	pub fn admits(&self, drop: &DropEntity) -> bool {
		drop.is_pickup_protected(self.now)
			&& drop.location.distance(self.site).is_some_and(|distance| distance < self.proximity)
	}
}

/// Assigns candidates to pending records and returns how many were bound.
///
/// `claimed` holds every drop id that must not be bound again; newly bound ids are added to it.
pub fn assign(
	records: &mut [TrackedItem],
	candidates: &[DropEntity],
	claimed: &mut HashSet<Uuid>,
	window: &MatchWindow<'_>,
) -> usize {
	let mut bound = 0;

	for record in records.iter_mut().filter(|record| record.is_pending()) {
		let found = candidates.iter().find(|drop| {
			!claimed.contains(&drop.id)
				&& window.admits(drop)
				&& record.attributes.matches(&drop.attributes)
		});

		if let Some(drop) = found {
			claimed.insert(drop.id);

			record.state = ItemState::OnGround(drop.id);
			bound += 1;
		}
	}

	bound
}

impl<E, D> Tracker<E, D>
where
	E: Environment,
	D: DocumentStore,
{
	pub fn schedule_correlation(&mut self, participant: Uuid, site: Location) {
		self.timers.after(self.cfg.correlation_delay, Task::Correlate { participant, site });
	}

	/// Runs one correlation pass for `participant` around `site`.
	pub fn correlate(&mut self, participant: Uuid, site: &Location) -> usize {
		let Some(records) = self.store.get_records(participant) else {
			tracing::debug!(%participant, "No records left to correlate.");

			return 0;
		};

		if !records.iter().any(TrackedItem::is_pending) {
			return 0;
		}

		let candidates = self.env.drops_in_region(&site.region);
		let mut claimed: HashSet<Uuid> = self.index.entities().collect();

		claimed.extend(records.iter().filter_map(TrackedItem::drop_id));

		let window = MatchWindow { site, proximity: self.cfg.proximity, now: self.timers.now() };
		let bound = self
			.store
			.mutate(participant, |records| {
				let bound = assign(records, &candidates, &mut claimed, &window);

				self.index.rebuild_participant(participant, records);

				bound
			})
			.unwrap_or_default();
		let pending = self
			.store
			.get_records(participant)
			.map(|records| records.iter().filter(|record| record.is_pending()).count())
			.unwrap_or_default();

		tracing::debug!(%participant, candidates = candidates.len(), bound, pending, "Correlated lost items.");

		self.schedule_persist(participant);

		bound
	}
}
