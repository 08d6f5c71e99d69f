//! Debounced durable writes, one outstanding task per participant.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{DocumentStore, Environment, Scheduler, Task, TaskHandle, Tracker};

impl<E, D> Tracker<E, D>
where
	E: Environment,
	D: DocumentStore,
{
	/// Replaces any outstanding persist for `participant` with a fresh one.
	pub fn schedule_persist(&mut self, participant: Uuid) {
		if let Some(previous) = self.persist_tasks.remove(&participant) {
			self.timers.cancel(previous);
		}

		let handle = self.timers.after(self.cfg.persist_debounce, Task::Persist { participant });

		self.persist_tasks.insert(participant, handle);
	}

	/// Writes the participant's current records right away, superseding a pending persist.
	pub fn persist_now(&mut self, participant: Uuid) {
		if let Some(previous) = self.persist_tasks.remove(&participant) {
			self.timers.cancel(previous);
		}

		self.write_tracking(participant);
	}

	pub fn has_pending_persist(&self, participant: Uuid) -> bool {
		self.persist_tasks.contains_key(&participant)
	}

	pub fn pending_persists(&self) -> usize {
		self.persist_tasks.len()
	}

	/// Flushes everything synchronously and cancels every outstanding task.
	///
	/// Participants whose entry was removed but not yet written are flushed too, which deletes
	/// their tracking document.
	pub fn shutdown(&mut self) -> usize {
		let participants: BTreeSet<Uuid> =
			self.store.participants().into_iter().chain(self.persist_tasks.keys().copied()).collect();

		self.persist_tasks.clear();

		let cancelled = self.timers.cancel_all();

		for participant in &participants {
			self.write_tracking(*participant);
		}

		tracing::info!(flushed = participants.len(), cancelled, "Flushed tracked items.");

		participants.len()
	}

	pub(crate) fn run_debounced_persist(&mut self, participant: Uuid, handle: TaskHandle) {
		if self.persist_tasks.get(&participant) == Some(&handle) {
			self.persist_tasks.remove(&participant);
		}

		self.write_tracking(participant);
	}

	fn write_tracking(&mut self, participant: Uuid) {
		let records = self.store.get_records(participant).unwrap_or_default();

		match self.documents.write_tracking(participant, records) {
			Ok(()) => tracing::debug!(%participant, records = records.len(), "Persisted tracked items."),
			Err(err) => {
				tracing::error!(%participant, error = %err, "Failed to persist tracked items.")
			},
		}
	}
}
