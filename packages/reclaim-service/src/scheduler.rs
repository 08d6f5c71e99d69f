//! Delayed one-shot tasks on a monotonic elapsed-time axis.
//!
//! Tasks are plain data. The owner of the tracker pops due tasks and runs them on its own thread,
//! so a fired task never overlaps an event handler.

use std::{
	collections::{BTreeMap, HashMap},
	time::Duration,
};

use uuid::Uuid;

use reclaim_domain::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Task {
	/// Bind the participant's pending records to the drops spawned around `site`.
	Correlate { participant: Uuid, site: Location },
	/// Write the participant's tracking document.
	Persist { participant: Uuid },
}

pub trait Scheduler {
	fn after(&mut self, delay: Duration, task: Task) -> TaskHandle;

	/// Returns false when the task already fired or was cancelled.
	fn cancel(&mut self, handle: TaskHandle) -> bool;
}

#[derive(Debug, Default)]
pub struct TimerQueue {
	now: Duration,
	next_handle: u64,
	queue: BTreeMap<(Duration, TaskHandle), Task>,
	deadlines: HashMap<TaskHandle, Duration>,
}
impl TimerQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn now(&self) -> Duration {
		self.now
	}

	/// Moves the clock forward; it never runs backwards.
	pub fn advance_to(&mut self, now: Duration) {
		self.now = self.now.max(now);
	}

	pub fn next_deadline(&self) -> Option<Duration> {
		self.queue.keys().next().map(|(deadline, _)| *deadline)
	}

	/// Removes the earliest task due at or before `now` and moves the clock to its deadline.
	///
	/// Tasks sharing a deadline come out in scheduling order.
	pub fn pop_due(&mut self, now: Duration) -> Option<(TaskHandle, Task)> {
		let (&(deadline, handle), _) = self.queue.first_key_value()?;

		if deadline > now {
			return None;
		}

		let task = self.queue.remove(&(deadline, handle))?;

		self.deadlines.remove(&handle);
		self.advance_to(deadline);

		Some((handle, task))
	}

	pub fn is_pending(&self, handle: TaskHandle) -> bool {
		self.deadlines.contains_key(&handle)
	}

	pub fn cancel_all(&mut self) -> usize {
		let cancelled = self.queue.len();

		self.queue.clear();
		self.deadlines.clear();

		cancelled
	}

	pub fn len(&self) -> usize {
		self.queue.len()
	}

	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}
}
impl Scheduler for TimerQueue {
	fn after(&mut self, delay: Duration, task: Task) -> TaskHandle {
		let handle = TaskHandle(self.next_handle);
		let deadline = self.now.saturating_add(delay);

		self.next_handle += 1;
		self.queue.insert((deadline, handle), task);
		self.deadlines.insert(handle, deadline);

		handle
	}

	fn cancel(&mut self, handle: TaskHandle) -> bool {
		let Some(deadline) = self.deadlines.remove(&handle) else {
			return false;
		};

		self.queue.remove(&(deadline, handle)).is_some()
	}
}
