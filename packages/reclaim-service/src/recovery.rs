//! The administrator `/recover` command.

use std::fmt;

use crate::{DocumentStore, Environment, Participant, Tracker};
use reclaim_domain::{Attributes, ItemState, TrackedItem};

pub const USAGE: &str = "Usage: /recover <participant> [list|force]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSender {
	pub name: String,
	pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverMode {
	/// Restore despawned items only.
	Partial,
	List,
	/// Restore everything and stop tracking.
	Force,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverCommand {
	pub target: String,
	pub mode: RecoverMode,
}
impl RecoverCommand {
	/// Parses `<participant> [list|force]`; the mode keyword is case-insensitive.
	pub fn parse<S>(args: &[S]) -> Result<Self, CommandError>
	where
		S: AsRef<str>,
	{
		let mode = match args {
			[_] => RecoverMode::Partial,
			[_, mode] if mode.as_ref().eq_ignore_ascii_case("list") => RecoverMode::List,
			[_, mode] if mode.as_ref().eq_ignore_ascii_case("force") => RecoverMode::Force,
			_ => return Err(CommandError::Usage),
		};
		let target = args[0].as_ref().trim();

		if target.is_empty() {
			return Err(CommandError::Usage);
		}

		Ok(Self { target: target.to_string(), mode })
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
	Despawned,
	OnGround,
	Unknown,
}
impl fmt::Display for ListingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Despawned => "Despawned",
			Self::OnGround => "On Ground",
			Self::Unknown => "Unknown",
		};

		write!(f, "[{label}]")
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingLine {
	pub status: ListingStatus,
	pub attributes: Attributes,
	pub slot: Option<usize>,
}
impl fmt::Display for ListingLine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.status, self.attributes)?;

		match self.slot {
			Some(slot) => write!(f, " (slot {slot})"),
			None => Ok(()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
	Listing { name: String, lines: Vec<ListingLine> },
	/// `discarded` counts unmatched records dropped from tracking.
	Recovered { name: String, restored: usize, discarded: usize },
	ForceRecovered { name: String, restored: usize },
}
impl fmt::Display for CommandOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Listing { name, lines } => {
				write!(f, "Lost items for {name}:")?;

				for line in lines {
					write!(f, "\n{line}")?;
				}

				Ok(())
			},
			Self::Recovered { name, restored, .. } => write!(
				f,
				"Restored {restored} item stack(s) for {name}. Only despawned items were recovered."
			),
			Self::ForceRecovered { name, restored } => write!(
				f,
				"Restored {restored} item stack(s) for {name}. All tracked items were recovered."
			),
		}
	}
}

/// User-facing command failures. None of these is a system error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
	#[error("You must be an administrator to use this command.")]
	PermissionDenied,
	#[error("Usage: /recover <participant> [list|force]")]
	Usage,
	#[error("Participant {name} not found or not online.")]
	ParticipantNotFound { name: String },
	#[error("No recovery data found for {name}.")]
	NoRecoveryData { name: String },
	#[error("Nothing to recover for {name}: no despawned items.")]
	NothingToRecover { name: String },
}

impl<E, D> Tracker<E, D>
where
	E: Environment,
	D: DocumentStore,
{
	/// Runs the command and renders the reply. The command always counts as handled.
	pub fn handle_command<S>(&mut self, sender: &CommandSender, args: &[S]) -> String
	where
		S: AsRef<str>,
	{
		match self.execute(sender, args) {
			Ok(outcome) => outcome.to_string(),
			Err(err) => {
				tracing::debug!(sender = %sender.name, error = %err, "Recover command rejected.");

				err.to_string()
			},
		}
	}

	pub fn execute<S>(
		&mut self,
		sender: &CommandSender,
		args: &[S],
	) -> Result<CommandOutcome, CommandError>
	where
		S: AsRef<str>,
	{
		if !sender.is_admin {
			return Err(CommandError::PermissionDenied);
		}

		let command = RecoverCommand::parse(args)?;
		let participant = self
			.env
			.find_participant(&command.target)
			.ok_or(CommandError::ParticipantNotFound { name: command.target })?;

		match command.mode {
			RecoverMode::List => {
				let lines = self.list(&participant)?;

				Ok(CommandOutcome::Listing { name: participant.name, lines })
			},
			RecoverMode::Partial => {
				let (restored, discarded) = self.recover(&participant)?;

				Ok(CommandOutcome::Recovered { name: participant.name, restored, discarded })
			},
			RecoverMode::Force => {
				let restored = self.force_recover(&participant)?;

				Ok(CommandOutcome::ForceRecovered { name: participant.name, restored })
			},
		}
	}

	/// Every record with a status checked against the live world. Changes nothing.
	pub fn list(&self, participant: &Participant) -> Result<Vec<ListingLine>, CommandError> {
		let records = self.records_for(participant)?;

		Ok(records
			.iter()
			.map(|record| ListingLine {
				status: self.listing_status(record),
				attributes: record.attributes.clone(),
				slot: record.slot,
			})
			.collect())
	}

	/// Restores despawned records and keeps only those still on the ground.
	///
	/// Pending records are dropped as well. Returns the restored and discarded counts.
	pub fn recover(&mut self, participant: &Participant) -> Result<(usize, usize), CommandError> {
		let records = self.records_for(participant)?;
		let items: Vec<Attributes> = records
			.iter()
			.filter(|record| record.is_despawned())
			.map(|record| record.attributes.clone())
			.collect();

		if items.is_empty() {
			return Err(CommandError::NothingToRecover { name: participant.name.clone() });
		}

		let restored = items.len();
		let discarded_pending = records.iter().filter(|record| record.is_pending()).count();

		self.env.give_items(participant.id, items);
		self.store.mutate(participant.id, |records| {
			records.retain(|record| matches!(record.state, ItemState::OnGround(_)))
		});
		self.persist_now(participant.id);

		tracing::info!(
			participant = %participant.id,
			restored,
			discarded_pending,
			"Recovered despawned items and dropped unmatched records."
		);

		Ok((restored, discarded_pending))
	}

	/// Restores every record regardless of state and stops tracking the participant.
	pub fn force_recover(&mut self, participant: &Participant) -> Result<usize, CommandError> {
		let Some(records) = self.store.remove(participant.id) else {
			return Err(CommandError::NoRecoveryData { name: participant.name.clone() });
		};
		let restored = records.len();

		self.index.remove_participant(participant.id);
		self.env.give_items(
			participant.id,
			records.into_iter().map(|record| record.attributes).collect(),
		);
		self.persist_now(participant.id);

		tracing::info!(participant = %participant.id, restored, "Force-recovered all tracked items.");

		Ok(restored)
	}

	fn records_for(&self, participant: &Participant) -> Result<&[TrackedItem], CommandError> {
		self.store
			.get_records(participant.id)
			.ok_or_else(|| CommandError::NoRecoveryData { name: participant.name.clone() })
	}

	fn listing_status(&self, record: &TrackedItem) -> ListingStatus {
		match record.state {
			ItemState::Despawned => ListingStatus::Despawned,
			ItemState::OnGround(entity) if self.env.is_live(entity) => ListingStatus::OnGround,
			ItemState::OnGround(_) | ItemState::Pending => ListingStatus::Unknown,
		}
	}
}
