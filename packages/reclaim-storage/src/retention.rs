use std::path::{Path, PathBuf};

use crate::{FileStore, Result, documents, files};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1_000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
	pub scanned: usize,
	pub deleted: Vec<PathBuf>,
	pub unreadable: usize,
	/// Expired documents that could not be deleted.
	pub failed: usize,
}

pub fn cutoff_millis(now_millis: i64, retention_days: i64) -> i64 {
	now_millis.saturating_sub(retention_days.saturating_mul(MILLIS_PER_DAY))
}

/// Deletes documents whose `timestamp` is older than `cutoff_millis`.
///
/// Documents without a positive timestamp are kept, and so are documents that fail to parse.
/// A document that cannot be deleted is counted and left in place.
pub fn sweep(store: &FileStore, cutoff_millis: i64) -> Result<SweepReport> {
	sweep_with(store, cutoff_millis, files::remove_if_exists)
}

fn sweep_with<F>(store: &FileStore, cutoff_millis: i64, mut remove: F) -> Result<SweepReport>
where
	F: FnMut(&Path) -> Result<()>,
{
	let mut report = SweepReport::default();

	for path in store.documents()? {
		report.scanned += 1;

		let timestamp = match files::read_optional(&path)
			.and_then(|raw| raw.map(|raw| documents::parse_root(&path, &raw)).transpose())
		{
			Ok(Some(root)) => documents::read_timestamp(&root),
			Ok(None) => continue,
			Err(err) => {
				tracing::warn!(path = ?path, error = %err, "Skipping unreadable document during retention sweep.");

				report.unreadable += 1;

				continue;
			},
		};

		if let Some(timestamp) = timestamp
			&& timestamp > 0
			&& timestamp < cutoff_millis
		{
			if let Err(err) = remove(&path) {
				tracing::error!(path = ?path, error = %err, "Failed to delete expired recovery document.");

				report.failed += 1;

				continue;
			}

			tracing::info!(path = ?path, timestamp, "Deleted expired recovery document.");

			report.deleted.push(path);
		}
	}

	Ok(report)
}
