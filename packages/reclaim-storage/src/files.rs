use std::{
	fs,
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::{
	Error, Result,
	documents::{self, LossSnapshot},
};
use reclaim_domain::{Attributes, TrackedItem};

pub const DOCUMENT_EXTENSION: &str = "yml";
pub const TRACKING_SUFFIX: &str = "-tracking.yml";

/// Document directory holding `<participant>.yml` loss snapshots and
/// `<participant>-tracking.yml` tracking documents.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}
impl FileStore {
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		let dir = dir.into();

		fs::create_dir_all(&dir).map_err(|err| Error::Io { path: dir.clone(), source: err })?;

		Ok(Self { dir })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn tracking_path(&self, participant: Uuid) -> PathBuf {
		self.dir.join(format!("{participant}{TRACKING_SUFFIX}"))
	}

	pub fn snapshot_path(&self, participant: Uuid) -> PathBuf {
		self.dir.join(format!("{participant}.{DOCUMENT_EXTENSION}"))
	}

	/// Writes the tracking document, or deletes it when nothing is tracked any more.
	pub fn write_tracking(&self, participant: Uuid, records: &[TrackedItem]) -> Result<()> {
		let path = self.tracking_path(participant);

		if records.is_empty() {
			return remove_if_exists(&path);
		}

		let raw = documents::encode_tracking(&path, records, documents::now_millis())?;

		write_atomic(&self.dir, &path, &raw)
	}

	pub fn read_tracking(&self, participant: Uuid) -> Result<Option<Vec<TrackedItem>>> {
		let path = self.tracking_path(participant);

		read_optional(&path)?.map(|raw| documents::decode_tracking(&path, &raw)).transpose()
	}

	/// Writes the loss snapshot stamped with `timestamp` (epoch milliseconds).
	pub fn write_loss_snapshot(
		&self,
		participant: Uuid,
		lost: &[Attributes],
		timestamp: i64,
	) -> Result<()> {
		let path = self.snapshot_path(participant);
		let raw = documents::encode_loss_snapshot(&path, lost, timestamp)?;

		write_atomic(&self.dir, &path, &raw)
	}

	pub fn read_loss_snapshot(&self, participant: Uuid) -> Result<Option<LossSnapshot>> {
		let path = self.snapshot_path(participant);

		read_optional(&path)?.map(|raw| documents::decode_loss_snapshot(&path, &raw)).transpose()
	}

	/// Participants with a tracking document, sorted for a stable load order.
	pub fn tracked_participants(&self) -> Result<Vec<Uuid>> {
		self.participants_where(|name| name.strip_suffix(TRACKING_SUFFIX))
	}

	/// Participants with a loss snapshot, sorted for a stable load order.
	pub fn snapshot_participants(&self) -> Result<Vec<Uuid>> {
		self.participants_where(|name| {
			if name.ends_with(TRACKING_SUFFIX) {
				return None;
			}

			name.strip_suffix(DOCUMENT_EXTENSION)?.strip_suffix('.')
		})
	}

	/// Every `.yml` document in the directory.
	pub fn documents(&self) -> Result<Vec<PathBuf>> {
		let entries =
			fs::read_dir(&self.dir).map_err(|err| Error::Io { path: self.dir.clone(), source: err })?;
		let mut paths = Vec::new();

		for entry in entries {
			let entry = entry.map_err(|err| Error::Io { path: self.dir.clone(), source: err })?;
			let path = entry.path();

			if path.is_file()
				&& path.extension().and_then(|ext| ext.to_str()) == Some(DOCUMENT_EXTENSION)
			{
				paths.push(path);
			}
		}

		paths.sort();

		Ok(paths)
	}

	fn participants_where<F>(&self, stem: F) -> Result<Vec<Uuid>>
	where
		F: Fn(&str) -> Option<&str>,
	{
		let mut participants = Vec::new();

		for path in self.documents()? {
			let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
				continue;
			};
			let Some(id) = stem(name) else {
				continue;
			};

			match Uuid::parse_str(id) {
				Ok(participant) => participants.push(participant),
				Err(_) => tracing::debug!(path = ?path, "Ignoring document with a non-participant name."),
			}
		}

		participants.sort();

		Ok(participants)
	}
}

pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
	match fs::read_to_string(path) {
		Ok(raw) => Ok(Some(raw)),
		Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
		Err(err) => Err(Error::Io { path: path.to_path_buf(), source: err }),
	}
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<()> {
	match fs::remove_file(path) {
		Ok(()) => Ok(()),
		Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
		Err(err) => Err(Error::Io { path: path.to_path_buf(), source: err }),
	}
}

// Staged in the same directory so `persist` is a rename on one filesystem.
fn write_atomic(dir: &Path, path: &Path, raw: &str) -> Result<()> {
	let io_error = |source: std::io::Error| Error::Io { path: path.to_path_buf(), source };
	let mut staging = NamedTempFile::new_in(dir).map_err(io_error)?;

	staging.write_all(raw.as_bytes()).map_err(io_error)?;
	staging.as_file().sync_all().map_err(io_error)?;
	staging.persist(path).map_err(|err| io_error(err.error))?;

	Ok(())
}
