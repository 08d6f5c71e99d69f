pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<reclaim_storage::Error> for Error {
	fn from(err: reclaim_storage::Error) -> Self {
		let message = match &err {
			reclaim_storage::Error::Io { source, .. } => format!("{err} {source}"),
			reclaim_storage::Error::Yaml { source, .. } => format!("{err} {source}"),
			reclaim_storage::Error::Malformed { .. } => err.to_string(),
		};

		Self::Storage { message }
	}
}
