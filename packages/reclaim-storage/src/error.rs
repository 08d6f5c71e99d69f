use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O failure at {path:?}.")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Invalid YAML at {path:?}.")]
	Yaml { path: PathBuf, source: serde_yaml::Error },
	#[error("Malformed document at {path:?}: {message}")]
	Malformed { path: PathBuf, message: String },
}
