use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub retention: Retention,
	pub correlation: Correlation,
	pub persistence: Persistence,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
	pub data_dir: PathBuf,
}
impl Storage {
	/// Directory holding loss snapshots and tracking documents.
	pub fn recoveries_dir(&self) -> PathBuf {
		self.data_dir.join("recoveries")
	}
}
impl Default for Storage {
	fn default() -> Self {
		Self { data_dir: PathBuf::from("data") }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retention {
	pub days: i64,
}
impl Default for Retention {
	fn default() -> Self {
		Self { days: 30 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Correlation {
	/// Wait before matching so the world has spawned every drop of the loss.
	pub delay_ms: u64,
	pub proximity: f64,
}
impl Correlation {
	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}
}
impl Default for Correlation {
	fn default() -> Self {
		Self { delay_ms: 100, proximity: 2.5 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Persistence {
	pub debounce_ms: u64,
}
impl Persistence {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}
impl Default for Persistence {
	fn default() -> Self {
		Self { debounce_ms: 2_000 }
	}
}
