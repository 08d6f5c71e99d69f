mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Correlation, Persistence, Retention, Service, Storage};

use std::{fs, path::Path};

pub const DEFAULT_CONFIG_TOML: &str = "\
[service]
log_level = \"info\"

[storage]
data_dir = \"data\"

[retention]
days = 30

[correlation]
delay_ms = 100
proximity = 2.5

[persistence]
debounce_ms = 2000
";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

/// Writes [`DEFAULT_CONFIG_TOML`] when nothing exists at `path`, then loads it.
pub fn load_or_init(path: &Path) -> Result<Config> {
	if !path.exists() {
		if let Some(parent) = path.parent()
			&& !parent.as_os_str().is_empty()
		{
			fs::create_dir_all(parent)
				.map_err(|err| Error::WriteConfig { path: path.to_path_buf(), source: err })?;
		}

		fs::write(path, DEFAULT_CONFIG_TOML)
			.map_err(|err| Error::WriteConfig { path: path.to_path_buf(), source: err })?;
	}

	load(path)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.storage.data_dir.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "storage.data_dir must be non-empty.".to_string(),
		});
	}
	if cfg.retention.days <= 0 {
		return Err(Error::Validation {
			message: "retention.days must be greater than zero.".to_string(),
		});
	}
	if !cfg.correlation.proximity.is_finite() {
		return Err(Error::Validation {
			message: "correlation.proximity must be a finite number.".to_string(),
		});
	}
	if cfg.correlation.proximity <= 0.0 {
		return Err(Error::Validation {
			message: "correlation.proximity must be greater than zero.".to_string(),
		});
	}
	if cfg.persistence.debounce_ms == 0 {
		return Err(Error::Validation {
			message: "persistence.debounce_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
