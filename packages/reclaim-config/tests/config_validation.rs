use std::{path::Path, time::Duration};

use reclaim_config::{Config, Error};
use reclaim_testkit::TestDataDir;

fn parse(raw: &str) -> reclaim_config::Result<Config> {
	reclaim_config::parse(Path::new("test.toml"), raw)
}

#[test]
fn empty_file_uses_defaults() {
	let cfg = parse("").expect("Empty config should be valid.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.retention.days, 30);
	assert_eq!(cfg.correlation.delay(), Duration::from_millis(100));
	assert_eq!(cfg.correlation.proximity, 2.5);
	assert_eq!(cfg.persistence.debounce(), Duration::from_secs(2));
	assert_eq!(cfg.storage.recoveries_dir(), Path::new("data").join("recoveries"));
}

#[test]
fn default_template_matches_defaults() {
	let cfg = parse(reclaim_config::DEFAULT_CONFIG_TOML).expect("Template should be valid.");
	let defaults = Config::default();

	assert_eq!(cfg.retention.days, defaults.retention.days);
	assert_eq!(cfg.correlation.delay_ms, defaults.correlation.delay_ms);
	assert_eq!(cfg.persistence.debounce_ms, defaults.persistence.debounce_ms);
	assert_eq!(cfg.storage.data_dir, defaults.storage.data_dir);
}

#[test]
fn partial_sections_keep_other_defaults() {
	let cfg = parse("[retention]\ndays = 7\n").expect("Partial config should be valid.");

	assert_eq!(cfg.retention.days, 7);
	assert_eq!(cfg.persistence.debounce_ms, 2_000);
}

#[test]
fn blank_log_level_is_normalized() {
	let cfg = parse("[service]\nlog_level = \"  \"\n").expect("Config should be valid.");

	assert_eq!(cfg.service.log_level, "info");
}

#[test]
fn rejects_non_positive_retention() {
	let err = parse("[retention]\ndays = 0\n").expect_err("Expected validation error.");

	match err {
		Error::Validation { message } => {
			assert_eq!(message, "retention.days must be greater than zero.");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[test]
fn rejects_zero_debounce() {
	let err = parse("[persistence]\ndebounce_ms = 0\n").expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }));
}

#[test]
fn rejects_non_positive_proximity() {
	let err = parse("[correlation]\nproximity = -1.0\n").expect_err("Expected validation error.");

	match err {
		Error::Validation { message } => {
			assert_eq!(message, "correlation.proximity must be greater than zero.");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[test]
fn rejects_malformed_toml() {
	let err = parse("[retention\ndays = 3").expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }));
}

#[test]
fn load_reports_missing_file() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let err = reclaim_config::load(&dir.join("missing.toml")).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn load_or_init_writes_default_file() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let path = dir.join("nested").join("reclaim.toml");
	let cfg = reclaim_config::load_or_init(&path).expect("Failed to bootstrap config.");

	assert!(path.exists());
	assert_eq!(cfg.retention.days, 30);

	let written = std::fs::read_to_string(&path).expect("Failed to read written config.");

	assert_eq!(written, reclaim_config::DEFAULT_CONFIG_TOML);

	dir.cleanup().expect("Failed to clean up test directory.");
}

#[test]
fn load_or_init_keeps_existing_file() {
	let dir = TestDataDir::new().expect("Failed to create test directory.");
	let path = dir.write("reclaim.toml", "[retention]\ndays = 3\n").expect("Failed to write.");
	let cfg = reclaim_config::load_or_init(&path).expect("Failed to load config.");

	assert_eq!(cfg.retention.days, 3);

	dir.cleanup().expect("Failed to clean up test directory.");
}
