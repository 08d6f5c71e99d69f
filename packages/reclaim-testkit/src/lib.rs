mod error;

pub use error::{Error, Result};

use std::{
	fs,
	path::{Path, PathBuf},
};

use tempfile::TempDir;

use reclaim_domain::{
	Attributes,
	attributes::{Mapping, Value},
};

/// A scratch directory unique to one test, removed on [`TestDataDir::cleanup`] or drop.
pub struct TestDataDir {
	name: String,
	dir: TempDir,
}
impl TestDataDir {
	pub fn new() -> Result<Self> {
		let dir = tempfile::Builder::new()
			.prefix("reclaim_test_")
			.tempdir()
			.map_err(|err| Error::Message(format!("Failed to create test directory: {err}.")))?;
		let name = dir
			.path()
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();

		Ok(Self { name, dir })
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
		self.dir.path().join(relative)
	}

	pub fn write(&self, relative: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
		let target = self.join(relative);

		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent)?;
		}

		fs::write(&target, contents)?;

		Ok(target)
	}

	/// Removes the directory now and reports failures, unlike the silent removal on drop.
	pub fn cleanup(self) -> Result<()> {
		self.dir.close()?;

		Ok(())
	}
}

/// Attribute bag for `amount` of `kind`, shaped like a serialized item stack.
pub fn stack(kind: &str, amount: u32) -> Attributes {
	let mut attributes = Attributes::new();

	attributes.insert("type", kind);
	attributes.insert("amount", amount);

	attributes
}

/// Same as [`stack`] but using the legacy `count` key.
pub fn legacy_stack(kind: &str, count: u32) -> Attributes {
	let mut attributes = Attributes::new();

	attributes.insert("type", kind);
	attributes.insert("count", count);

	attributes
}

/// [`stack`] with extra opaque metadata that must survive persistence untouched.
pub fn named_stack(kind: &str, amount: u32, display_name: &str) -> Attributes {
	let mut enchants = Mapping::new();
	let mut meta = Mapping::new();
	let mut attributes = stack(kind, amount);

	enchants.insert(Value::from("SHARPNESS"), Value::from(5_u32));
	meta.insert(Value::from("display-name"), Value::from(display_name));
	meta.insert(Value::from("enchants"), Value::Mapping(enchants));
	attributes.insert("meta", Value::Mapping(meta));

	attributes
}
