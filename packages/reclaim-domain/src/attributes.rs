//! Schema-less attribute bag describing one lost item stack.
//!
//! Only `type` and `amount` (or the legacy `count`) are ever read. Every other key is opaque
//! payload carried through persistence in its original order, including non-string keys and
//! YAML tags.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use serde_yaml::{Mapping, Value};

pub const TYPE_KEY: &str = "type";
pub const AMOUNT_KEY: &str = "amount";
pub const LEGACY_COUNT_KEY: &str = "count";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Mapping);
impl Attributes {
	pub fn new() -> Self {
		Self(Mapping::new())
	}

	pub fn item_type(&self) -> Option<&str> {
		self.0.get(TYPE_KEY).map(untagged).and_then(Value::as_str)
	}

	/// Stack size, falling back to `count` and then to a single item.
	pub fn amount(&self) -> u32 {
		self.0
			.get(AMOUNT_KEY)
			.or_else(|| self.0.get(LEGACY_COUNT_KEY))
			.and_then(read_amount)
			.unwrap_or(1)
	}

	/// Writes `amount` under whichever key the bag already uses.
	pub fn set_amount(&mut self, amount: u32) {
		let key = if !self.0.contains_key(AMOUNT_KEY) && self.0.contains_key(LEGACY_COUNT_KEY) {
			LEGACY_COUNT_KEY
		} else {
			AMOUNT_KEY
		};

		self.0.insert(Value::from(key), Value::from(amount));
	}

	/// True when both bags describe the same item type and stack size.
	pub fn matches(&self, other: &Self) -> bool {
		self.item_type().is_some()
			&& self.item_type() == other.item_type()
			&& self.amount() == other.amount()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(Value::String(key.into()), value.into())
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn as_mapping(&self) -> &Mapping {
		&self.0
	}

	pub fn into_mapping(self) -> Mapping {
		self.0
	}
}
impl From<Mapping> for Attributes {
	fn from(mapping: Mapping) -> Self {
		Self(mapping)
	}
}
impl fmt::Display for Attributes {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} x{}", self.item_type().unwrap_or("?"), self.amount())
	}
}

fn untagged(value: &Value) -> &Value {
	match value {
		Value::Tagged(tagged) => untagged(&tagged.value),
		_ => value,
	}
}

fn read_amount(value: &Value) -> Option<u32> {
	match untagged(value) {
		Value::Number(number) => number
			.as_u64()
			.or_else(|| number.as_f64().filter(|n| n.fract() == 0.0 && *n >= 0.0).map(|n| n as u64))
			.and_then(|n| u32::try_from(n).ok()),
		Value::String(text) => text.trim().parse().ok(),
		_ => None,
	}
}
