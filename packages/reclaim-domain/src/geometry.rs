use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}
impl Position {
	pub fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn distance(&self, other: &Self) -> f64 {
		let dx = self.x - other.x;
		let dy = self.y - other.y;
		let dz = self.z - other.z;

		(dx * dx + dy * dy + dz * dz).sqrt()
	}
}

/// A position inside a named region. Distances are only meaningful within one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
	pub region: String,
	pub position: Position,
}
impl Location {
	pub fn new(region: impl Into<String>, position: Position) -> Self {
		Self { region: region.into(), position }
	}

	pub fn distance(&self, other: &Self) -> Option<f64> {
		(self.region == other.region).then(|| self.position.distance(&other.position))
	}
}
