pub mod attributes;
pub mod geometry;
pub mod item;

pub use attributes::Attributes;
pub use geometry::{Location, Position};
pub use item::{ItemState, TrackedItem};
