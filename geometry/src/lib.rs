mod point;
mod touchable;

pub use point::Point;
pub use touchable::Touchable;

pub mod layout;
pub mod element;

pub use layout::{DetectorLayout, ScintOption};
pub use element::{PixelId, ScintId, PixelPartition, ScintPartition, OutsidePartition};
