//! Transform module — node transformations and the world axis convention.

mod transformation;
mod world_axes;

pub use transformation::Transformation;
pub use world_axes::{Axis, WorldAxes};
