//! Bounding volumes.
//!
//! Axis-aligned boxes shared by members, nodes, spatial regions and graphs.

mod aabb;

pub use aabb::AABB;
