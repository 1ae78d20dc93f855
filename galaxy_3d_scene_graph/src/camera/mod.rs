//! Camera module — camera and frustum.
//!
//! Cameras are owned and driven by the caller. A visibility query reads the
//! camera's frustum and never modifies it.

mod camera;
mod frustum;

pub use camera::Camera;
pub use frustum::{
    Frustum, FrustumTest,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
    CORNER_NEAR_BOTTOM_LEFT, CORNER_NEAR_BOTTOM_RIGHT, CORNER_NEAR_TOP_RIGHT, CORNER_NEAR_TOP_LEFT,
    CORNER_FAR_BOTTOM_LEFT, CORNER_FAR_BOTTOM_RIGHT, CORNER_FAR_TOP_RIGHT, CORNER_FAR_TOP_LEFT,
};
