/// Camera — view and projection state used for visibility queries.
///
/// Unlike a purely passive container, the camera keeps its frustum in sync:
/// every change to the view or projection matrix recomputes the frustum, so
/// a query always sees planes matching the matrices it was handed.

use glam::{Mat4, Vec3};
use crate::transform::WorldAxes;
use super::frustum::Frustum;

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
}

impl Camera {
    /// Create a new camera from view and projection matrices.
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            frustum: Frustum::from_view_projection(&(projection * view)),
        }
    }

    /// Perspective camera at the origin looking along the world forward axis.
    ///
    /// # Arguments
    ///
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Width / height
    /// * `near` - Near plane distance (> 0)
    /// * `far` - Far plane distance (> near)
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32, axes: &WorldAxes) -> Self {
        let view = Mat4::look_to_rh(Vec3::ZERO, axes.forward, axes.up);
        Self::new(view, Mat4::perspective_rh(fov_y, aspect, near, far))
    }

    /// Orthographic camera at the origin looking along the world forward axis.
    pub fn orthographic(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
        axes: &WorldAxes,
    ) -> Self {
        let view = Mat4::look_to_rh(Vec3::ZERO, axes.forward, axes.up);
        Self::new(view, Mat4::orthographic_rh(left, right, bottom, top, near, far))
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum planes for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    // ===== SETTERS — each recomputes the frustum =====

    /// Set the view matrix.
    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
        self.update_frustum();
    }

    /// Set the projection matrix.
    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
        self.update_frustum();
    }

    /// Place the camera at `eye` looking at `target`, using the world up axis.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, axes: &WorldAxes) {
        self.set_view(Mat4::look_at_rh(eye, target, axes.up));
    }

    fn update_frustum(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection_matrix());
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
