/// Transformation — local TRS state of a scene node.
///
/// Holds position, orientation and scale, an optional look-at target, and the
/// cached local and world model matrices. Setters only store values; the
/// matrices are refreshed by `calculate_local_matrix` and
/// `calculate_world_matrix`, which the scene graph calls after a
/// transformation request completes.

use glam::{Mat4, Quat, Vec3};
use super::world_axes::WorldAxes;

#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    position: Vec3,
    orientation: Quat,
    scale: Vec3,
    up_axis: Vec3,
    look_at: Option<Vec3>,
    local_matrix: Mat4,
    world_matrix: Mat4,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformation {
    /// Identity transformation, Y up.
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            up_axis: Vec3::Y,
            look_at: None,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
        }
    }

    // ===== POSITION =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    /// Offset the position by `delta`.
    pub fn translate(&mut self, delta: Vec3) -> &mut Self {
        self.position += delta;
        self
    }

    /// Move along the world forward direction rotated by the current orientation.
    pub fn move_forward(&mut self, distance: f32, axes: &WorldAxes) -> &mut Self {
        self.position += self.orientation * axes.forward * distance;
        self
    }

    /// Move along the world right direction rotated by the current orientation.
    pub fn move_right(&mut self, distance: f32, axes: &WorldAxes) -> &mut Self {
        self.position += self.orientation * axes.right * distance;
        self
    }

    /// Move along the world up direction rotated by the current orientation.
    pub fn move_up(&mut self, distance: f32, axes: &WorldAxes) -> &mut Self {
        self.position += self.orientation * axes.up * distance;
        self
    }

    // ===== ORIENTATION =====

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quat) -> &mut Self {
        self.orientation = orientation.normalize();
        self
    }

    /// Apply an additional rotation on top of the current orientation.
    pub fn rotate(&mut self, rotation: Quat) -> &mut Self {
        self.orientation = (rotation * self.orientation).normalize();
        self
    }

    /// Replace the orientation with a rotation of `angle` radians around `axis`.
    ///
    /// A zero-length axis leaves the orientation unchanged.
    pub fn set_rotation(&mut self, axis: Vec3, angle: f32) -> &mut Self {
        if let Some(axis) = axis.try_normalize() {
            self.orientation = Quat::from_axis_angle(axis, angle);
        }
        self
    }

    // ===== SCALE =====

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_uniform_scale(&mut self, scale: f32) -> &mut Self {
        self.scale = Vec3::splat(scale);
        self
    }

    // ===== LOOK AT =====

    pub fn up_axis(&self) -> Vec3 {
        self.up_axis
    }

    pub fn set_up_axis(&mut self, up: Vec3) -> &mut Self {
        if let Some(up) = up.try_normalize() {
            self.up_axis = up;
        }
        self
    }

    /// Restore the up axis to the world's.
    pub fn reset_up_axis(&mut self, axes: &WorldAxes) -> &mut Self {
        self.up_axis = axes.up;
        self
    }

    pub fn look_at(&self) -> Option<Vec3> {
        self.look_at
    }

    /// Orient toward `target` every time the local matrix is computed.
    pub fn set_look_at(&mut self, target: Vec3) -> &mut Self {
        self.look_at = Some(target);
        self
    }

    pub fn clear_look_at(&mut self) -> &mut Self {
        self.look_at = None;
        self
    }

    // ===== MATRICES =====

    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Recompute the local model matrix from position, orientation and scale.
    ///
    /// With a look-at target, the orientation is first replaced by the one
    /// facing the target; a target at the current position is ignored.
    pub fn calculate_local_matrix(&mut self) {
        if let Some(target) = self.look_at {
            let direction = target - self.position;
            if let Some(forward) = direction.try_normalize() {
                // Mat4::look_to_rh builds a view matrix; its inverse orients the object
                let view = Mat4::look_to_rh(Vec3::ZERO, forward, self.up_axis);
                let orientation = Quat::from_mat4(&view.inverse());
                if orientation.is_finite() {
                    self.orientation = orientation.normalize();
                }
            }
        }
        self.local_matrix =
            Mat4::from_scale_rotation_translation(self.scale, self.orientation, self.position);
    }

    /// Recompute the world model matrix as `parent_world * local`.
    pub fn calculate_world_matrix(&mut self, parent_world: &Mat4) {
        self.world_matrix = *parent_world * self.local_matrix;
    }
}

#[cfg(test)]
#[path = "transformation_tests.rs"]
mod tests;
