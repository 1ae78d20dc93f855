/// World axis convention.
///
/// Transform helpers that need to know which way is "up" or "forward" take
/// this value explicitly instead of reading a process-wide setting.

use glam::Vec3;

/// Principal axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index (0 = X, 1 = Y, 2 = Z).
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Right/up/forward directions of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldAxes {
    pub right: Vec3,
    pub up: Vec3,
    pub forward: Vec3,
}

impl Default for WorldAxes {
    /// Right-handed, Y up, looking down -Z.
    fn default() -> Self {
        Self {
            right: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::NEG_Z,
        }
    }
}

impl WorldAxes {
    /// Build from up and forward; right is derived and all three are normalized.
    ///
    /// Returns `None` if the two directions are parallel or degenerate.
    pub fn from_up_forward(up: Vec3, forward: Vec3) -> Option<Self> {
        let forward = forward.try_normalize()?;
        let right = forward.cross(up).try_normalize()?;
        let up = right.cross(forward);
        Some(Self { right, up, forward })
    }
}
