/// Scene members — the leaf payloads attached to scene nodes.
///
/// A member carries its own bounding box in the local space of the node it
/// is attached to. The node's world matrix places it in the world.

use bitflags::bitflags;
use glam::Mat4;
use slotmap::new_key_type;
use crate::bounds::AABB;

// ===== SLOT MAP KEYS =====

new_key_type! {
    /// Stable key of an attached scene node within its graph.
    pub struct NodeKey;

    /// Stable key of an attached scene member within its graph.
    pub struct MemberKey;
}

// ===== MEMBER =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Renderable,
    Camera,
    Light,
}

bitflags! {
    /// Per-member visibility and shadow flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u32 {
        const VISIBLE = 1 << 0;
        const CAST_SHADOW = 1 << 1;
        const RECEIVE_SHADOW = 1 << 2;
    }
}

impl Default for MemberFlags {
    fn default() -> Self {
        MemberFlags::VISIBLE
    }
}

/// A renderable, camera or light attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneMember {
    kind: MemberKind,
    name: String,
    /// Local-space bounds
    bounds: AABB,
    flags: MemberFlags,
}

impl SceneMember {
    /// Create a visible member.
    pub fn new(kind: MemberKind, name: impl Into<String>, bounds: AABB) -> Self {
        Self {
            kind,
            name: name.into(),
            bounds,
            flags: MemberFlags::default(),
        }
    }

    pub fn renderable(name: impl Into<String>, bounds: AABB) -> Self {
        Self::new(MemberKind::Renderable, name, bounds)
    }

    pub fn camera(name: impl Into<String>, bounds: AABB) -> Self {
        Self::new(MemberKind::Camera, name, bounds)
    }

    pub fn light(name: impl Into<String>, bounds: AABB) -> Self {
        Self::new(MemberKind::Light, name, bounds)
    }

    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags = flags;
        self
    }

    // ===== ACCESSORS =====

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-space bounds.
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(MemberFlags::VISIBLE)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_bounds(&mut self, bounds: AABB) {
        self.bounds = bounds;
    }

    pub fn set_flags(&mut self, flags: MemberFlags) {
        self.flags = flags;
    }

    /// Bounds placed in the world by the owning node's world matrix.
    pub fn world_bounds(&self, world_matrix: &Mat4) -> AABB {
        self.bounds.transformed(world_matrix)
    }
}
