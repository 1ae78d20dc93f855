/// SceneNode — a detached node subtree.
///
/// A detached node is an owned value: its children are owned nodes and its
/// members are owned values. No graph can observe it, so every `&mut self`
/// operation runs without a lock and keeps the cached bounds current.
///
/// World matrices of a detached subtree are relative to its root: the root's
/// world matrix equals its local matrix. Attaching the subtree to a graph
/// (see `SpatialGraph::add` and `NodeHandle::add_child_node`) recomputes them
/// against the new parent.

use glam::Mat4;
use crate::bounds::AABB;
use crate::error::Result;
use crate::graph_err;
use crate::sync::{ReadLock, WriteLock};
use crate::transform::Transformation;
use super::member::SceneMember;
use super::node_parent::NodeParent;

const SOURCE: &str = "galaxy3d::SceneNode";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    name: String,
    transformation: Transformation,
    children: Vec<SceneNode>,
    members: Vec<SceneMember>,
    bounds: Option<AABB>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder form of [`add_node_member`](Self::add_node_member).
    pub fn with_member(mut self, member: SceneMember) -> Self {
        self.add_node_member(member);
        self
    }

    /// Builder form of [`add_child_node`](Self::add_child_node).
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.add_child_node(child);
        self
    }

    /// Builder form of [`request_transformations`](Self::request_transformations).
    pub fn with_transformation<F>(mut self, transformer: F) -> Self
    where
        F: FnOnce(&mut Transformation),
    {
        self.request_transformations(transformer);
        self
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn world_matrix(&self) -> &Mat4 {
        self.transformation.world_matrix()
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn members(&self) -> &[SceneMember] {
        &self.members
    }

    /// Aggregate bounds of this subtree, `AABB::ZERO` when it holds no member.
    pub fn bounds(&self) -> AABB {
        self.bounds.unwrap_or(AABB::ZERO)
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    /// Members in this node and all descendants.
    pub fn total_members(&self) -> usize {
        self.members.len() + self.children.iter().map(SceneNode::total_members).sum::<usize>()
    }

    // ===== MUTATION =====

    /// Append a child subtree. Returns its index.
    pub fn add_child_node(&mut self, mut child: SceneNode) -> usize {
        child.refresh(self.transformation.world_matrix());
        self.children.push(child);
        self.update_bounds();
        self.children.len() - 1
    }

    /// Detach the child at `index`.
    pub fn remove_child_node(&mut self, index: usize) -> Result<SceneNode> {
        if index >= self.children.len() {
            return Err(graph_err!(
                SOURCE,
                InvalidArgument,
                "Child index {} out of range ({} children)",
                index,
                self.children.len()
            ));
        }

        let mut child = self.children.remove(index);
        child.refresh(&Mat4::IDENTITY);
        self.update_bounds();
        Ok(child)
    }

    /// Append a member. Returns its index.
    pub fn add_node_member(&mut self, member: SceneMember) -> usize {
        self.members.push(member);
        self.update_bounds();
        self.members.len() - 1
    }

    /// Detach the member at `index`.
    pub fn remove_node_member(&mut self, index: usize) -> Result<SceneMember> {
        if index >= self.members.len() {
            return Err(graph_err!(
                SOURCE,
                InvalidArgument,
                "Member index {} out of range ({} members)",
                index,
                self.members.len()
            ));
        }

        let member = self.members.remove(index);
        self.update_bounds();
        Ok(member)
    }

    /// Mutate the local transformation, then refresh world matrices and bounds
    /// of the whole subtree.
    pub fn request_transformations<F>(&mut self, transformer: F)
    where
        F: FnOnce(&mut Transformation),
    {
        transformer(&mut self.transformation);
        self.refresh(&Mat4::IDENTITY);
    }

    /// Recompute world matrices and bounds of the whole subtree.
    pub fn recalculate_bounds(&mut self) {
        self.refresh(&Mat4::IDENTITY);
    }

    // ===== INTERNALS =====

    /// Reassemble a node. Bounds stay empty until the subtree root is
    /// refreshed with [`recalculate_bounds`](Self::recalculate_bounds).
    pub(super) fn from_parts(
        name: String,
        transformation: Transformation,
        children: Vec<SceneNode>,
        members: Vec<SceneMember>,
    ) -> Self {
        Self {
            name,
            transformation,
            children,
            members,
            bounds: None,
        }
    }

    pub(super) fn into_parts(self) -> (String, Transformation, Vec<SceneNode>, Vec<SceneMember>) {
        (self.name, self.transformation, self.children, self.members)
    }

    fn refresh(&mut self, parent_world: &Mat4) {
        self.transformation.calculate_local_matrix();
        self.transformation.calculate_world_matrix(parent_world);
        let world = *self.transformation.world_matrix();
        for child in &mut self.children {
            child.refresh(&world);
        }
        self.update_bounds();
    }

    fn update_bounds(&mut self) {
        self.bounds = aggregate_bounds(
            self.transformation.world_matrix(),
            &self.members,
            self.children.iter().map(|child| child.bounds),
        );
    }
}

/// Union of the members' world bounds and the children's aggregates.
pub(super) fn aggregate_bounds<'a, M, C>(world_matrix: &Mat4, members: M, children: C) -> Option<AABB>
where
    M: IntoIterator<Item = &'a SceneMember>,
    C: IntoIterator<Item = Option<AABB>>,
{
    let mut bounds = None;
    for member in members {
        AABB::merge_into(&mut bounds, &member.world_bounds(world_matrix));
    }
    for child in children.into_iter().flatten() {
        AABB::merge_into(&mut bounds, &child);
    }
    bounds
}

impl NodeParent for SceneNode {
    fn acquire_write_lock(&self) -> Result<Option<WriteLock>> {
        Ok(None)
    }

    fn acquire_read_lock(&self) -> Result<Option<ReadLock>> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "scene_node_tests.rs"]
mod tests;
