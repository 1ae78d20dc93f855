/// Handles on attached nodes and members.
///
/// A handle is a key plus a weak reference to the owning graph. It does not
/// keep the graph alive. Every operation takes the graph lock it needs; a
/// handle whose graph was dropped, or whose node or member was detached,
/// reports `Error::InvalidArgument`.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use glam::Mat4;
use crate::bounds::AABB;
use crate::error::Result;
use crate::graph_err;
use crate::sync::{ReadLock, WriteLock};
use crate::transform::Transformation;
use super::graph_state::{GraphShared, SOURCE};
use super::member::{MemberFlags, MemberKey, MemberKind, NodeKey, SceneMember};
use super::node_parent::NodeParent;
use super::scene_node::SceneNode;

// ===== NODE HANDLE =====

#[derive(Clone)]
pub struct NodeHandle {
    graph: Weak<GraphShared>,
    key: NodeKey,
}

impl NodeHandle {
    pub(crate) fn new(graph: &Arc<GraphShared>, key: NodeKey) -> Self {
        Self {
            graph: Arc::downgrade(graph),
            key,
        }
    }

    pub fn key(&self) -> NodeKey {
        self.key
    }

    pub(crate) fn shared(&self) -> Result<Arc<GraphShared>> {
        self.graph
            .upgrade()
            .ok_or_else(|| graph_err!(SOURCE, InvalidArgument, "Node {:?} belongs to a dropped graph", self.key))
    }

    pub(crate) fn belongs_to(&self, graph: &Arc<GraphShared>) -> bool {
        std::ptr::eq(self.graph.as_ptr(), Arc::as_ptr(graph))
    }

    /// Whether the node is still part of a live graph.
    pub fn is_attached(&self) -> Result<bool> {
        match self.graph.upgrade() {
            Some(shared) => shared.read(|state| Ok(state.nodes.contains_key(self.key))),
            None => Ok(false),
        }
    }

    // ===== STRUCTURE =====

    /// Attach a detached subtree as the last child of this node.
    pub fn add_child_node(&self, child: SceneNode) -> Result<NodeHandle> {
        let shared = self.shared()?;
        let key = shared.write(|state| state.add_child(self.key, child))?;
        Ok(NodeHandle::new(&shared, key))
    }

    /// Detach a direct child and return it as an owned subtree.
    pub fn remove_child_node(&self, child: &NodeHandle) -> Result<SceneNode> {
        let shared = self.shared()?;
        if !child.belongs_to(&shared) {
            return Err(graph_err!(SOURCE, InvalidArgument, "Node {:?} belongs to another graph", child.key));
        }
        shared.write(|state| state.remove_child(self.key, child.key))
    }

    pub fn add_node_member(&self, member: SceneMember) -> Result<MemberHandle> {
        let shared = self.shared()?;
        let key = shared.write(|state| state.add_member(self.key, member))?;
        Ok(MemberHandle::new(&shared, key))
    }

    pub fn remove_node_member(&self, member: &MemberHandle) -> Result<SceneMember> {
        let shared = self.shared()?;
        if !member.belongs_to(&shared) {
            return Err(graph_err!(SOURCE, InvalidArgument, "Member {:?} belongs to another graph", member.key));
        }
        shared.write(|state| state.remove_member(self.key, member.key))
    }

    /// Mutate the local transformation under the write lock, then update
    /// world matrices and bounds.
    ///
    /// The callback must not call back into the graph; doing so fails with
    /// `Error::ConsistencyViolation`.
    pub fn request_transformations<F>(&self, transformer: F) -> Result<()>
    where
        F: FnOnce(&mut Transformation),
    {
        self.shared()?.write(|state| state.transform(self.key, transformer))
    }

    // ===== QUERIES =====

    /// Aggregate world bounds of the subtree, `AABB::ZERO` when empty.
    pub fn bounds(&self) -> Result<AABB> {
        self.shared()?
            .read(|state| Ok(state.node(self.key)?.bounds.unwrap_or(AABB::ZERO)))
    }

    pub fn has_bounds(&self) -> Result<bool> {
        self.shared()?.read(|state| Ok(state.node(self.key)?.bounds.is_some()))
    }

    pub fn world_matrix(&self) -> Result<Mat4> {
        self.shared()?
            .read(|state| Ok(*state.node(self.key)?.transformation.world_matrix()))
    }

    pub fn transformation(&self) -> Result<Transformation> {
        self.shared()?
            .read(|state| Ok(state.node(self.key)?.transformation.clone()))
    }

    pub fn name(&self) -> Result<String> {
        self.shared()?.read(|state| Ok(state.node(self.key)?.name.clone()))
    }

    pub fn children(&self) -> Result<Vec<NodeHandle>> {
        let shared = self.shared()?;
        shared.read(|state| {
            Ok(state
                .node(self.key)?
                .children
                .iter()
                .map(|&key| NodeHandle::new(&shared, key))
                .collect())
        })
    }

    pub fn members(&self) -> Result<Vec<MemberHandle>> {
        let shared = self.shared()?;
        shared.read(|state| {
            Ok(state
                .node(self.key)?
                .members
                .iter()
                .map(|&key| MemberHandle::new(&shared, key))
                .collect())
        })
    }

    /// Parent node, `None` for a top-level node.
    pub fn parent(&self) -> Result<Option<NodeHandle>> {
        let shared = self.shared()?;
        shared.read(|state| {
            Ok(state
                .node(self.key)?
                .parent
                .map(|key| NodeHandle::new(&shared, key)))
        })
    }
}

impl NodeParent for NodeHandle {
    fn acquire_write_lock(&self) -> Result<Option<WriteLock>> {
        Ok(Some(self.shared()?.lock.acquire_write()?))
    }

    fn acquire_read_lock(&self) -> Result<Option<ReadLock>> {
        Ok(Some(self.shared()?.lock.acquire_read()?))
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Weak::ptr_eq(&self.graph, &other.graph)
    }
}

impl Eq for NodeHandle {}

impl Hash for NodeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.graph.as_ptr().hash(state);
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeHandle").field("key", &self.key).finish()
    }
}

// ===== MEMBER HANDLE =====

#[derive(Clone)]
pub struct MemberHandle {
    graph: Weak<GraphShared>,
    key: MemberKey,
}

impl MemberHandle {
    pub(crate) fn new(graph: &Arc<GraphShared>, key: MemberKey) -> Self {
        Self {
            graph: Arc::downgrade(graph),
            key,
        }
    }

    pub fn key(&self) -> MemberKey {
        self.key
    }

    fn shared(&self) -> Result<Arc<GraphShared>> {
        self.graph
            .upgrade()
            .ok_or_else(|| graph_err!(SOURCE, InvalidArgument, "Member {:?} belongs to a dropped graph", self.key))
    }

    pub(crate) fn belongs_to(&self, graph: &Arc<GraphShared>) -> bool {
        std::ptr::eq(self.graph.as_ptr(), Arc::as_ptr(graph))
    }

    pub fn is_attached(&self) -> Result<bool> {
        match self.graph.upgrade() {
            Some(shared) => shared.read(|state| Ok(state.members.contains_key(self.key))),
            None => Ok(false),
        }
    }

    /// Copy of the member.
    pub fn member(&self) -> Result<SceneMember> {
        self.shared()?.read(|state| Ok(state.member(self.key)?.member.clone()))
    }

    pub fn kind(&self) -> Result<MemberKind> {
        self.shared()?.read(|state| Ok(state.member(self.key)?.member.kind()))
    }

    pub fn name(&self) -> Result<String> {
        self.shared()?
            .read(|state| Ok(state.member(self.key)?.member.name().to_string()))
    }

    /// Owning node.
    pub fn parent(&self) -> Result<NodeHandle> {
        let shared = self.shared()?;
        shared.read(|state| Ok(NodeHandle::new(&shared, state.member(self.key)?.parent)))
    }

    /// Bounds placed in the world by the owning node.
    pub fn world_bounds(&self) -> Result<AABB> {
        self.shared()?.read(|state| {
            let slot = state.member(self.key)?;
            let node = state.node(slot.parent)?;
            Ok(slot.member.world_bounds(node.transformation.world_matrix()))
        })
    }

    /// Replace the local bounds and propagate the change.
    pub fn set_bounds(&self, bounds: AABB) -> Result<()> {
        self.update(|member| member.set_bounds(bounds))
    }

    pub fn set_flags(&self, flags: MemberFlags) -> Result<()> {
        self.update(|member| member.set_flags(flags))
    }

    /// Mutate the member under the write lock, then propagate its bounds.
    pub fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SceneMember),
    {
        self.shared()?.write(|state| state.update_member(self.key, mutate))
    }
}

impl PartialEq for MemberHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Weak::ptr_eq(&self.graph, &other.graph)
    }
}

impl Eq for MemberHandle {}

impl Hash for MemberHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.graph.as_ptr().hash(state);
    }
}

impl std::fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberHandle").field("key", &self.key).finish()
    }
}
