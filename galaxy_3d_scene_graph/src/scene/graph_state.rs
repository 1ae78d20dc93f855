/// Attached node storage of a spatial graph.
///
/// Attached nodes and members live in slot maps owned by the graph; nodes
/// refer to each other by key. Every function here assumes the caller holds
/// the graph's write lock (mutations) or read lock (queries).
///
/// Bounds are kept current incrementally. After a change at a node, its
/// bounds are recomputed from its members and its children's cached bounds;
/// the walk continues upward while the bounds keep changing, and ends at the
/// top-level node by refreshing its index entry.

use std::sync::{Arc, RwLock};
use glam::Mat4;
use slotmap::SlotMap;
use crate::bounds::AABB;
use crate::error::Result;
use crate::graph_err;
use crate::sync::GraphLock;
use crate::transform::Transformation;
use super::graph_config::GraphConfig;
use super::member::{MemberKey, NodeKey, SceneMember};
use super::scene_index::{GraphIndex, SceneIndex};
use super::scene_node::{aggregate_bounds, SceneNode};

pub(crate) const SOURCE: &str = "galaxy3d::SpatialGraph";

pub(crate) struct NodeSlot {
    pub name: String,
    pub parent: Option<NodeKey>,
    pub children: Vec<NodeKey>,
    pub members: Vec<MemberKey>,
    pub transformation: Transformation,
    pub bounds: Option<AABB>,
}

pub(crate) struct MemberSlot {
    pub member: SceneMember,
    pub parent: NodeKey,
}

pub(crate) struct GraphState {
    pub nodes: SlotMap<NodeKey, NodeSlot>,
    pub members: SlotMap<MemberKey, MemberSlot>,
    /// Top-level nodes in insertion order
    pub top_level: Vec<NodeKey>,
    pub index: GraphIndex,
}

impl GraphState {
    pub fn new(index: GraphIndex) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            members: SlotMap::with_key(),
            top_level: Vec::new(),
            index,
        }
    }

    // ===== LOOKUP =====

    pub fn node(&self, key: NodeKey) -> Result<&NodeSlot> {
        self.nodes
            .get(key)
            .ok_or_else(|| graph_err!(SOURCE, InvalidArgument, "Node {:?} is not attached to this graph", key))
    }

    pub fn member(&self, key: MemberKey) -> Result<&MemberSlot> {
        self.members
            .get(key)
            .ok_or_else(|| graph_err!(SOURCE, InvalidArgument, "Member {:?} is not attached to this graph", key))
    }

    pub fn is_top_level(&self, key: NodeKey) -> bool {
        self.nodes.get(key).is_some_and(|node| node.parent.is_none())
    }

    fn top_level_node(&self, key: NodeKey) -> Result<&NodeSlot> {
        let node = self.node(key)?;
        if node.parent.is_some() {
            return Err(graph_err!(SOURCE, InvalidArgument, "Node {:?} is not a top-level node", key));
        }
        Ok(node)
    }

    fn world_of(&self, key: Option<NodeKey>) -> Mat4 {
        key.and_then(|key| self.nodes.get(key))
            .map_or(Mat4::IDENTITY, |node| *node.transformation.world_matrix())
    }

    // ===== CONTAINER =====

    pub fn add_top_level(&mut self, node: SceneNode) -> NodeKey {
        let key = self.attach_subtree(node, None, &Mat4::IDENTITY);
        self.top_level.push(key);
        if let Some(bounds) = self.nodes[key].bounds {
            self.index.insert(key, &bounds);
        }
        key
    }

    pub fn remove_top_level(&mut self, key: NodeKey) -> Result<SceneNode> {
        self.top_level_node(key)?;
        self.top_level.retain(|&k| k != key);
        self.index.remove(key);
        self.detach_subtree(key)
    }

    /// Detach every top-level node, in insertion order.
    pub fn clear(&mut self) -> Vec<SceneNode> {
        let keys = std::mem::take(&mut self.top_level);
        let nodes = keys
            .into_iter()
            .filter_map(|key| self.take_subtree(key))
            .map(Self::finish_detach)
            .collect();
        self.index.clear();
        nodes
    }

    // ===== NODE MUTATION =====

    pub fn add_child(&mut self, parent: NodeKey, child: SceneNode) -> Result<NodeKey> {
        let world = *self.node(parent)?.transformation.world_matrix();
        let key = self.attach_subtree(child, Some(parent), &world);
        self.nodes[parent].children.push(key);
        self.update_bounds_from(parent);
        Ok(key)
    }

    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<SceneNode> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(graph_err!(
                SOURCE,
                InvalidArgument,
                "Node {:?} is not a child of node {:?}",
                child,
                parent
            ));
        }

        self.nodes[parent].children.retain(|&k| k != child);
        let node = self.detach_subtree(child)?;
        self.update_bounds_from(parent);
        Ok(node)
    }

    pub fn add_member(&mut self, node: NodeKey, member: SceneMember) -> Result<MemberKey> {
        self.node(node)?;
        let key = self.members.insert(MemberSlot { member, parent: node });
        self.nodes[node].members.push(key);
        self.update_bounds_from(node);
        Ok(key)
    }

    pub fn remove_member(&mut self, node: NodeKey, member: MemberKey) -> Result<SceneMember> {
        self.node(node)?;
        if self.member(member)?.parent != node {
            return Err(graph_err!(
                SOURCE,
                InvalidArgument,
                "Member {:?} does not belong to node {:?}",
                member,
                node
            ));
        }

        self.nodes[node].members.retain(|&k| k != member);
        let slot = self.members.remove(member).ok_or_else(|| {
            graph_err!(SOURCE, ConsistencyViolation, "Member {:?} vanished during removal", member)
        })?;
        self.update_bounds_from(node);
        Ok(slot.member)
    }

    /// Mutate an attached member, then propagate its bounds change.
    pub fn update_member<F>(&mut self, member: MemberKey, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SceneMember),
    {
        let parent = self.member(member)?.parent;
        mutate(&mut self.members[member].member);
        self.update_bounds_from(parent);
        Ok(())
    }

    /// Run a transformation callback on a node, then refresh world matrices
    /// and bounds of its subtree and propagate upward.
    pub fn transform<F>(&mut self, key: NodeKey, transformer: F) -> Result<()>
    where
        F: FnOnce(&mut Transformation),
    {
        let parent = self.node(key)?.parent;
        let parent_world = self.world_of(parent);
        let previous = self.nodes[key].bounds;

        transformer(&mut self.nodes[key].transformation);

        self.refresh_subtree(key, &parent_world);
        self.propagate_change(key, previous);
        Ok(())
    }

    // ===== BOUNDS =====

    pub fn compute_node_bounds(&self, key: NodeKey) -> Option<AABB> {
        let node = &self.nodes[key];
        aggregate_bounds(
            node.transformation.world_matrix(),
            node.members
                .iter()
                .filter_map(|member| self.members.get(*member))
                .map(|slot| &slot.member),
            node.children
                .iter()
                .map(|child| self.nodes.get(*child).and_then(|node| node.bounds)),
        )
    }

    /// Recompute the graph bounds. `recursive` recomputes every node from
    /// scratch first; otherwise the cached node bounds are trusted.
    pub fn recalculate_bounds(&mut self, recursive: bool) {
        if recursive {
            let top_level = self.top_level.clone();
            for key in top_level {
                self.recalculate_subtree(key);
                match self.nodes[key].bounds {
                    Some(bounds) => self.index.update(key, &bounds),
                    None => {
                        self.index.remove(key);
                    }
                }
            }
        }
        self.index.recalculate();
    }

    pub fn recalculate_bounds_for_add(&mut self, key: NodeKey) -> Result<()> {
        let bounds = self.top_level_node(key)?.bounds;
        if let Some(bounds) = bounds {
            if !self.index.contains(key) {
                self.index.insert(key, &bounds);
            }
            self.index.recalculate_for_add(key);
        }
        Ok(())
    }

    fn recalculate_subtree(&mut self, key: NodeKey) {
        let children = self.nodes[key].children.clone();
        for child in children {
            self.recalculate_subtree(child);
        }
        self.nodes[key].bounds = self.compute_node_bounds(key);
    }

    fn refresh_subtree(&mut self, key: NodeKey, parent_world: &Mat4) {
        let node = &mut self.nodes[key];
        node.transformation.calculate_local_matrix();
        node.transformation.calculate_world_matrix(parent_world);
        let world = *node.transformation.world_matrix();

        let children = node.children.clone();
        for child in children {
            self.refresh_subtree(child, &world);
        }
        self.nodes[key].bounds = self.compute_node_bounds(key);
    }

    fn update_bounds_from(&mut self, key: NodeKey) {
        let previous = self.nodes[key].bounds;
        self.nodes[key].bounds = self.compute_node_bounds(key);
        self.propagate_change(key, previous);
    }

    /// Walk upward from `key`, whose bounds were `previous` before the change.
    fn propagate_change(&mut self, key: NodeKey, previous: Option<AABB>) {
        let mut current = key;
        let mut previous = previous;

        loop {
            let bounds = self.nodes[current].bounds;
            if bounds == previous {
                return;
            }

            match self.nodes[current].parent {
                Some(parent) => {
                    previous = self.nodes[parent].bounds;
                    self.nodes[parent].bounds = self.compute_node_bounds(parent);
                    current = parent;
                }
                None => {
                    match bounds {
                        Some(bounds) => self.index.update(current, &bounds),
                        None => {
                            self.index.remove(current);
                        }
                    }
                    return;
                }
            }
        }
    }

    // ===== ATTACH / DETACH =====

    fn attach_subtree(&mut self, node: SceneNode, parent: Option<NodeKey>, parent_world: &Mat4) -> NodeKey {
        let (name, mut transformation, children, members) = node.into_parts();
        transformation.calculate_local_matrix();
        transformation.calculate_world_matrix(parent_world);
        let world = *transformation.world_matrix();

        let key = self.nodes.insert(NodeSlot {
            name,
            parent,
            children: Vec::with_capacity(children.len()),
            members: Vec::with_capacity(members.len()),
            transformation,
            bounds: None,
        });

        for member in members {
            let member_key = self.members.insert(MemberSlot { member, parent: key });
            self.nodes[key].members.push(member_key);
        }
        for child in children {
            let child_key = self.attach_subtree(child, Some(key), &world);
            self.nodes[key].children.push(child_key);
        }

        self.nodes[key].bounds = self.compute_node_bounds(key);
        key
    }

    fn detach_subtree(&mut self, key: NodeKey) -> Result<SceneNode> {
        self.take_subtree(key)
            .map(Self::finish_detach)
            .ok_or_else(|| graph_err!(SOURCE, ConsistencyViolation, "Node {:?} vanished during removal", key))
    }

    fn take_subtree(&mut self, key: NodeKey) -> Option<SceneNode> {
        let slot = self.nodes.remove(key)?;
        let members = slot
            .members
            .into_iter()
            .filter_map(|member| self.members.remove(member))
            .map(|slot| slot.member)
            .collect();
        let children = slot
            .children
            .into_iter()
            .filter_map(|child| self.take_subtree(child))
            .collect();
        Some(SceneNode::from_parts(slot.name, slot.transformation, children, members))
    }

    /// World matrices of a detached subtree are relative to its own root.
    fn finish_detach(mut node: SceneNode) -> SceneNode {
        node.recalculate_bounds();
        node
    }
}

// ===== SHARED GRAPH =====

/// What a graph and all of its handles share.
///
/// `lock` is the graph lock callers see. `state` is only borrowed while the
/// graph lock is held, with `try_*`: a failed borrow means the same thread
/// re-entered the graph from inside a callback (or a panic poisoned it).
pub(crate) struct GraphShared {
    pub lock: Arc<GraphLock>,
    pub state: RwLock<GraphState>,
    pub config: GraphConfig,
}

impl GraphShared {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            lock: Arc::new(GraphLock::new()),
            state: RwLock::new(GraphState::new(GraphIndex::new(&config.strategy))),
            config,
        }
    }

    /// Run `operation` under the write lock.
    pub fn write<R, F>(&self, operation: F) -> Result<R>
    where
        F: FnOnce(&mut GraphState) -> Result<R>,
    {
        let _guard = self.lock.acquire_write()?;
        let mut state = self.state.try_write().map_err(|_| {
            graph_err!(SOURCE, ConsistencyViolation, "Graph mutated while it is being used on this thread")
        })?;
        operation(&mut state)
    }

    /// Run `operation` under the read lock.
    pub fn read<R, F>(&self, operation: F) -> Result<R>
    where
        F: FnOnce(&GraphState) -> Result<R>,
    {
        let _guard = self.lock.acquire_read()?;
        let state = self.state.try_read().map_err(|_| {
            graph_err!(SOURCE, ConsistencyViolation, "Graph read while it is being mutated on this thread")
        })?;
        operation(&state)
    }
}
