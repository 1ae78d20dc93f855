/// SpatialGraph — root container of a scene, owner of its lock.
///
/// The graph owns every attached node and member, one [`GraphLock`] and one
/// spatial index over its top-level nodes. The partitioning strategy (Flat,
/// Octree, Quadtree) is fixed at construction.
///
/// # Locking
///
/// Every method takes the lock it needs: the write lock for mutations, the
/// read lock for queries. The lock is reentrant for its writer, so a caller
/// may hold [`acquire_write_lock`](SpatialGraph::acquire_write_lock) across
/// several calls to make them atomic. All waits are interruptible (see
/// [`InterruptHandle`](crate::sync::InterruptHandle)).
///
/// # Example
///
/// ```ignore
/// let graph = SpatialGraph::octree(RegionConfig::default());
/// let node = graph.add(SceneNode::new().with_member(SceneMember::renderable("crate", aabb)))?;
/// node.request_transformations(|t| { t.translate(Vec3::X); })?;
/// for member in graph.intersection(&camera)? {
///     // draw
/// }
/// ```

use std::sync::Arc;
use crate::bounds::AABB;
use crate::camera::{Camera, Frustum};
use crate::error::Result;
use crate::sync::{GraphLock, ReadLock, WriteLock};
use crate::transform::{Axis, WorldAxes};
use crate::{graph_err, graph_info};
use super::graph_config::{GraphConfig, RegionConfig, Strategy, StrategyConfig};
use super::graph_state::{GraphShared, SOURCE};
use super::member::{MemberFlags, MemberKind, SceneMember};
use super::node_handle::{MemberHandle, NodeHandle};
use super::node_parent::NodeParent;
use super::scene_index::{RegionStats, SceneIndex};
use super::scene_node::SceneNode;
use super::visibility::{self, MemberView};

pub struct SpatialGraph {
    shared: Arc<GraphShared>,
}

impl Default for SpatialGraph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl SpatialGraph {
    pub fn new(config: GraphConfig) -> Self {
        let shared = Arc::new(GraphShared::new(config));
        graph_info!(SOURCE, "Created {:?} spatial graph", config.strategy.strategy());
        Self { shared }
    }

    pub fn flat() -> Self {
        Self::new(GraphConfig::with_strategy(StrategyConfig::Flat))
    }

    pub fn octree(region: RegionConfig) -> Self {
        Self::new(GraphConfig::with_strategy(StrategyConfig::Octree(region)))
    }

    /// Quadtree partitioning the plane orthogonal to `ignored_axis`.
    pub fn quadtree(ignored_axis: Axis, region: RegionConfig) -> Self {
        Self::new(GraphConfig::with_strategy(StrategyConfig::Quadtree { ignored_axis, region }))
    }

    // ===== CONFIGURATION =====

    pub fn strategy(&self) -> Strategy {
        self.shared.config.strategy.strategy()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.shared.config
    }

    pub fn world_axes(&self) -> &WorldAxes {
        &self.shared.config.world_axes
    }

    // ===== LOCKING =====

    /// Block until the write lock is granted. Reentrant; released on drop.
    pub fn acquire_write_lock(&self) -> Result<WriteLock> {
        self.shared.lock.acquire_write()
    }

    /// Block until a read lock is granted. Released on drop.
    pub fn acquire_read_lock(&self) -> Result<ReadLock> {
        self.shared.lock.acquire_read()
    }

    pub fn lock(&self) -> &Arc<GraphLock> {
        &self.shared.lock
    }

    // ===== CONTAINER =====

    /// Attach a detached subtree as a top-level node.
    pub fn add(&self, node: SceneNode) -> Result<NodeHandle> {
        let key = self.shared.write(|state| Ok(state.add_top_level(node)))?;
        Ok(NodeHandle::new(&self.shared, key))
    }

    /// Attach several subtrees under one write lock.
    pub fn add_all<I>(&self, nodes: I) -> Result<Vec<NodeHandle>>
    where
        I: IntoIterator<Item = SceneNode>,
    {
        let keys = self.shared.write(|state| {
            Ok(nodes
                .into_iter()
                .map(|node| state.add_top_level(node))
                .collect::<Vec<_>>())
        })?;
        Ok(keys
            .into_iter()
            .map(|key| NodeHandle::new(&self.shared, key))
            .collect())
    }

    /// Detach a top-level node and return it as an owned subtree.
    pub fn remove(&self, node: &NodeHandle) -> Result<SceneNode> {
        self.check_owned(node)?;
        self.shared.write(|state| state.remove_top_level(node.key()))
    }

    /// Detach several top-level nodes. Either all are removed or none is.
    pub fn remove_all(&self, nodes: &[NodeHandle]) -> Result<Vec<SceneNode>> {
        for node in nodes {
            self.check_owned(node)?;
        }
        self.shared.write(|state| {
            let mut seen = rustc_hash::FxHashSet::default();
            for node in nodes {
                if !state.is_top_level(node.key()) || !seen.insert(node.key()) {
                    return Err(graph_err!(
                        SOURCE,
                        InvalidArgument,
                        "Node {:?} is not a distinct top-level node of this graph",
                        node.key()
                    ));
                }
            }
            nodes
                .iter()
                .map(|node| state.remove_top_level(node.key()))
                .collect()
        })
    }

    /// Detach every top-level node not listed in `keep`. Returns the detached nodes.
    pub fn retain_all(&self, keep: &[NodeHandle]) -> Result<Vec<SceneNode>> {
        let keep: rustc_hash::FxHashSet<_> = keep
            .iter()
            .filter(|node| node.belongs_to(&self.shared))
            .map(NodeHandle::key)
            .collect();
        self.shared.write(|state| {
            let doomed: Vec<_> = state
                .top_level
                .iter()
                .copied()
                .filter(|key| !keep.contains(key))
                .collect();
            doomed
                .into_iter()
                .map(|key| state.remove_top_level(key))
                .collect()
        })
    }

    /// Whether `node` is a top-level node of this graph.
    pub fn contains(&self, node: &NodeHandle) -> Result<bool> {
        if !node.belongs_to(&self.shared) {
            return Ok(false);
        }
        self.shared.read(|state| Ok(state.is_top_level(node.key())))
    }

    pub fn contains_all(&self, nodes: &[NodeHandle]) -> Result<bool> {
        if !nodes.iter().all(|node| node.belongs_to(&self.shared)) {
            return Ok(false);
        }
        self.shared
            .read(|state| Ok(nodes.iter().all(|node| state.is_top_level(node.key()))))
    }

    /// Detach every node. Bounds become empty.
    pub fn clear(&self) -> Result<Vec<SceneNode>> {
        self.shared.write(|state| Ok(state.clear()))
    }

    /// Number of top-level nodes.
    pub fn size(&self) -> Result<usize> {
        self.shared.read(|state| Ok(state.top_level.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.size()? == 0)
    }

    /// Handles on the top-level nodes, in insertion order.
    pub fn nodes(&self) -> Result<Vec<NodeHandle>> {
        self.shared.read(|state| {
            Ok(state
                .top_level
                .iter()
                .map(|&key| NodeHandle::new(&self.shared, key))
                .collect())
        })
    }

    /// Members attached anywhere in the graph.
    pub fn member_count(&self) -> Result<usize> {
        self.shared.read(|state| Ok(state.members.len()))
    }

    // ===== BOUNDS =====

    /// Union of all contained bounds, `AABB::ZERO` when empty.
    pub fn bounds(&self) -> Result<AABB> {
        self.shared
            .read(|state| Ok(state.index.bounds().unwrap_or(AABB::ZERO)))
    }

    pub fn has_bounds(&self) -> Result<bool> {
        self.shared.read(|state| Ok(state.index.bounds().is_some()))
    }

    /// Rebuild the graph bounds from the top-level nodes.
    ///
    /// With `recursive`, every node first recomputes its own bounds from its
    /// members and children (full walk); otherwise cached node bounds are used.
    pub fn recalculate_bounds(&self, recursive: bool) -> Result<()> {
        self.shared.write(|state| {
            state.recalculate_bounds(recursive);
            Ok(())
        })
    }

    /// Fold one freshly added top-level node into the graph bounds.
    pub fn recalculate_bounds_for_add(&self, node: &NodeHandle) -> Result<()> {
        self.check_owned(node)?;
        self.shared
            .write(|state| state.recalculate_bounds_for_add(node.key()))
    }

    /// Non-recursive recalculation of the graph bounds.
    pub fn update_graph(&self) -> Result<()> {
        self.recalculate_bounds(false)
    }

    // ===== SPATIAL STRUCTURE =====

    /// Subdivide the root region. Returns the number of child regions.
    ///
    /// Flat graphs have no spatial regions and fail with `Error::Unsupported`.
    pub fn create_child_node(&self) -> Result<usize> {
        self.shared.write(|state| state.index.create_child_region())
    }

    pub fn region_stats(&self) -> Result<RegionStats> {
        self.shared.read(|state| Ok(state.index.stats()))
    }

    // ===== VISIBILITY =====

    /// Members whose world bounds the camera frustum may see.
    pub fn intersection(&self, camera: &Camera) -> Result<Vec<MemberHandle>> {
        self.intersection_frustum(camera.frustum())
    }

    pub fn intersection_frustum(&self, frustum: &Frustum) -> Result<Vec<MemberHandle>> {
        self.query(frustum, |_| true)
    }

    /// Visible renderables only: kind `Renderable` with the `VISIBLE` flag.
    pub fn visible_object_intersection(&self, camera: &Camera) -> Result<Vec<MemberHandle>> {
        self.query(camera.frustum(), |member| {
            member.kind() == MemberKind::Renderable && member.flags().contains(MemberFlags::VISIBLE)
        })
    }

    /// Invoke `draw` once per member the camera may see, under the read lock.
    ///
    /// The callback may read the graph but not mutate it. Returns the number
    /// of members visited.
    pub fn for_each_visible<F>(&self, camera: &Camera, mut draw: F) -> Result<usize>
    where
        F: FnMut(&MemberView),
    {
        let _guard = self.shared.lock.acquire_read()?;
        let views = self.shared.read(|state| {
            let mut found = Vec::new();
            visibility::collect_visible(state, camera.frustum(), |_| true, &mut found);
            Ok(found
                .into_iter()
                .filter_map(|(key, world_bounds)| {
                    let member = &state.members.get(key)?.member;
                    Some(MemberView {
                        handle: MemberHandle::new(&self.shared, key),
                        kind: member.kind(),
                        name: member.name().to_string(),
                        flags: member.flags(),
                        world_bounds,
                    })
                })
                .collect::<Vec<_>>())
        })?;

        for view in &views {
            draw(view);
        }
        Ok(views.len())
    }

    fn query<F>(&self, frustum: &Frustum, accept: F) -> Result<Vec<MemberHandle>>
    where
        F: Fn(&SceneMember) -> bool,
    {
        self.shared.read(|state| {
            let mut found = Vec::new();
            visibility::collect_visible(state, frustum, accept, &mut found);
            Ok(found
                .into_iter()
                .map(|(key, _)| MemberHandle::new(&self.shared, key))
                .collect())
        })
    }

    fn check_owned(&self, node: &NodeHandle) -> Result<()> {
        if node.belongs_to(&self.shared) {
            Ok(())
        } else {
            Err(graph_err!(SOURCE, InvalidArgument, "Node {:?} belongs to another graph", node.key()))
        }
    }
}

impl NodeParent for SpatialGraph {
    fn acquire_write_lock(&self) -> Result<Option<WriteLock>> {
        Ok(Some(self.shared.lock.acquire_write()?))
    }

    fn acquire_read_lock(&self) -> Result<Option<ReadLock>> {
        Ok(Some(self.shared.lock.acquire_read()?))
    }
}

impl std::fmt::Debug for SpatialGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialGraph")
            .field("strategy", &self.strategy())
            .field("lock", &self.shared.lock)
            .finish()
    }
}

#[cfg(test)]
#[path = "spatial_graph_tests.rs"]
mod tests;
