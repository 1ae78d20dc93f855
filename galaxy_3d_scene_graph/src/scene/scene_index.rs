/// Spatial indexing of a graph's top-level nodes.
///
/// A SceneIndex stores top-level nodes by their world-space aggregate bounds,
/// keeps the union of those bounds (the graph bounds) and answers frustum
/// queries. Nodes without bounds are not indexed.
///
/// The graph owns exactly one index, selected at construction time through
/// the closed [`GraphIndex`] enum.

use crate::bounds::AABB;
use crate::camera::Frustum;
use crate::error::Result;
use crate::graph_err;
use super::flat_scene_index::FlatSceneIndex;
use super::graph_config::StrategyConfig;
use super::member::NodeKey;
use super::region_scene_index::RegionSceneIndex;

/// Shape of an index, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegionStats {
    /// Live regions, root included
    pub regions: usize,
    /// Regions without children
    pub leaves: usize,
    /// Deepest live region (root = 0)
    pub max_depth_reached: u32,
    /// Child regions directly under the root (0 while the root is a leaf)
    pub root_children: usize,
    /// Indexed nodes
    pub entries: usize,
}

/// Strategy contract.
pub trait SceneIndex: Send + Sync {
    /// Index a node with its world-space bounds. Re-inserting updates it.
    fn insert(&mut self, key: NodeKey, bounds: &AABB);

    /// Remove a node. Returns false if it was not indexed.
    fn remove(&mut self, key: NodeKey) -> bool;

    /// Store new bounds for a node, indexing it if needed.
    fn update(&mut self, key: NodeKey, bounds: &AABB);

    /// Append every node whose bounds may intersect the frustum, in index order.
    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<NodeKey>);

    /// Union of all indexed bounds.
    fn bounds(&self) -> Option<AABB>;

    /// Rebuild the aggregate bounds from the stored entry bounds.
    fn recalculate(&mut self);

    /// Fold one entry's stored bounds into the aggregates, touching nothing else.
    fn recalculate_for_add(&mut self, key: NodeKey);

    fn contains(&self, key: NodeKey) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    fn stats(&self) -> RegionStats;
}

// ===== CLOSED STRATEGY SET =====

pub(crate) enum GraphIndex {
    Flat(FlatSceneIndex),
    Octree(RegionSceneIndex),
    Quadtree(RegionSceneIndex),
}

macro_rules! dispatch {
    ($self:expr, $index:ident => $body:expr) => {
        match $self {
            GraphIndex::Flat($index) => $body,
            GraphIndex::Octree($index) | GraphIndex::Quadtree($index) => $body,
        }
    };
}

impl GraphIndex {
    pub(crate) fn new(strategy: &StrategyConfig) -> Self {
        match strategy {
            StrategyConfig::Flat => GraphIndex::Flat(FlatSceneIndex::new()),
            StrategyConfig::Octree(region) => GraphIndex::Octree(RegionSceneIndex::octree(*region)),
            StrategyConfig::Quadtree { ignored_axis, region } => {
                GraphIndex::Quadtree(RegionSceneIndex::quadtree(*ignored_axis, *region))
            }
        }
    }

    /// Subdivide the root region. Returns the number of child regions.
    pub(crate) fn create_child_region(&mut self) -> Result<usize> {
        match self {
            GraphIndex::Flat(_) => Err(graph_err!(
                "galaxy3d::FlatSceneIndex",
                Unsupported,
                "Flat graphs have no spatial child nodes"
            )),
            GraphIndex::Octree(index) | GraphIndex::Quadtree(index) => Ok(index.split_root()),
        }
    }
}

impl SceneIndex for GraphIndex {
    fn insert(&mut self, key: NodeKey, bounds: &AABB) {
        dispatch!(self, index => index.insert(key, bounds))
    }

    fn remove(&mut self, key: NodeKey) -> bool {
        dispatch!(self, index => index.remove(key))
    }

    fn update(&mut self, key: NodeKey, bounds: &AABB) {
        dispatch!(self, index => index.update(key, bounds))
    }

    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<NodeKey>) {
        dispatch!(self, index => index.query_frustum(frustum, results))
    }

    fn bounds(&self) -> Option<AABB> {
        dispatch!(self, index => index.bounds())
    }

    fn recalculate(&mut self) {
        dispatch!(self, index => index.recalculate())
    }

    fn recalculate_for_add(&mut self, key: NodeKey) {
        dispatch!(self, index => index.recalculate_for_add(key))
    }

    fn contains(&self, key: NodeKey) -> bool {
        dispatch!(self, index => index.contains(key))
    }

    fn len(&self) -> usize {
        dispatch!(self, index => index.len())
    }

    fn clear(&mut self) {
        dispatch!(self, index => index.clear())
    }

    fn stats(&self) -> RegionStats {
        dispatch!(self, index => index.stats())
    }
}
