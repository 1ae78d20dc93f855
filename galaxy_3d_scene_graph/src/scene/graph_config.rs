/// Spatial graph configuration.
///
/// Chosen once when the graph is built: the partitioning strategy, its
/// subdivision parameters, and the world axis convention.

use glam::Vec3;
use crate::bounds::AABB;
use crate::transform::{Axis, WorldAxes};

/// Strategy tag of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Flat,
    Octree,
    Quadtree,
}

/// Subdivision parameters of an octree or quadtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    /// Box of the root region. Entries outside it are kept at the root.
    pub world_bounds: AABB,
    /// A region splits when it holds more entries than this
    pub split_threshold: usize,
    /// A region collapses its children when its subtree holds fewer entries than this
    pub merge_threshold: usize,
    /// Depth limit (root = 0)
    pub max_depth: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            world_bounds: AABB::new(Vec3::splat(-1000.0), Vec3::splat(1000.0)),
            split_threshold: 8,
            merge_threshold: 4,
            max_depth: 6,
        }
    }
}

impl RegionConfig {
    /// Same world box with different thresholds and depth.
    pub fn with_thresholds(split_threshold: usize, merge_threshold: usize, max_depth: u32) -> Self {
        Self {
            split_threshold,
            merge_threshold,
            max_depth,
            ..Self::default()
        }
    }

    /// Split threshold at least 1, merge threshold no larger than split threshold.
    pub fn normalized(&self) -> Self {
        let split_threshold = self.split_threshold.max(1);
        Self {
            world_bounds: AABB::new(self.world_bounds.min, self.world_bounds.max),
            split_threshold,
            merge_threshold: self.merge_threshold.min(split_threshold),
            max_depth: self.max_depth,
        }
    }
}

/// Partitioning strategy with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyConfig {
    Flat,
    Octree(RegionConfig),
    Quadtree {
        ignored_axis: Axis,
        region: RegionConfig,
    },
}

impl StrategyConfig {
    pub fn strategy(&self) -> Strategy {
        match self {
            StrategyConfig::Flat => Strategy::Flat,
            StrategyConfig::Octree(_) => Strategy::Octree,
            StrategyConfig::Quadtree { .. } => Strategy::Quadtree,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphConfig {
    pub strategy: StrategyConfig,
    pub world_axes: WorldAxes,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::Flat,
            world_axes: WorldAxes::default(),
        }
    }
}

impl GraphConfig {
    pub fn with_strategy(strategy: StrategyConfig) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}
