/// RegionSceneIndex — dynamic octree / quadtree over top-level nodes.
///
/// Each entry is stored in exactly one region: the deepest existing region
/// whose cell fully contains the entry's bounds. An entry straddling a split
/// plane stays in the parent; an entry outside the world box on a split axis
/// stays at the root. A quadtree never tests its ignored axis.
/// Both corners of the bounds landing in the same child cell is the
/// containment test, so descending costs O(1) per level.
///
/// Regions live in a flat array. Children of a region are a contiguous block
/// of 8 (octree) or 4 (quadtree) regions; freed blocks are reused.
///
/// - A region splits when it holds more than `split_threshold` entries and
///   is above `max_depth`.
/// - When the subtree of a region with children drops below
///   `merge_threshold` entries, the children collapse back into it.
///
/// Every region keeps the entry count and the union of the entry bounds of
/// its subtree. Queries classify regions by that content box, which also
/// covers entries kept at the root from outside the world box.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::bounds::AABB;
use crate::camera::{Frustum, FrustumTest};
use crate::transform::Axis;
use crate::{graph_debug, graph_trace};
use super::graph_config::RegionConfig;
use super::member::NodeKey;
use super::scene_index::{RegionStats, SceneIndex};

/// Index of the root region in the flat region array.
const ROOT: usize = 0;

struct Region {
    /// Cell of this region
    cell: AABB,
    depth: u32,
    parent: Option<usize>,
    /// First region of the child block
    children: Option<usize>,
    /// Entries stored at this level
    entries: Vec<NodeKey>,
    /// Entries in the whole subtree
    count: usize,
    /// Union of the entry bounds in the whole subtree
    content: Option<AABB>,
}

impl Region {
    fn new(cell: AABB, depth: u32, parent: Option<usize>) -> Self {
        Self {
            cell,
            depth,
            parent,
            children: None,
            entries: Vec::new(),
            count: 0,
            content: None,
        }
    }
}

pub struct RegionSceneIndex {
    regions: Vec<Region>,
    /// First indices of released child blocks
    free_blocks: Vec<usize>,
    /// Entry key → (region index, bounds)
    locations: FxHashMap<NodeKey, (usize, AABB)>,
    config: RegionConfig,
    /// Axes split by a subdivision (3 for an octree, 2 for a quadtree)
    split_axes: Vec<usize>,
    source: &'static str,
}

impl RegionSceneIndex {
    /// Octree over `config.world_bounds`.
    pub fn octree(config: RegionConfig) -> Self {
        Self::new(config, vec![0, 1, 2], "galaxy3d::OctreeSceneIndex")
    }

    /// Quadtree over `config.world_bounds`, never splitting along `ignored_axis`.
    pub fn quadtree(ignored_axis: Axis, config: RegionConfig) -> Self {
        let split_axes = (0..3).filter(|&axis| axis != ignored_axis.index()).collect();
        Self::new(config, split_axes, "galaxy3d::QuadtreeSceneIndex")
    }

    fn new(config: RegionConfig, split_axes: Vec<usize>, source: &'static str) -> Self {
        let config = config.normalized();
        Self {
            regions: vec![Region::new(config.world_bounds, 0, None)],
            free_blocks: Vec::new(),
            locations: FxHashMap::default(),
            config,
            split_axes,
            source,
        }
    }

    pub fn config(&self) -> &RegionConfig {
        &self.config
    }

    /// Regions per child block (8 or 4).
    pub fn child_count(&self) -> usize {
        1 << self.split_axes.len()
    }

    /// Depth of the region holding an entry.
    pub fn entry_depth(&self, key: NodeKey) -> Option<u32> {
        self.locations
            .get(&key)
            .map(|&(region, _)| self.regions[region].depth)
    }

    /// Subdivide the root if it is a leaf. Returns the number of child regions.
    pub(crate) fn split_root(&mut self) -> usize {
        self.split(ROOT);
        self.child_count()
    }

    // ===== CELL GEOMETRY =====

    /// Cell of child `slot` of `parent`.
    ///
    /// Bit `i` of `slot` selects the low (0) or high (1) half along the i-th
    /// split axis; ignored axes keep the parent's full extent.
    fn child_cell(&self, parent: &AABB, slot: usize) -> AABB {
        let center = parent.center();
        let mut min = parent.min;
        let mut max = parent.max;
        for (bit, &axis) in self.split_axes.iter().enumerate() {
            if slot & (1 << bit) == 0 {
                max[axis] = center[axis];
            } else {
                min[axis] = center[axis];
            }
        }
        AABB { min, max }
    }

    fn point_slot(&self, center: Vec3, point: Vec3) -> usize {
        self.split_axes
            .iter()
            .enumerate()
            .fold(0, |slot, (bit, &axis)| slot | (((point[axis] >= center[axis]) as usize) << bit))
    }

    /// Child of `region` whose cell fully contains `bounds`, if it has children.
    fn fitting_child(&self, region: usize, bounds: &AABB) -> Option<usize> {
        let first = self.regions[region].children?;
        let center = self.regions[region].cell.center();
        let min_slot = self.point_slot(center, bounds.min);
        let max_slot = self.point_slot(center, bounds.max);
        (min_slot == max_slot).then_some(first + min_slot)
    }

    /// Whether `cell` contains `bounds` on every split axis.
    fn holds(&self, cell: &AABB, bounds: &AABB) -> bool {
        self.split_axes
            .iter()
            .all(|&axis| cell.min[axis] <= bounds.min[axis] && bounds.max[axis] <= cell.max[axis])
    }

    /// Deepest existing region that should hold `bounds`.
    fn find_target(&self, bounds: &AABB) -> usize {
        if !self.holds(&self.regions[ROOT].cell, bounds) {
            return ROOT;
        }
        let mut region = ROOT;
        while let Some(child) = self.fitting_child(region, bounds) {
            region = child;
        }
        region
    }

    // ===== ENTRY PLACEMENT =====

    fn attach_entry(&mut self, region: usize, key: NodeKey, bounds: AABB) {
        self.regions[region].entries.push(key);
        self.locations.insert(key, (region, bounds));

        let mut current = Some(region);
        while let Some(index) = current {
            let region = &mut self.regions[index];
            region.count += 1;
            AABB::merge_into(&mut region.content, &bounds);
            current = region.parent;
        }
    }

    fn detach_entry(&mut self, key: NodeKey) -> Option<usize> {
        let (region, bounds) = self.locations.remove(&key)?;
        let entries = &mut self.regions[region].entries;
        if let Some(position) = entries.iter().position(|&k| k == key) {
            entries.remove(position);
        }

        let mut current = Some(region);
        while let Some(index) = current {
            self.regions[index].count -= 1;
            self.shrink_content(index, &bounds);
            current = self.regions[index].parent;
        }
        Some(region)
    }

    /// Refresh a region's content after `old` left it.
    fn shrink_content(&mut self, index: usize, old: &AABB) {
        let region = &self.regions[index];
        let content = if region.count == 0 {
            None
        } else if region.content.is_some_and(|content| old.touches_boundary_of(&content)) {
            self.region_content(index)
        } else {
            region.content
        };
        self.regions[index].content = content;
    }

    /// Union of the entries at this level and the children's content.
    fn region_content(&self, index: usize) -> Option<AABB> {
        let region = &self.regions[index];
        let mut content = None;
        for key in &region.entries {
            if let Some((_, bounds)) = self.locations.get(key) {
                AABB::merge_into(&mut content, bounds);
            }
        }
        if let Some(first) = region.children {
            for child in first..first + self.child_count() {
                if let Some(bounds) = &self.regions[child].content {
                    AABB::merge_into(&mut content, bounds);
                }
            }
        }
        content
    }

    // ===== SPLIT / MERGE =====

    fn split_if_needed(&mut self, index: usize) {
        let region = &self.regions[index];
        if region.children.is_none()
            && region.entries.len() > self.config.split_threshold
            && region.depth < self.config.max_depth
        {
            self.split(index);
        }
    }

    /// Create the child block of `index` and push down every entry that fits.
    fn split(&mut self, index: usize) {
        if self.regions[index].children.is_some() {
            return;
        }

        let count = self.child_count();
        let cell = self.regions[index].cell;
        let depth = self.regions[index].depth + 1;
        let first = match self.free_blocks.pop() {
            Some(first) => first,
            None => {
                let first = self.regions.len();
                self.regions.extend((0..count).map(|_| Region::new(cell, depth, None)));
                first
            }
        };
        for slot in 0..count {
            self.regions[first + slot] = Region::new(self.child_cell(&cell, slot), depth, Some(index));
        }
        self.regions[index].children = Some(first);

        let entries = std::mem::take(&mut self.regions[index].entries);
        let mut kept = Vec::new();
        for key in entries {
            let Some(&(_, bounds)) = self.locations.get(&key) else {
                continue;
            };
            let target = if self.holds(&cell, &bounds) {
                self.fitting_child(index, &bounds)
            } else {
                None
            };
            match target {
                Some(child) => {
                    let region = &mut self.regions[child];
                    region.entries.push(key);
                    region.count += 1;
                    AABB::merge_into(&mut region.content, &bounds);
                    self.locations.insert(key, (child, bounds));
                }
                None => kept.push(key),
            }
        }
        self.regions[index].entries = kept;

        graph_debug!(
            self.source,
            "Split region {} at depth {} ({} entries kept)",
            index,
            depth - 1,
            self.regions[index].entries.len()
        );

        for child in first..first + count {
            self.split_if_needed(child);
        }
    }

    /// Collapse the highest region on the path from `from` to the root whose
    /// subtree dropped below the merge threshold.
    fn merge_check(&mut self, from: usize) {
        let mut candidate = None;
        let mut current = Some(from);
        while let Some(index) = current {
            let region = &self.regions[index];
            if region.children.is_some() && region.count < self.config.merge_threshold {
                candidate = Some(index);
            }
            current = region.parent;
        }
        if let Some(index) = candidate {
            self.collapse(index);
        }
    }

    fn collapse(&mut self, index: usize) {
        let Some(first) = self.regions[index].children.take() else {
            return;
        };

        let mut gathered = Vec::new();
        for child in first..first + self.child_count() {
            self.release_subtree(child, &mut gathered);
        }
        self.free_blocks.push(first);

        for &key in &gathered {
            if let Some(location) = self.locations.get_mut(&key) {
                location.0 = index;
            }
        }
        self.regions[index].entries.extend(gathered);

        graph_debug!(
            self.source,
            "Merged children of region {} ({} entries)",
            index,
            self.regions[index].entries.len()
        );
    }

    fn release_subtree(&mut self, index: usize, gathered: &mut Vec<NodeKey>) {
        gathered.append(&mut self.regions[index].entries);
        if let Some(first) = self.regions[index].children.take() {
            for child in first..first + self.child_count() {
                self.release_subtree(child, gathered);
            }
            self.free_blocks.push(first);
        }
    }

    /// Recompute counts and content bottom-up.
    fn recalculate_region(&mut self, index: usize) {
        let mut count = self.regions[index].entries.len();
        if let Some(first) = self.regions[index].children {
            for child in first..first + self.child_count() {
                self.recalculate_region(child);
                count += self.regions[child].count;
            }
        }
        self.regions[index].count = count;
        self.regions[index].content = self.region_content(index);
    }

    // ===== QUERY =====

    fn query_region(&self, index: usize, frustum: &Frustum, results: &mut Vec<NodeKey>) {
        let region = &self.regions[index];
        let Some(content) = &region.content else {
            return;
        };

        match frustum.classify_aabb(content) {
            FrustumTest::Outside => {}

            FrustumTest::Inside => self.collect_all(index, results),

            FrustumTest::Partial => {
                for key in &region.entries {
                    if let Some((_, bounds)) = self.locations.get(key) {
                        if frustum.intersects_aabb(bounds) {
                            results.push(*key);
                        }
                    }
                }
                if let Some(first) = region.children {
                    for child in first..first + self.child_count() {
                        self.query_region(child, frustum, results);
                    }
                }
            }
        }
    }

    /// Every entry of a subtree, no frustum test.
    fn collect_all(&self, index: usize, results: &mut Vec<NodeKey>) {
        let region = &self.regions[index];
        results.extend_from_slice(&region.entries);
        if let Some(first) = region.children {
            for child in first..first + self.child_count() {
                self.collect_all(child, results);
            }
        }
    }

    fn stats_region(&self, index: usize, stats: &mut RegionStats) {
        let region = &self.regions[index];
        stats.regions += 1;
        stats.max_depth_reached = stats.max_depth_reached.max(region.depth);
        match region.children {
            Some(first) => {
                for child in first..first + self.child_count() {
                    self.stats_region(child, stats);
                }
            }
            None => stats.leaves += 1,
        }
    }
}

// ===== SCENE INDEX TRAIT =====

impl SceneIndex for RegionSceneIndex {
    fn insert(&mut self, key: NodeKey, bounds: &AABB) {
        if self.locations.contains_key(&key) {
            self.update(key, bounds);
            return;
        }
        let target = self.find_target(bounds);
        self.attach_entry(target, key, *bounds);
        self.split_if_needed(target);
    }

    fn remove(&mut self, key: NodeKey) -> bool {
        let Some(region) = self.detach_entry(key) else {
            return false;
        };
        self.merge_check(region);
        true
    }

    fn update(&mut self, key: NodeKey, bounds: &AABB) {
        let target = self.find_target(bounds);
        match self.locations.get(&key).copied() {
            Some((region, old)) if region == target => {
                // Same region: store the bounds and refresh the content upward
                self.locations.insert(key, (region, *bounds));
                let mut current = Some(region);
                while let Some(index) = current {
                    self.shrink_content(index, &old);
                    if let Some(content) = &mut self.regions[index].content {
                        *content = content.merge(bounds);
                    }
                    current = self.regions[index].parent;
                }
            }
            Some(_) => {
                // Relocate; the merge may reshape the tree, so search again
                if let Some(region) = self.detach_entry(key) {
                    self.merge_check(region);
                }
                let target = self.find_target(bounds);
                self.attach_entry(target, key, *bounds);
                self.split_if_needed(target);
            }
            None => self.insert(key, bounds),
        }
    }

    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<NodeKey>) {
        self.query_region(ROOT, frustum, results);
    }

    fn bounds(&self) -> Option<AABB> {
        self.regions[ROOT].content
    }

    fn recalculate(&mut self) {
        graph_trace!(self.source, "Recalculating bounds of {} entries", self.locations.len());
        self.recalculate_region(ROOT);
    }

    fn recalculate_for_add(&mut self, key: NodeKey) {
        let Some(&(region, bounds)) = self.locations.get(&key) else {
            return;
        };
        let mut current = Some(region);
        while let Some(index) = current {
            AABB::merge_into(&mut self.regions[index].content, &bounds);
            current = self.regions[index].parent;
        }
    }

    fn contains(&self, key: NodeKey) -> bool {
        self.locations.contains_key(&key)
    }

    fn len(&self) -> usize {
        self.locations.len()
    }

    fn clear(&mut self) {
        self.regions.truncate(1);
        self.regions[ROOT] = Region::new(self.config.world_bounds, 0, None);
        self.free_blocks.clear();
        self.locations.clear();
    }

    fn stats(&self) -> RegionStats {
        let mut stats = RegionStats {
            entries: self.locations.len(),
            root_children: self.regions[ROOT].children.map_or(0, |_| self.child_count()),
            ..RegionStats::default()
        };
        self.stats_region(ROOT, &mut stats);
        stats
    }
}

#[cfg(test)]
#[path = "region_scene_index_tests.rs"]
mod tests;
