/// FlatSceneIndex — unstructured list of top-level nodes.
///
/// No subdivision: a query is a linear scan in insertion order. The aggregate
/// bounds are maintained incrementally. Growth folds into the aggregate;
/// a removal or shrink only triggers a rescan when the old bounds reached a
/// face of the aggregate box, since any other entry cannot define a face.

use rustc_hash::FxHashMap;
use crate::bounds::AABB;
use crate::camera::Frustum;
use crate::graph_trace;
use super::member::NodeKey;
use super::scene_index::{RegionStats, SceneIndex};

const SOURCE: &str = "galaxy3d::FlatSceneIndex";

#[derive(Debug, Default)]
pub struct FlatSceneIndex {
    /// Insertion order
    entries: Vec<NodeKey>,
    entry_bounds: FxHashMap<NodeKey, AABB>,
    bounds: Option<AABB>,
}

impl FlatSceneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bounds of one entry.
    pub fn entry_bounds(&self, key: NodeKey) -> Option<AABB> {
        self.entry_bounds.get(&key).copied()
    }

    /// Whether losing `old` may move a face of the aggregate.
    fn defines_face(&self, old: &AABB) -> bool {
        self.bounds.is_some_and(|aggregate| old.touches_boundary_of(&aggregate))
    }
}

impl SceneIndex for FlatSceneIndex {
    fn insert(&mut self, key: NodeKey, bounds: &AABB) {
        if self.entry_bounds.contains_key(&key) {
            self.update(key, bounds);
            return;
        }
        self.entries.push(key);
        self.entry_bounds.insert(key, *bounds);
        AABB::merge_into(&mut self.bounds, bounds);
    }

    fn remove(&mut self, key: NodeKey) -> bool {
        let Some(old) = self.entry_bounds.remove(&key) else {
            return false;
        };
        if let Some(position) = self.entries.iter().position(|&k| k == key) {
            self.entries.remove(position);
        }

        if self.entries.is_empty() {
            self.bounds = None;
        } else if self.defines_face(&old) {
            self.recalculate();
        }
        true
    }

    fn update(&mut self, key: NodeKey, bounds: &AABB) {
        let Some(old) = self.entry_bounds.insert(key, *bounds) else {
            self.entries.push(key);
            AABB::merge_into(&mut self.bounds, bounds);
            return;
        };

        if !bounds.contains(&old) && self.defines_face(&old) {
            self.recalculate();
        } else {
            AABB::merge_into(&mut self.bounds, bounds);
        }
    }

    fn query_frustum(&self, frustum: &Frustum, results: &mut Vec<NodeKey>) {
        for &key in &self.entries {
            if let Some(bounds) = self.entry_bounds.get(&key) {
                if frustum.intersects_aabb(bounds) {
                    results.push(key);
                }
            }
        }
    }

    fn bounds(&self) -> Option<AABB> {
        self.bounds
    }

    fn recalculate(&mut self) {
        graph_trace!(SOURCE, "Recalculating bounds of {} entries", self.entries.len());
        self.bounds = AABB::union_all(self.entry_bounds.values());
    }

    fn recalculate_for_add(&mut self, key: NodeKey) {
        if let Some(bounds) = self.entry_bounds.get(&key) {
            AABB::merge_into(&mut self.bounds, bounds);
        }
    }

    fn contains(&self, key: NodeKey) -> bool {
        self.entry_bounds.contains_key(&key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.entry_bounds.clear();
        self.bounds = None;
    }

    fn stats(&self) -> RegionStats {
        RegionStats {
            regions: 1,
            leaves: 1,
            max_depth_reached: 0,
            root_children: 0,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
#[path = "flat_scene_index_tests.rs"]
mod tests;
