//! Scene graph module
//!
//! Provides the spatial graph, its nodes and members, and the spatial
//! indexing strategies (flat list, octree, quadtree) behind visibility queries.

mod graph_config;
mod graph_state;
mod member;
mod node_parent;
mod scene_node;
mod node_handle;
mod scene_index;
mod flat_scene_index;
mod region_scene_index;
mod visibility;
mod spatial_graph;

pub use graph_config::{GraphConfig, StrategyConfig, RegionConfig, Strategy};
pub use member::{SceneMember, MemberKind, MemberFlags, NodeKey, MemberKey};
pub use node_parent::NodeParent;
pub use scene_node::SceneNode;
pub use node_handle::{NodeHandle, MemberHandle};
pub use scene_index::{SceneIndex, RegionStats};
pub use flat_scene_index::FlatSceneIndex;
pub use region_scene_index::RegionSceneIndex;
pub use visibility::MemberView;
pub use spatial_graph::SpatialGraph;
