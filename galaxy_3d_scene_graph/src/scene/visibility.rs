/// Visibility query — which members a frustum can see.
///
/// Two stages:
/// 1. The graph index returns the top-level nodes whose aggregate bounds may
///    intersect the frustum (regions are pruned there).
/// 2. Each candidate subtree is walked depth-first. A node whose aggregate is
///    outside is skipped with its subtree; a node fully inside accepts its
///    whole subtree without more plane tests; otherwise each member's world
///    bounds are tested.
///
/// Results follow index order, then child order, then member order. A member
/// belongs to exactly one node, so it appears at most once.

use crate::bounds::AABB;
use crate::camera::{Frustum, FrustumTest};
use super::graph_state::GraphState;
use super::member::{MemberFlags, MemberKey, MemberKind, NodeKey, SceneMember};
use super::node_handle::MemberHandle;
use super::scene_index::SceneIndex;

/// A visible member as handed to a draw callback.
#[derive(Debug, Clone)]
pub struct MemberView {
    pub handle: MemberHandle,
    pub kind: MemberKind,
    pub name: String,
    pub flags: MemberFlags,
    pub world_bounds: AABB,
}

/// Append `(member, world bounds)` for every accepted member the frustum sees.
pub(crate) fn collect_visible<F>(
    state: &GraphState,
    frustum: &Frustum,
    accept: F,
    results: &mut Vec<(MemberKey, AABB)>,
) where
    F: Fn(&SceneMember) -> bool,
{
    let mut candidates = Vec::new();
    state.index.query_frustum(frustum, &mut candidates);

    for key in candidates {
        walk(state, key, frustum, false, &accept, results);
    }
}

fn walk<F>(
    state: &GraphState,
    key: NodeKey,
    frustum: &Frustum,
    parent_inside: bool,
    accept: &F,
    results: &mut Vec<(MemberKey, AABB)>,
) where
    F: Fn(&SceneMember) -> bool,
{
    let Some(node) = state.nodes.get(key) else {
        return;
    };
    let Some(bounds) = node.bounds else {
        return;
    };

    let inside = parent_inside
        || match frustum.classify_aabb(&bounds) {
            FrustumTest::Outside => return,
            FrustumTest::Inside => true,
            FrustumTest::Partial => false,
        };

    let world_matrix = node.transformation.world_matrix();
    for &member_key in &node.members {
        let Some(slot) = state.members.get(member_key) else {
            continue;
        };
        if !accept(&slot.member) {
            continue;
        }
        let world_bounds = slot.member.world_bounds(world_matrix);
        if inside || frustum.intersects_aabb(&world_bounds) {
            results.push((member_key, world_bounds));
        }
    }

    for &child in &node.children {
        walk(state, child, frustum, inside, accept, results);
    }
}
