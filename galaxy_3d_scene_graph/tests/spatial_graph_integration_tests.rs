//! Integration tests for the spatial graph
//!
//! These tests drive the public API only: strategies against a brute-force
//! ground truth, attach/detach round trips, and concurrent access.
//!
//! Run with: cargo test --test spatial_graph_integration_tests

use galaxy_3d_scene_graph::galaxy3d::{Error, SpatialGraph};
use galaxy_3d_scene_graph::galaxy3d::bounds::AABB;
use galaxy_3d_scene_graph::galaxy3d::camera::{Camera, Frustum};
use galaxy_3d_scene_graph::galaxy3d::scene::{
    MemberKind, NodeHandle, RegionConfig, SceneMember, SceneNode, Strategy,
};
use galaxy_3d_scene_graph::galaxy3d::sync::InterruptHandle;
use galaxy_3d_scene_graph::galaxy3d::transform::Axis;
use galaxy_3d_scene_graph::glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc;
use std::thread;

// ============================================================================
// HELPERS
// ============================================================================

fn all_strategies() -> Vec<SpatialGraph> {
    let small = RegionConfig::with_thresholds(4, 2, 5);
    vec![
        SpatialGraph::flat(),
        SpatialGraph::octree(small),
        SpatialGraph::quadtree(Axis::Y, small),
    ]
}

fn random_box(rng: &mut StdRng) -> AABB {
    let center = Vec3::new(
        rng.gen_range(-900.0..900.0),
        rng.gen_range(-900.0..900.0),
        rng.gen_range(-900.0..900.0),
    );
    let half = Vec3::new(rng.gen_range(0.1..20.0), rng.gen_range(0.1..20.0), rng.gen_range(0.1..20.0));
    AABB::from_center(center, half)
}

fn boxed_node(name: &str, bounds: AABB) -> SceneNode {
    SceneNode::with_name(name).with_member(SceneMember::renderable(name, bounds))
}

/// Orthographic box: x and y in [-half, half] around (cx, cy), z in [-500, 500].
fn box_camera(cx: f32, cy: f32, half: f32) -> Camera {
    Camera::new(
        Mat4::look_to_rh(Vec3::new(cx, cy, 500.0), Vec3::NEG_Z, Vec3::Y),
        Mat4::orthographic_rh(-half, half, -half, half, 0.0, 1000.0),
    )
}

fn sorted_names(graph: &SpatialGraph, frustum: &Frustum) -> Vec<String> {
    let mut names: Vec<String> = graph
        .intersection_frustum(frustum)
        .unwrap()
        .iter()
        .map(|member| member.name().unwrap())
        .collect();
    names.sort();
    names
}

// ============================================================================
// GROUND TRUTH
// ============================================================================

#[test]
fn test_integration_random_add_remove_matches_ground_truth() {
    for graph in all_strategies() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut live: Vec<(NodeHandle, AABB)> = Vec::new();

        for step in 0..400 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let bounds = random_box(&mut rng);
                let handle = graph.add(boxed_node(&format!("n{}", step), bounds)).unwrap();
                live.push((handle, bounds));
            } else {
                let (handle, bounds) = live.swap_remove(rng.gen_range(0..live.len()));
                let detached = graph.remove(&handle).unwrap();
                assert_eq!(detached.bounds(), bounds);
            }

            let expected = AABB::union_all(live.iter().map(|(_, bounds)| bounds));
            assert_eq!(graph.has_bounds().unwrap(), expected.is_some());
            assert_eq!(graph.bounds().unwrap(), expected.unwrap_or(AABB::ZERO));
            assert_eq!(graph.size().unwrap(), live.len());
        }

        let stats = graph.region_stats().unwrap();
        assert_eq!(stats.entries, live.len(), "{:?}", graph.strategy());
    }
}

#[test]
fn test_integration_queries_match_brute_force() {
    for graph in all_strategies() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut boxes = Vec::new();
        for i in 0..300 {
            let bounds = random_box(&mut rng);
            graph.add(boxed_node(&format!("n{:03}", i), bounds)).unwrap();
            boxes.push((format!("n{:03}", i), bounds));
        }

        for (cx, cy, half) in [(0.0, 0.0, 100.0), (500.0, -300.0, 250.0), (-800.0, 800.0, 60.0)] {
            let camera = box_camera(cx, cy, half);
            let mut expected: Vec<String> = boxes
                .iter()
                .filter(|(_, bounds)| camera.frustum().intersects_aabb(bounds))
                .map(|(name, _)| name.clone())
                .collect();
            expected.sort();

            assert_eq!(sorted_names(&graph, camera.frustum()), expected, "{:?}", graph.strategy());
        }
    }
}

#[test]
fn test_integration_full_empty_and_partial_queries() {
    for graph in all_strategies() {
        graph.add(boxed_node("a", AABB::from_center(Vec3::ZERO, Vec3::ONE))).unwrap();
        graph.add(boxed_node("b", AABB::from_center(Vec3::new(50.0, 0.0, 0.0), Vec3::ONE))).unwrap();
        graph.add(boxed_node("c", AABB::from_center(Vec3::new(0.0, 50.0, 0.0), Vec3::ONE))).unwrap();

        let everything = box_camera(0.0, 0.0, 1000.0);
        assert_eq!(sorted_names(&graph, everything.frustum()), vec!["a", "b", "c"]);

        let nothing = box_camera(-700.0, -700.0, 10.0);
        assert!(graph.intersection(&nothing).unwrap().is_empty());

        let partial = box_camera(25.0, 0.0, 30.0);
        assert_eq!(sorted_names(&graph, partial.frustum()), vec!["a", "b"]);
    }
}

// ============================================================================
// ROUND TRIPS
// ============================================================================

#[test]
fn test_integration_attach_detach_round_trip() {
    for graph in all_strategies() {
        let anchor = graph.add(boxed_node("anchor", AABB::new(Vec3::ZERO, Vec3::ONE))).unwrap();
        let before = graph.bounds().unwrap();
        let members_before = graph.member_count().unwrap();

        let subtree = SceneNode::with_name("arm")
            .with_child(
                SceneNode::with_name("hand")
                    .with_member(SceneMember::renderable("glove", AABB::new(Vec3::ZERO, Vec3::ONE)))
                    .with_transformation(|t| {
                        t.translate(Vec3::new(0.0, 2.0, 0.0));
                    }),
            )
            .with_member(SceneMember::light("torch", AABB::from_center(Vec3::ZERO, Vec3::splat(0.5))))
            .with_transformation(|t| {
                t.translate(Vec3::new(30.0, 0.0, 0.0)).set_uniform_scale(2.0);
            });

        let handle = graph.add(subtree.clone()).unwrap();
        assert_ne!(graph.bounds().unwrap(), before);

        assert_eq!(graph.member_count().unwrap(), members_before + 2);

        let detached = graph.remove(&handle).unwrap();
        assert_eq!(detached, subtree, "{:?}", graph.strategy());
        assert_eq!(graph.bounds().unwrap(), before);
        assert_eq!(graph.member_count().unwrap(), members_before);

        let child = anchor.add_child_node(subtree.clone()).unwrap();
        let detached = anchor.remove_child_node(&child).unwrap();
        assert_eq!(detached, subtree);
        assert_eq!(graph.bounds().unwrap(), before);
    }
}

#[test]
fn test_integration_flat_recalculate_scenario() {
    let graph = SpatialGraph::flat();
    graph.add(boxed_node("A", AABB::new(Vec3::ZERO, Vec3::ONE))).unwrap();
    let b = graph.add(boxed_node("B", AABB::new(Vec3::splat(2.0), Vec3::splat(3.0)))).unwrap();

    graph.recalculate_bounds(true).unwrap();
    assert_eq!(graph.bounds().unwrap(), AABB::new(Vec3::ZERO, Vec3::splat(3.0)));

    graph.remove(&b).unwrap();
    assert_eq!(graph.bounds().unwrap(), AABB::new(Vec3::ZERO, Vec3::ONE));
}

// ============================================================================
// SUBDIVISION
// ============================================================================

#[test]
fn test_integration_octree_splits_and_merges() {
    let graph = SpatialGraph::octree(RegionConfig::with_thresholds(4, 2, 3));
    let handles: Vec<NodeHandle> = (0..12)
        .map(|i| {
            let corner = Vec3::new(
                if i & 1 == 0 { 400.0 } else { -400.0 },
                if i & 2 == 0 { 400.0 } else { -400.0 },
                if i & 4 == 0 { 400.0 } else { -400.0 },
            );
            graph
                .add(boxed_node("n", AABB::from_center(corner + Vec3::splat(i as f32), Vec3::ONE)))
                .unwrap()
        })
        .collect();

    let split = graph.region_stats().unwrap();
    assert_eq!(split.root_children, 8);
    assert!(split.max_depth_reached <= 3);

    graph.remove_all(&handles[..11]).unwrap();
    let merged = graph.region_stats().unwrap();
    assert_eq!(merged.root_children, 0);
    assert_eq!(merged.entries, 1);
    assert_eq!(merged.regions, 1);
}

#[test]
fn test_integration_quadtree_ignores_axis() {
    let graph = SpatialGraph::quadtree(Axis::Y, RegionConfig::with_thresholds(1, 0, 4));
    graph.add(boxed_node("low", AABB::from_center(Vec3::new(100.0, -500.0, 100.0), Vec3::ONE))).unwrap();
    graph.add(boxed_node("high", AABB::from_center(Vec3::new(100.0, 500.0, 100.0), Vec3::ONE))).unwrap();

    assert_eq!(graph.strategy(), Strategy::Quadtree);
    assert_eq!(graph.region_stats().unwrap().root_children, 4);
    assert_eq!(graph.bounds().unwrap().min.y, -501.0);
    assert_eq!(graph.bounds().unwrap().max.y, 501.0);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn test_integration_concurrent_writers_and_readers() {
    let graph = SpatialGraph::octree(RegionConfig::with_thresholds(4, 2, 5));
    let camera = box_camera(0.0, 0.0, 300.0);

    thread::scope(|scope| {
        for writer in 0..4u64 {
            let graph = &graph;
            scope.spawn(move || {
                let mut rng = StdRng::seed_from_u64(writer);
                let mut mine = Vec::new();
                for step in 0..150 {
                    match step % 3 {
                        0 | 1 => {
                            let bounds = random_box(&mut rng);
                            mine.push(graph.add(boxed_node("w", bounds)).unwrap());
                        }
                        _ => {
                            let handle = mine.swap_remove(rng.gen_range(0..mine.len()));
                            let offset = Vec3::splat(rng.gen_range(-50.0..50.0));
                            handle
                                .request_transformations(|t| {
                                    t.translate(offset);
                                })
                                .unwrap();
                            graph.remove(&handle).unwrap();
                        }
                    }
                }
            });
        }

        for _ in 0..4 {
            let graph = &graph;
            let camera = &camera;
            scope.spawn(move || {
                for _ in 0..150 {
                    let bounds = graph.bounds().unwrap();
                    if graph.has_bounds().unwrap() {
                        assert!(bounds.min.cmple(bounds.max).all());
                    }
                    for member in graph.visible_object_intersection(camera).unwrap() {
                        // Detached between the query and this read is fine
                        if let Ok(kind) = member.kind() {
                            assert_eq!(kind, MemberKind::Renderable);
                        }
                    }
                }
            });
        }
    });

    // 4 writers each keep 50 of their 100 adds
    assert_eq!(graph.size().unwrap(), 200);
    assert_eq!(graph.region_stats().unwrap().entries, 200);
    let before = graph.bounds().unwrap();
    graph.recalculate_bounds(true).unwrap();
    assert_eq!(graph.bounds().unwrap(), before);
}

#[test]
fn test_integration_interrupt_blocked_writer() {
    let graph = SpatialGraph::flat();
    let guard = graph.acquire_write_lock().unwrap();

    thread::scope(|scope| {
        let (sender, receiver) = mpsc::channel();
        let graph = &graph;
        let waiter = scope.spawn(move || {
            sender.send(InterruptHandle::current()).unwrap();
            graph.add(SceneNode::with_name("late")).map(|_| ())
        });

        receiver.recv().unwrap().interrupt();
        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(Error::Cancelled)));
    });

    drop(guard);
    assert_eq!(graph.size().unwrap(), 0);
    graph.add(SceneNode::with_name("on time")).unwrap();
    assert_eq!(graph.size().unwrap(), 1);
}
