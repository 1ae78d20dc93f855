use glam::{Mat4, Vec3};
use crate::bounds::AABB;
use super::*;

fn perspective_vp(fov: f32, far: f32) -> Mat4 {
    let projection = Mat4::perspective_rh(fov, 1.0, 0.1, far);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    projection * view
}

fn aabb(min: Vec3, max: Vec3) -> AABB {
    AABB { min, max }
}

// ============================================================================
// Frustum::from_view_projection
// ============================================================================

#[test]
fn test_frustum_from_identity_matrix() {
    let frustum = Frustum::from_view_projection(&Mat4::IDENTITY);

    for plane in &frustum.planes {
        let normal_len = plane.truncate().length();
        assert!((normal_len - 1.0).abs() < 1e-5, "plane normal should be unit length");
    }
}

#[test]
fn test_frustum_from_perspective_projection() {
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_4, 100.0));

    for plane in &frustum.planes {
        let normal_len = plane.truncate().length();
        assert!((normal_len - 1.0).abs() < 1e-4, "plane normal should be unit length");
    }
}

#[test]
fn test_near_plane_uses_zero_depth() {
    // Camera at z=5 looking at -Z, near = 0.1 → visible starts at z = 4.9
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_2, 100.0));
    assert!(frustum.contains_point(Vec3::new(0.0, 0.0, 4.8)));
    assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 4.95)));
}

// ============================================================================
// Frustum::intersects_aabb
// ============================================================================

#[test]
fn test_aabb_inside_frustum() {
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_2, 100.0));
    assert!(frustum.intersects_aabb(&aabb(Vec3::splat(-1.0), Vec3::splat(1.0))));
}

#[test]
fn test_aabb_outside_frustum() {
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_4, 100.0));
    assert!(!frustum.intersects_aabb(&aabb(Vec3::splat(100.0), Vec3::splat(101.0))));
}

#[test]
fn test_aabb_behind_camera() {
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_2, 100.0));
    let behind = aabb(Vec3::new(-1.0, -1.0, 10.0), Vec3::new(1.0, 1.0, 12.0));
    assert!(!frustum.intersects_aabb(&behind));
}

#[test]
fn test_aabb_beyond_far_plane() {
    let frustum = Frustum::from_view_projection(&perspective_vp(std::f32::consts::FRAC_PI_2, 10.0));
    let far = aabb(Vec3::new(-1.0, -1.0, -20.0), Vec3::new(1.0, 1.0, -18.0));
    assert!(!frustum.intersects_aabb(&far));
}

#[test]
fn test_aabb_intersecting_frustum_boundary() {
    let vp = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&vp);

    // Straddles the right boundary at x=5
    let straddling = aabb(Vec3::new(4.0, 0.0, -10.0), Vec3::new(6.0, 1.0, -5.0));
    assert!(frustum.intersects_aabb(&straddling));
    assert_eq!(frustum.classify_aabb(&straddling), FrustumTest::Partial);
}

// ============================================================================
// Frustum::classify_aabb
// ============================================================================

#[test]
fn test_classify_inside_outside() {
    let vp = Mat4::orthographic_rh(-5.0, 5.0, -5.0, 5.0, 0.1, 100.0);
    let frustum = Frustum::from_view_projection(&vp);

    let inside = aabb(Vec3::new(-1.0, -1.0, -10.0), Vec3::new(1.0, 1.0, -5.0));
    let outside = aabb(Vec3::new(10.0, 10.0, -10.0), Vec3::new(11.0, 11.0, -5.0));

    assert_eq!(frustum.classify_aabb(&inside), FrustumTest::Inside);
    assert_eq!(frustum.classify_aabb(&outside), FrustumTest::Outside);
}

// ============================================================================
// Corners
// ============================================================================

#[test]
fn test_corners_of_singular_matrix() {
    assert!(Frustum::corners(&Mat4::ZERO).is_none());
}

#[test]
fn test_from_corners_matches_view_projection() {
    let vp = perspective_vp(std::f32::consts::FRAC_PI_3, 50.0);
    let from_vp = Frustum::from_view_projection(&vp);
    let corners = Frustum::corners(&vp).unwrap();
    let from_corners = Frustum::from_corners(&corners);

    for i in 0..6 {
        let a = from_vp.planes[i];
        let b = from_corners.planes[i];
        let normal_error = (a.truncate() - b.truncate()).abs().max_element();
        let distance_error = (a.w - b.w).abs();
        assert!(normal_error < 1e-3, "plane {} normal differs: {:?} vs {:?}", i, a, b);
        assert!(distance_error < 1e-2 * (1.0 + a.w.abs()), "plane {} distance differs: {:?} vs {:?}", i, a, b);
    }

    let probes = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -40.0),
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(30.0, 0.0, 0.0),
    ];
    for p in probes {
        assert_eq!(from_vp.contains_point(p), from_corners.contains_point(p), "probe {:?}", p);
    }
}

// ============================================================================
// Plane constants
// ============================================================================

#[test]
fn test_plane_constants() {
    assert_eq!(PLANE_LEFT, 0);
    assert_eq!(PLANE_RIGHT, 1);
    assert_eq!(PLANE_BOTTOM, 2);
    assert_eq!(PLANE_TOP, 3);
    assert_eq!(PLANE_NEAR, 4);
    assert_eq!(PLANE_FAR, 5);
}
