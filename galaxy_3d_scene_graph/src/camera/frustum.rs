/// Frustum — six clipping planes for visibility culling.
///
/// Each plane is represented as a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing normal
/// - D is the signed distance
/// - A point P is inside the frustum if dot(plane, P_homogeneous) >= 0 for all planes
///
/// A frustum is built once per camera change (from a view-projection matrix,
/// from explicit planes, or from the 8 corner points) and is read-only while
/// a visibility query runs.

use glam::{Mat4, Vec3, Vec4};
use crate::bounds::AABB;

/// Result of a 3-way frustum/AABB classification.
///
/// Used by the spatial indices for hierarchical culling:
/// - `Outside` → skip the entire subtree
/// - `Inside` → collect all entries without further testing
/// - `Partial` → test individual entries and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the frustum
    Outside,
    /// AABB is entirely inside the frustum
    Inside,
    /// AABB partially overlaps the frustum
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Corner indices used by [`Frustum::from_corners`] and [`Frustum::corners`].
///
/// Near face first, then far face; each face is bottom-left, bottom-right,
/// top-right, top-left.
pub const CORNER_NEAR_BOTTOM_LEFT: usize = 0;
pub const CORNER_NEAR_BOTTOM_RIGHT: usize = 1;
pub const CORNER_NEAR_TOP_RIGHT: usize = 2;
pub const CORNER_NEAR_TOP_LEFT: usize = 3;
pub const CORNER_FAR_BOTTOM_LEFT: usize = 4;
pub const CORNER_FAR_BOTTOM_RIGHT: usize = 5;
pub const CORNER_FAR_TOP_RIGHT: usize = 6;
pub const CORNER_FAR_TOP_LEFT: usize = 7;

/// Six frustum planes for culling.
///
/// Each plane is (A, B, C, D) where Ax + By + Cz + D = 0.
/// Normal (A, B, C) points inward (toward the visible volume).
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method. Works for both perspective
    /// and orthographic projections with a [0, 1] depth range.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        let planes = [
            // Left:   row3 + row0
            Vec4::new(m[0][3] + m[0][0], m[1][3] + m[1][0], m[2][3] + m[2][0], m[3][3] + m[3][0]),
            // Right:  row3 - row0
            Vec4::new(m[0][3] - m[0][0], m[1][3] - m[1][0], m[2][3] - m[2][0], m[3][3] - m[3][0]),
            // Bottom: row3 + row1
            Vec4::new(m[0][3] + m[0][1], m[1][3] + m[1][1], m[2][3] + m[2][1], m[3][3] + m[3][1]),
            // Top:    row3 - row1
            Vec4::new(m[0][3] - m[0][1], m[1][3] - m[1][1], m[2][3] - m[2][1], m[3][3] - m[3][1]),
            // Near:   row2 (depth range starts at 0)
            Vec4::new(m[0][2], m[1][2], m[2][2], m[3][2]),
            // Far:    row3 - row2
            Vec4::new(m[0][3] - m[0][2], m[1][3] - m[1][2], m[2][3] - m[2][2], m[3][3] - m[3][2]),
        ];

        Self::from_planes(planes)
    }

    /// Build from explicit planes. Each plane is normalized so that
    /// (A, B, C) is a unit vector; degenerate planes are kept as given.
    pub fn from_planes(mut planes: [Vec4; 6]) -> Self {
        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }
        Self { planes }
    }

    /// Build from the 8 corner points (see the `CORNER_*` constants).
    ///
    /// Plane normals are oriented toward the centroid of the corners, so the
    /// winding of each face does not matter.
    pub fn from_corners(corners: &[Vec3; 8]) -> Self {
        let centroid = corners.iter().copied().sum::<Vec3>() / 8.0;
        let plane = |a: usize, b: usize, c: usize| -> Vec4 {
            let (pa, pb, pc) = (corners[a], corners[b], corners[c]);
            let normal = (pb - pa).cross(pc - pa).normalize_or_zero();
            let mut plane = normal.extend(-normal.dot(pa));
            if plane.truncate().dot(centroid) + plane.w < 0.0 {
                plane = -plane;
            }
            plane
        };

        let planes = [
            plane(CORNER_NEAR_BOTTOM_LEFT, CORNER_NEAR_TOP_LEFT, CORNER_FAR_BOTTOM_LEFT),
            plane(CORNER_NEAR_BOTTOM_RIGHT, CORNER_NEAR_TOP_RIGHT, CORNER_FAR_BOTTOM_RIGHT),
            plane(CORNER_NEAR_BOTTOM_LEFT, CORNER_NEAR_BOTTOM_RIGHT, CORNER_FAR_BOTTOM_LEFT),
            plane(CORNER_NEAR_TOP_LEFT, CORNER_NEAR_TOP_RIGHT, CORNER_FAR_TOP_LEFT),
            plane(CORNER_NEAR_BOTTOM_LEFT, CORNER_NEAR_BOTTOM_RIGHT, CORNER_NEAR_TOP_RIGHT),
            plane(CORNER_FAR_BOTTOM_LEFT, CORNER_FAR_BOTTOM_RIGHT, CORNER_FAR_TOP_RIGHT),
        ];

        Self { planes }
    }

    /// World-space corners of the volume described by a view-projection matrix.
    ///
    /// Returns `None` when the matrix is not invertible.
    pub fn corners(vp: &Mat4) -> Option<[Vec3; 8]> {
        if vp.determinant().abs() <= f32::EPSILON {
            return None;
        }
        let inverse = vp.inverse();
        let ndc = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        Some(ndc.map(|p| inverse.project_point3(p)))
    }

    /// Test if a point lies inside (or on) the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// Uses the "positive vertex" test: for each plane, find the AABB corner
    /// most in the direction of the plane normal. If that corner is outside,
    /// the AABB is fully outside.
    ///
    /// Returns `true` if the AABB is (potentially) inside or intersecting.
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            normal.dot(Self::positive_vertex(normal, aabb)) + plane.w >= 0.0
        })
    }

    /// Classify an AABB against the frustum (3-way test).
    ///
    /// Tests both the positive vertex (p-vertex) and negative vertex (n-vertex)
    /// against each plane:
    /// - If the p-vertex is outside any plane → `Outside` (early out)
    /// - If the n-vertex is outside any plane → at least `Partial`
    /// - If all n-vertices are inside all planes → `Inside`
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();

            if normal.dot(Self::positive_vertex(normal, aabb)) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            if normal.dot(Self::negative_vertex(normal, aabb)) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
    }

    /// Corner most in the direction of the normal
    fn positive_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min)
    }

    /// Corner least in the direction of the normal
    fn negative_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
        Vec3::select(normal.cmpge(Vec3::ZERO), aabb.min, aabb.max)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
