/// Axis-Aligned Bounding Box.
///
/// The bounding volume of a member, a node subtree, a spatial region or a
/// whole graph. Corners are kept ordered (`min <= max` on every axis).
///
/// Aggregates that may contain nothing keep an `Option<AABB>` and use
/// [`AABB::merge_into`] to fold; [`AABB::ZERO`] is what their public getters
/// report while empty.

use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::ZERO
    }
}

impl AABB {
    /// Canonical empty box: both corners at the origin.
    pub const ZERO: AABB = AABB { min: Vec3::ZERO, max: Vec3::ZERO };

    /// Create a box from two opposite corners, in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(b), max: a.max(b) }
    }

    /// Create a box from its center and half extents.
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self { min: center - half, max: center + half }
    }

    /// Smallest box containing every point.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Compute the center point of this AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full extents along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// `min <= max` on every axis, and no NaN.
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Smallest box containing both boxes.
    pub fn merge(&self, other: &AABB) -> AABB {
        AABB { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Fold `other` into an optional running aggregate.
    pub fn merge_into(accumulator: &mut Option<AABB>, other: &AABB) {
        *accumulator = Some(match accumulator {
            Some(current) => current.merge(other),
            None => *other,
        });
    }

    /// Union of an iterator of boxes, `None` if empty.
    pub fn union_all<'a, I: IntoIterator<Item = &'a AABB>>(boxes: I) -> Option<AABB> {
        let mut accumulator = None;
        for aabb in boxes {
            Self::merge_into(&mut accumulator, aabb);
        }
        accumulator
    }

    /// Transform this local-space AABB by a matrix, returning a new AABB.
    ///
    /// Uses the Arvo method: projects each matrix axis onto the AABB extents
    /// for an exact (tight) result without transforming all 8 corners.
    pub fn transformed(&self, matrix: &Mat4) -> AABB {
        let translation = matrix.col(3).truncate();
        let mut new_min = translation;
        let mut new_max = translation;

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let a = axis * self.min[i];
            let b = axis * self.max[i];
            new_min += a.min(b);
            new_max += a.max(b);
        }

        AABB { min: new_min, max: new_max }
    }

    /// Test if this AABB fully contains another AABB.
    ///
    /// Boundaries are inclusive: a box contains itself.
    pub fn contains(&self, other: &AABB) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// Test if a point lies inside or on this box.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && self.max.cmpge(point).all()
    }

    /// Test if this AABB intersects (overlaps or touches) another AABB.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    /// Whether this box reaches any face of `outer`.
    ///
    /// When a box that does not touch any face is removed from an aggregate,
    /// the aggregate keeps the same extents and needs no recalculation.
    pub fn touches_boundary_of(&self, outer: &AABB) -> bool {
        self.min.cmple(outer.min).any() || self.max.cmpge(outer.max).any()
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
