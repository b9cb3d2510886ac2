//! Definition of the voxel cell.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DIM};
use crate::query::Segment;
use crate::shape::{CellProjection, CellSegmentHit, LocatableCell};

/// An axis-aligned hexahedral volume cell.
///
/// Its eight points are ordered with `x` varying fastest, then `y`, then `z`,
/// so point `i` sits at the corner selected by the bits `(i & 1, i & 2, i & 4)`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(C)]
pub struct Voxel {
    /// The corner with the smallest coordinates.
    pub mins: Point<Real>,
    /// The corner with the largest coordinates.
    pub maxs: Point<Real>,
}

impl Voxel {
    /// Creates a voxel from its two extreme corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Self {
        Voxel { mins, maxs }
    }

    /// The `i`-th corner of this voxel.
    #[inline]
    pub fn corner(&self, i: usize) -> Point<Real> {
        Point::new(
            if i & 1 == 0 { self.mins.x } else { self.maxs.x },
            if i & 2 == 0 { self.mins.y } else { self.maxs.y },
            if i & 4 == 0 { self.mins.z } else { self.maxs.z },
        )
    }

    /// The trilinear interpolation weights of `pt`, which must be inside the voxel.
    fn trilinear_weights(&self, pt: &Point<Real>, weights: &mut [Real]) {
        let extents = self.maxs - self.mins;
        let mut r = [0.0; DIM];

        for k in 0..DIM {
            r[k] = if extents[k] > 0.0 {
                (pt[k] - self.mins[k]) / extents[k]
            } else {
                0.0
            };
        }

        for (i, w) in weights[..8].iter_mut().enumerate() {
            let wx = if i & 1 == 0 { 1.0 - r[0] } else { r[0] };
            let wy = if i & 2 == 0 { 1.0 - r[1] } else { r[1] };
            let wz = if i & 4 == 0 { 1.0 - r[2] } else { r[2] };
            *w = wx * wy * wz;
        }
    }
}

impl LocatableCell for Voxel {
    #[inline]
    fn aabb(&self) -> Aabb {
        Aabb::new(self.mins, self.maxs)
    }

    #[inline]
    fn num_points(&self) -> usize {
        8
    }

    fn evaluate_position(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
        weights: &mut [Real],
    ) -> CellProjection {
        let aabb = self.aabb();
        let proj = aabb.clamp_local_point(pt);
        let dist2 = na::distance_squared(pt, &proj);
        self.trilinear_weights(&proj, weights);
        CellProjection::new(dist2 <= tolerance * tolerance, proj, dist2)
    }

    #[inline]
    fn project_point(&self, pt: &Point<Real>) -> CellProjection {
        let aabb = self.aabb();
        let proj = aabb.clamp_local_point(pt);
        let dist2 = na::distance_squared(pt, &proj);
        CellProjection::new(dist2 == 0.0, proj, dist2)
    }

    #[inline]
    fn intersect_with_segment(
        &self,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<CellSegmentHit> {
        let aabb = if tolerance > 0.0 {
            self.aabb().loosened(tolerance)
        } else {
            self.aabb()
        };
        let (t_enter, _) = aabb.clip_segment(segment)?;
        Some(CellSegmentHit::new(t_enter, segment.point_at(t_enter)))
    }
}

#[cfg(test)]
mod test {
    use super::Voxel;
    use crate::math::{Point, Real};
    use crate::query::Segment;
    use crate::shape::LocatableCell;

    #[test]
    fn trilinear_weights_partition_unity() {
        let voxel = Voxel::new(Point::origin(), Point::new(2.0, 2.0, 2.0));
        let mut weights = [0.0; 8];
        let proj = voxel.evaluate_position(&Point::new(0.5, 1.0, 1.5), 0.0, &mut weights);
        assert!(proj.inside);
        assert_relative_eq!(weights.iter().sum::<Real>(), 1.0, epsilon = 1.0e-5);

        let proj = voxel.evaluate_position(&Point::new(3.0, 1.0, 1.0), 0.5, &mut weights);
        assert!(!proj.inside);
        assert_eq!(proj.point, Point::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn corners() {
        let voxel = Voxel::new(Point::origin(), Point::new(1.0, 2.0, 3.0));
        assert_eq!(voxel.corner(0), Point::origin());
        assert_eq!(voxel.corner(3), Point::new(1.0, 2.0, 0.0));
        assert_eq!(voxel.corner(7), Point::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn segment_entry() {
        let voxel = Voxel::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        let seg = Segment::new(Point::new(-1.0, 0.5, 0.5), Point::new(1.0, 0.5, 0.5));
        let hit = voxel.intersect_with_segment(&seg, 0.0).unwrap();
        assert_relative_eq!(hit.t, 0.5);
        assert_relative_eq!(hit.point, Point::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn segment_entry_with_tolerance() {
        let voxel = Voxel::new(Point::origin(), Point::new(1.0, 1.0, 1.0));
        let above = Segment::new(Point::new(-1.0, 1.01, 0.5), Point::new(1.0, 1.01, 0.5));
        assert!(voxel.intersect_with_segment(&above, 0.0).is_none());
        assert!(voxel.intersect_with_segment(&above, 0.001).is_none());

        let hit = voxel.intersect_with_segment(&above, 0.1).unwrap();
        assert_relative_eq!(hit.t, 0.45 as Real, epsilon = 1.0e-6);
        assert_relative_eq!(hit.point, Point::new(-0.1, 1.01, 0.5), epsilon = 1.0e-6);
    }
}
