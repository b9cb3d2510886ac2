//! Definition of the tetrahedron cell.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, DEFAULT_EPSILON};
use crate::query::Segment;
use crate::shape::{CellProjection, CellSegmentHit, LocatableCell, Triangle};
use na::Matrix3;

/// A tetrahedral volume cell with 4 vertices.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tetrahedron {
    /// The tetrahedron first point.
    pub a: Point<Real>,
    /// The tetrahedron second point.
    pub b: Point<Real>,
    /// The tetrahedron third point.
    pub c: Point<Real>,
    /// The tetrahedron fourth point.
    pub d: Point<Real>,
}

impl Tetrahedron {
    /// Creates a tetrahedron from four points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>, d: Point<Real>) -> Tetrahedron {
        Tetrahedron { a, b, c, d }
    }

    /// The four triangular faces of this tetrahedron.
    ///
    /// The faces are ABC, ABD, ACD and BDC.
    #[inline]
    pub fn faces(&self) -> [Triangle; 4] {
        [
            Triangle::new(self.a, self.b, self.c),
            Triangle::new(self.a, self.b, self.d),
            Triangle::new(self.a, self.c, self.d),
            Triangle::new(self.b, self.d, self.c),
        ]
    }

    /// The signed volume of this tetrahedron.
    #[inline]
    pub fn signed_volume(&self) -> Real {
        let p1 = self.b - self.a;
        let p2 = self.c - self.a;
        let p3 = self.d - self.a;
        p1.dot(&p2.cross(&p3)) / 6.0
    }

    /// Computes the barycentric coordinates of `pt` with respect to this
    /// tetrahedron.
    ///
    /// Returns `None` if the tetrahedron is flat.
    pub fn barycentric_coordinates(&self, pt: &Point<Real>) -> Option<[Real; 4]> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let e3 = self.d - self.a;

        let mat = Matrix3::from_columns(&[e1, e2, e3]);
        let scale = e1.norm() * e2.norm() * e3.norm();
        if abs_diff_eq!(mat.determinant(), 0.0, epsilon = DEFAULT_EPSILON * scale) {
            return None;
        }

        let inv = mat.try_inverse()?;
        let coords = inv * (pt - self.a);
        Some([
            1.0 - coords.x - coords.y - coords.z,
            coords.x,
            coords.y,
            coords.z,
        ])
    }

    /// Is `pt` inside this tetrahedron (boundary included)?
    #[inline]
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        self.barycentric_coordinates(pt)
            .map(|bcoords| bcoords.iter().all(|w| *w >= 0.0))
            .unwrap_or(false)
    }

    /// The point of the boundary of this tetrahedron closest to `pt`.
    fn closest_boundary_point(&self, pt: &Point<Real>) -> (Point<Real>, Real) {
        let mut best = (self.a, Real::MAX);

        for face in self.faces() {
            let (proj, _) = face.closest_point(pt);
            let dist2 = na::distance_squared(pt, &proj);
            if dist2 < best.1 {
                best = (proj, dist2);
            }
        }

        best
    }
}

impl LocatableCell for Tetrahedron {
    #[inline]
    fn aabb(&self) -> Aabb {
        Aabb::from_points([self.a, self.b, self.c, self.d])
    }

    #[inline]
    fn num_points(&self) -> usize {
        4
    }

    fn evaluate_position(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
        weights: &mut [Real],
    ) -> CellProjection {
        if let Some(bcoords) = self.barycentric_coordinates(pt) {
            if bcoords.iter().all(|w| *w >= 0.0) {
                weights[..4].copy_from_slice(&bcoords);
                return CellProjection::new(true, *pt, 0.0);
            }
        }

        let (proj, dist2) = self.closest_boundary_point(pt);
        let bcoords = self
            .barycentric_coordinates(&proj)
            .unwrap_or([0.25; 4]);
        weights[..4].copy_from_slice(&bcoords);
        CellProjection::new(dist2 <= tolerance * tolerance, proj, dist2)
    }

    fn project_point(&self, pt: &Point<Real>) -> CellProjection {
        if self.contains_point(pt) {
            return CellProjection::new(true, *pt, 0.0);
        }

        let (proj, dist2) = self.closest_boundary_point(pt);
        CellProjection::new(false, proj, dist2)
    }

    fn intersect_with_segment(
        &self,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<CellSegmentHit> {
        if self.contains_point(&segment.a) {
            return Some(CellSegmentHit::new(0.0, segment.a));
        }

        let mut best: Option<CellSegmentHit> = None;

        for face in self.faces() {
            if let Some(hit) = face.intersect_with_segment(segment, tolerance) {
                if best.map(|b| hit.t < b.t).unwrap_or(true) {
                    best = Some(hit);
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod test {
    use super::Tetrahedron;
    use crate::math::{Point, Real};
    use crate::query::Segment;
    use crate::shape::LocatableCell;

    fn unit_tetrahedron() -> Tetrahedron {
        Tetrahedron::new(
            Point::origin(),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        )
    }

    #[test]
    fn barycentric_evaluation() {
        let tetra = unit_tetrahedron();
        let mut weights = [0.0; 4];
        let proj = tetra.evaluate_position(&Point::new(0.1, 0.2, 0.3), 0.0, &mut weights);
        assert!(proj.inside);
        assert_eq!(proj.dist2, 0.0);
        assert_relative_eq!(weights[0], 0.4, epsilon = 1.0e-5);
        assert_relative_eq!(weights[3], 0.3, epsilon = 1.0e-5);

        let proj = tetra.evaluate_position(&Point::new(-0.5, 0.2, 0.3), 0.0, &mut weights);
        assert!(!proj.inside);
        assert_relative_eq!(proj.dist2, 0.25 as Real, epsilon = 1.0e-5);
        assert_relative_eq!(proj.point, Point::new(0.0, 0.2, 0.3), epsilon = 1.0e-5);
    }

    #[test]
    fn flat_tetrahedron_has_no_interior() {
        let flat = Tetrahedron::new(
            Point::origin(),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        );
        assert!(flat.barycentric_coordinates(&Point::origin()).is_none());
        assert!(!flat.contains_point(&Point::new(0.2, 0.2, 0.0)));
    }

    #[test]
    fn solid_segment_intersection() {
        let tetra = unit_tetrahedron();

        let inside_start = Segment::new(Point::new(0.1, 0.1, 0.1), Point::new(2.0, 2.0, 2.0));
        let hit = tetra.intersect_with_segment(&inside_start, 0.0).unwrap();
        assert_eq!(hit.t, 0.0);

        let crossing = Segment::new(Point::new(0.2, 0.2, -1.0), Point::new(0.2, 0.2, 1.0));
        let hit = tetra.intersect_with_segment(&crossing, 0.0).unwrap();
        assert_relative_eq!(hit.t, 0.5 as Real, epsilon = 1.0e-5);
        assert_relative_eq!(hit.point, Point::new(0.2, 0.2, 0.0), epsilon = 1.0e-5);

        let miss = Segment::new(Point::new(2.0, 2.0, -1.0), Point::new(2.0, 2.0, 1.0));
        assert!(tetra.intersect_with_segment(&miss, 0.0).is_none());
    }
}
