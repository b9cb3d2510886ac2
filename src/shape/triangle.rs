//! Definition of the triangle cell.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::query::Segment;
use crate::shape::{CellProjection, CellSegmentHit, LocatableCell};

/// A triangular surface cell.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    /// The triangle first point.
    pub a: Point<Real>,
    /// The triangle second point.
    pub b: Point<Real>,
    /// The triangle third point.
    pub c: Point<Real>,
}

impl Triangle {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Triangle {
        Triangle { a, b, c }
    }

    /// The normal of this triangle, not normalized.
    #[inline]
    pub fn scaled_normal(&self) -> Vector<Real> {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    /// Computes the point of this triangle closest to `pt`, together with its
    /// barycentric coordinates.
    ///
    /// Classifies `pt` against the Voronoï regions of the vertices, then of
    /// the edges, then falls back to the face.
    pub fn closest_point(&self, pt: &Point<Real>) -> (Point<Real>, [Real; 3]) {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = pt - self.a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return (self.a, [1.0, 0.0, 0.0]);
        }

        let bp = pt - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return (self.b, [0.0, 1.0, 0.0]);
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            // Voronoï region of AB.
            let v = d1 / (d1 - d3);
            return (self.a + ab * v, [1.0 - v, v, 0.0]);
        }

        let cp = pt - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return (self.c, [0.0, 0.0, 1.0]);
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            // Voronoï region of AC.
            let w = d2 / (d2 - d6);
            return (self.a + ac * w, [1.0 - w, 0.0, w]);
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            // Voronoï region of BC.
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return (self.b + (self.c - self.b) * w, [0.0, 1.0 - w, w]);
        }

        let sum = va + vb + vc;
        if sum == 0.0 {
            // Degenerate triangle, all three vertices are aligned.
            return self.closest_vertex(pt);
        }

        let denom = 1.0 / sum;
        let v = vb * denom;
        let w = vc * denom;
        (self.a + ab * v + ac * w, [1.0 - v - w, v, w])
    }

    fn closest_vertex(&self, pt: &Point<Real>) -> (Point<Real>, [Real; 3]) {
        let dists = [
            na::distance_squared(pt, &self.a),
            na::distance_squared(pt, &self.b),
            na::distance_squared(pt, &self.c),
        ];
        let mut best = 0;
        for i in 1..3 {
            if dists[i] < dists[best] {
                best = i;
            }
        }
        let mut bcoords = [0.0; 3];
        bcoords[best] = 1.0;
        ([self.a, self.b, self.c][best], bcoords)
    }

    /// Computes the intersection parameter of `segment` with this triangle.
    ///
    /// Returns the segment parameter and the barycentric coordinates of the
    /// intersection point.
    pub fn segment_intersection(&self, segment: &Segment) -> Option<(Real, [Real; 3])> {
        let dir = segment.scaled_direction();
        let ab = self.b - self.a;
        let ac = self.c - self.a;

        let n = ab.cross(&ac);
        let d = n.dot(&dir);

        // The normal and the segment direction are orthogonal.
        if d == 0.0 {
            return None;
        }

        let ap = segment.a - self.a;
        let t = ap.dot(&n);

        // The segment points away from the triangle plane.
        if (t < 0.0 && d < 0.0) || (t > 0.0 && d > 0.0) {
            return None;
        }

        let abs_d = d.abs();
        let e = -dir.cross(&ap);

        let (v, w) = if t < 0.0 {
            (-ac.dot(&e), ab.dot(&e))
        } else {
            (ac.dot(&e), -ab.dot(&e))
        };

        if v < 0.0 || v > abs_d || w < 0.0 || v + w > abs_d {
            return None;
        }

        let inv_d = 1.0 / abs_d;
        let toi = t.abs() * inv_d;

        if toi > 1.0 {
            return None;
        }

        let v = v * inv_d;
        let w = w * inv_d;
        Some((toi, [1.0 - v - w, v, w]))
    }
}

impl LocatableCell for Triangle {
    #[inline]
    fn aabb(&self) -> Aabb {
        Aabb::from_points([self.a, self.b, self.c])
    }

    #[inline]
    fn num_points(&self) -> usize {
        3
    }

    fn evaluate_position(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
        weights: &mut [Real],
    ) -> CellProjection {
        let (proj, bcoords) = self.closest_point(pt);
        weights[..3].copy_from_slice(&bcoords);
        let dist2 = na::distance_squared(pt, &proj);
        CellProjection::new(dist2 <= tolerance * tolerance, proj, dist2)
    }

    #[inline]
    fn project_point(&self, pt: &Point<Real>) -> CellProjection {
        let (proj, _) = self.closest_point(pt);
        let dist2 = na::distance_squared(pt, &proj);
        CellProjection::new(dist2 == 0.0, proj, dist2)
    }

    #[inline]
    fn intersect_with_segment(
        &self,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<CellSegmentHit> {
        if let Some((t, bcoords)) = self.segment_intersection(segment) {
            let point = Point::from(
                self.a.coords * bcoords[0]
                    + self.b.coords * bcoords[1]
                    + self.c.coords * bcoords[2],
            );
            return Some(CellSegmentHit::new(t, point));
        }

        if tolerance <= 0.0 {
            return None;
        }

        // Accept a crossing of the triangle plane close enough to the triangle.
        let n = self.scaled_normal();
        let d = n.dot(&segment.scaled_direction());
        if d == 0.0 {
            return None;
        }

        let t = (self.a - segment.a).dot(&n) / d;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }

        let pt = segment.point_at(t);
        let (proj, _) = self.closest_point(&pt);
        if na::distance_squared(&pt, &proj) <= tolerance * tolerance {
            Some(CellSegmentHit::new(t, proj))
        } else {
            None
        }
    }
}
