//! Axis Aligned Bounding Box.

use crate::math::{Point, Real, Vector, DIM, TWO_DIM};
use crate::query::Segment;
use num::{Bounded, Zero};

/// An Axis-Aligned Bounding Box (AABB).
///
/// The locator caches one `Aabb` per mesh cell and uses them as a cheap
/// rejection test before any exact cell evaluation.
///
/// - **mins**: The point with the smallest coordinates on each axis.
/// - **maxs**: The point with the largest coordinates on each axis.
/// - **Invariant**: `mins.x ≤ maxs.x`, `mins.y ≤ maxs.y`, `mins.z ≤ maxs.z`
///   (except for the result of [`Aabb::new_invalid`]).
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use cellgrid3d::bounding_volume::Aabb;
/// use nalgebra::Point3;
///
/// let aabb = Aabb::new(Point3::new(-0.5, -0.5, -0.5), Point3::new(0.5, 0.5, 0.5));
/// assert!(aabb.contains_local_point(&Point3::origin()));
/// assert_eq!(aabb.extents().x, 1.0);
/// # }
/// ```
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Aabb {
    /// The point with minimum coordinates.
    pub mins: Point<Real>,
    /// The point with maximum coordinates.
    pub maxs: Point<Real>,
}

impl Aabb {
    /// Creates a new AABB from its minimum and maximum corners.
    #[inline]
    pub fn new(mins: Point<Real>, maxs: Point<Real>) -> Aabb {
        Aabb { mins, maxs }
    }

    /// Creates an invalid AABB with inverted bounds.
    ///
    /// Useful as the initial value of a sequence of merges.
    #[inline]
    pub fn new_invalid() -> Self {
        Self::new(
            Vector::repeat(Real::max_value()).into(),
            Vector::repeat(-Real::max_value()).into(),
        )
    }

    /// Creates a new AABB from its center and half-extents.
    #[inline]
    pub fn from_half_extents(center: Point<Real>, half_extents: Vector<Real>) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Creates the smallest AABB enclosing all the given points.
    pub fn from_points<I>(pts: I) -> Self
    where
        I: IntoIterator<Item = Point<Real>>,
    {
        let mut result = Self::new_invalid();

        for pt in pts {
            result.take_point(pt);
        }

        result
    }

    /// Creates an AABB from a flat `[xmin, xmax, ymin, ymax, zmin, zmax]` array.
    #[inline]
    pub fn from_bounds(bounds: [Real; TWO_DIM]) -> Self {
        Self::new(
            Point::new(bounds[0], bounds[2], bounds[4]),
            Point::new(bounds[1], bounds[3], bounds[5]),
        )
    }

    /// Flattens this AABB into `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    #[inline]
    pub fn to_bounds(&self) -> [Real; TWO_DIM] {
        [
            self.mins.x,
            self.maxs.x,
            self.mins.y,
            self.maxs.y,
            self.mins.z,
            self.maxs.z,
        ]
    }

    /// Returns `true` if `mins <= maxs` along every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..DIM).all(|i| self.mins[i] <= self.maxs[i])
    }

    /// The center of this AABB.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        na::center(&self.mins, &self.maxs)
    }

    /// The half extents of this AABB.
    #[inline]
    pub fn half_extents(&self) -> Vector<Real> {
        let half: Real = na::convert::<f64, Real>(0.5);
        (self.maxs - self.mins) * half
    }

    /// The extents of this AABB.
    #[inline]
    pub fn extents(&self) -> Vector<Real> {
        self.maxs - self.mins
    }

    /// The length of the diagonal of this AABB.
    #[inline]
    pub fn diagonal_length(&self) -> Real {
        self.extents().norm()
    }

    /// The volume of this AABB.
    #[inline]
    pub fn volume(&self) -> Real {
        let extents = self.extents();
        extents.x * extents.y * extents.z
    }

    /// Enlarges this AABB so it also contains the point `pt`.
    #[inline]
    pub fn take_point(&mut self, pt: Point<Real>) {
        self.mins = self.mins.coords.inf(&pt.coords).into();
        self.maxs = self.maxs.coords.sup(&pt.coords).into();
    }

    /// Enlarges this AABB so it also contains `other`.
    #[inline]
    pub fn merge(&mut self, other: &Aabb) {
        self.mins = self.mins.inf(&other.mins);
        self.maxs = self.maxs.sup(&other.maxs);
    }

    /// The smallest AABB containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            mins: self.mins.inf(&other.mins),
            maxs: self.maxs.sup(&other.maxs),
        }
    }

    /// This AABB enlarged by `amount` along every axis, on both sides.
    #[inline]
    pub fn loosened(&self, amount: Real) -> Aabb {
        assert!(amount >= 0.0, "The loosening margin must be positive.");
        Aabb {
            mins: self.mins + Vector::repeat(-amount),
            maxs: self.maxs + Vector::repeat(amount),
        }
    }

    /// Does this AABB intersect `other`? Touching boxes intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        na::partial_le(&self.mins, &other.maxs) && na::partial_ge(&self.maxs, &other.mins)
    }

    /// Does this AABB contain the point `pt`? Points on the boundary are inside.
    #[inline]
    pub fn contains_local_point(&self, pt: &Point<Real>) -> bool {
        (0..DIM).all(|i| pt[i] >= self.mins[i] && pt[i] <= self.maxs[i])
    }

    /// Does this AABB, enlarged by `tolerance`, contain the point `pt`?
    #[inline]
    pub fn contains_local_point_with_tolerance(&self, pt: &Point<Real>, tolerance: Real) -> bool {
        (0..DIM).all(|i| pt[i] >= self.mins[i] - tolerance && pt[i] <= self.maxs[i] + tolerance)
    }

    /// The point of this AABB closest to `pt` (`pt` itself if it is inside).
    #[inline]
    pub fn clamp_local_point(&self, pt: &Point<Real>) -> Point<Real> {
        pt.coords.sup(&self.mins.coords).inf(&self.maxs.coords).into()
    }

    /// The squared distance between `pt` and this AABB, zero if `pt` is inside.
    #[inline]
    pub fn distance_squared_to_local_point(&self, pt: &Point<Real>) -> Real {
        let mins_pt = self.mins - pt;
        let pt_maxs = pt - self.maxs;
        let shift = mins_pt.sup(&pt_maxs).sup(&Vector::zeros());
        shift.norm_squared()
    }

    /// Does the plane passing through `origin` with the unit normal `normal`
    /// cross this AABB, enlarged by `tolerance`?
    ///
    /// The AABB's projected radius along the normal is compared against the
    /// signed distance of its center to the plane.
    #[inline]
    pub fn intersects_plane(
        &self,
        origin: &Point<Real>,
        normal: &Vector<Real>,
        tolerance: Real,
    ) -> bool {
        let half_extents = self.half_extents();
        let radius = half_extents.dot(&normal.abs());
        let center_dist = (self.center() - origin).dot(normal);
        center_dist.abs() <= radius + tolerance
    }

    /// Clips the segment against this AABB.
    ///
    /// Returns the parameters `(t_enter, t_exit)`, both in `[0, 1]`, of the part
    /// of the segment inside the box, or `None` if they do not overlap.
    pub fn clip_segment(&self, segment: &Segment) -> Option<(Real, Real)> {
        let dir = segment.scaled_direction();
        let mut tmin: Real = 0.0;
        let mut tmax: Real = 1.0;

        for i in 0usize..DIM {
            if dir[i].is_zero() {
                if segment.a[i] < self.mins[i] || segment.a[i] > self.maxs[i] {
                    return None;
                }
            } else {
                let denom = 1.0 / dir[i];
                let mut near = (self.mins[i] - segment.a[i]) * denom;
                let mut far = (self.maxs[i] - segment.a[i]) * denom;

                if near > far {
                    core::mem::swap(&mut near, &mut far);
                }

                tmin = tmin.max(near);
                tmax = tmax.min(far);

                if tmin > tmax {
                    return None;
                }
            }
        }

        Some((tmin, tmax))
    }

    /// Does the segment touch this AABB enlarged by `tolerance`?
    #[inline]
    pub fn intersects_segment(&self, segment: &Segment, tolerance: Real) -> bool {
        if tolerance > 0.0 {
            self.loosened(tolerance).clip_segment(segment).is_some()
        } else {
            self.clip_segment(segment).is_some()
        }
    }
}
