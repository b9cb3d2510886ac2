use crate::math::{Point, Real, Vector};

/// A finite line segment from `a` to `b`, parametrized by `t ∈ [0, 1]`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Segment {
    /// The first endpoint, at `t = 0`.
    pub a: Point<Real>,
    /// The second endpoint, at `t = 1`.
    pub b: Point<Real>,
}

impl Segment {
    /// Creates a new segment from its two endpoints.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>) -> Self {
        Segment { a, b }
    }

    /// The vector `b - a`, not normalized.
    #[inline]
    pub fn scaled_direction(&self) -> Vector<Real> {
        self.b - self.a
    }

    /// The length of this segment.
    #[inline]
    pub fn length(&self) -> Real {
        self.scaled_direction().norm()
    }

    /// The point `a + (b - a) * t`.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.a + self.scaled_direction() * t
    }
}
