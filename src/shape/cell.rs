//! The exact cell evaluation interface consumed by the locator.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::query::Segment;
use crate::shape::{Tetrahedron, Triangle, Voxel};

/// The result of projecting a point on a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellProjection {
    /// Whether the point is inside the cell.
    ///
    /// For volumetric cells this is the solid inclusion test; surface cells
    /// only report `true` for points lying on them.
    pub inside: bool,
    /// The point of the cell closest to the query point.
    pub point: Point<Real>,
    /// The squared distance between the query point and `self.point`.
    pub dist2: Real,
}

impl CellProjection {
    /// Initializes a new `CellProjection`.
    #[inline]
    pub fn new(inside: bool, point: Point<Real>, dist2: Real) -> Self {
        CellProjection {
            inside,
            point,
            dist2,
        }
    }
}

/// An intersection between a segment and a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellSegmentHit {
    /// The segment parameter of the hit, in `[0, 1]`.
    pub t: Real,
    /// The intersection point.
    pub point: Point<Real>,
}

impl CellSegmentHit {
    /// Initializes a new `CellSegmentHit`.
    #[inline]
    pub fn new(t: Real, point: Point<Real>) -> Self {
        CellSegmentHit { t, point }
    }
}

/// Exact geometric routines of a mesh cell.
///
/// These are the operations the locator delegates to once a cell survived
/// the bounding-box culling. All of them are pure and may be called from
/// several threads at once.
pub trait LocatableCell {
    /// The axis-aligned bounding box of this cell.
    fn aabb(&self) -> Aabb;

    /// The number of points defining this cell.
    ///
    /// This is also the number of interpolation weights written by
    /// [`LocatableCell::evaluate_position`].
    fn num_points(&self) -> usize;

    /// Tests whether `pt` is inside this cell, with the given absolute
    /// tolerance, and computes the interpolation weights of the closest
    /// point of the cell.
    ///
    /// `weights` must hold at least [`LocatableCell::num_points`] values.
    fn evaluate_position(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
        weights: &mut [Real],
    ) -> CellProjection;

    /// Projects `pt` on this cell.
    ///
    /// Points inside a volumetric cell project on themselves with `inside`
    /// set and a zero distance.
    fn project_point(&self, pt: &Point<Real>) -> CellProjection;

    /// Computes the first intersection between `segment` and this cell.
    ///
    /// Volumetric cells are treated as solid: a segment starting inside the
    /// cell hits it at `t = 0`.
    ///
    /// A positive `tolerance` also accepts segments passing within
    /// `tolerance` of the cell: voxels are loosened by `tolerance`, and a
    /// triangle is hit where the segment crosses its plane at most
    /// `tolerance` away from it.
    fn intersect_with_segment(&self, segment: &Segment, tolerance: Real)
        -> Option<CellSegmentHit>;
}

/// A cell of an [`UnstructuredMesh`](crate::mesh::UnstructuredMesh).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MeshCell {
    /// A triangular surface cell.
    Triangle(Triangle),
    /// A tetrahedral volume cell.
    Tetrahedron(Tetrahedron),
    /// An axis-aligned hexahedral volume cell.
    Voxel(Voxel),
}

impl LocatableCell for MeshCell {
    #[inline]
    fn aabb(&self) -> Aabb {
        match self {
            MeshCell::Triangle(s) => s.aabb(),
            MeshCell::Tetrahedron(s) => s.aabb(),
            MeshCell::Voxel(s) => s.aabb(),
        }
    }

    #[inline]
    fn num_points(&self) -> usize {
        match self {
            MeshCell::Triangle(s) => s.num_points(),
            MeshCell::Tetrahedron(s) => s.num_points(),
            MeshCell::Voxel(s) => s.num_points(),
        }
    }

    #[inline]
    fn evaluate_position(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
        weights: &mut [Real],
    ) -> CellProjection {
        match self {
            MeshCell::Triangle(s) => s.evaluate_position(pt, tolerance, weights),
            MeshCell::Tetrahedron(s) => s.evaluate_position(pt, tolerance, weights),
            MeshCell::Voxel(s) => s.evaluate_position(pt, tolerance, weights),
        }
    }

    #[inline]
    fn project_point(&self, pt: &Point<Real>) -> CellProjection {
        match self {
            MeshCell::Triangle(s) => s.project_point(pt),
            MeshCell::Tetrahedron(s) => s.project_point(pt),
            MeshCell::Voxel(s) => s.project_point(pt),
        }
    }

    #[inline]
    fn intersect_with_segment(
        &self,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<CellSegmentHit> {
        match self {
            MeshCell::Triangle(s) => s.intersect_with_segment(segment, tolerance),
            MeshCell::Tetrahedron(s) => s.intersect_with_segment(segment, tolerance),
            MeshCell::Voxel(s) => s.intersect_with_segment(segment, tolerance),
        }
    }
}
