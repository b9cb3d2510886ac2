use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DIM};
use arrayvec::ArrayVec;

/// The uniform grid of bins covering the bounds of a mesh.
///
/// A bin is identified either by its integer coordinates `(i, j, k)` or by
/// its id `i + j * divisions[0] + k * divisions[0] * divisions[1]`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BinGrid {
    aabb: Aabb,
    divisions: [usize; DIM],
    h: Vector<Real>,
    inv_h: Vector<Real>,
}

impl BinGrid {
    /// Creates a grid with the given number of divisions along each axis.
    ///
    /// Divisions are clamped to at least one, and flat or empty bounds are
    /// inflated so that every bin has a non-zero volume.
    pub fn new(aabb: Aabb, divisions: [usize; DIM]) -> Self {
        let aabb = inflate_degenerate(&aabb);
        let divisions = divisions.map(|d| d.max(1));
        Self::with_inflated_bounds(aabb, divisions)
    }

    /// Creates a grid with at most `target_bins` bins, with divisions
    /// proportional to the lengths of the sides of `aabb`.
    ///
    /// Axes along which `aabb` is flat get a single division.
    pub fn automatic(aabb: Aabb, target_bins: usize) -> Self {
        let divisions = compute_divisions(&aabb, target_bins);
        Self::with_inflated_bounds(inflate_degenerate(&aabb), divisions)
    }

    fn with_inflated_bounds(aabb: Aabb, divisions: [usize; DIM]) -> Self {
        let extents = aabb.extents();
        let h = Vector::from_fn(|i, _| extents[i] / divisions[i] as Real);
        let inv_h = h.map(|e| 1.0 / e);

        BinGrid {
            aabb,
            divisions,
            h,
            inv_h,
        }
    }

    /// The bounds covered by this grid.
    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The bounds covered by this grid as `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    #[inline]
    pub fn bounds(&self) -> [Real; 6] {
        self.aabb.to_bounds()
    }

    /// The number of bins along each axis.
    #[inline]
    pub fn divisions(&self) -> [usize; DIM] {
        self.divisions
    }

    /// The size of a bin along each axis.
    #[inline]
    pub fn bin_size(&self) -> Vector<Real> {
        self.h
    }

    /// The total number of bins.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.divisions[0] * self.divisions[1] * self.divisions[2]
    }

    /// The id of the bin at the integer coordinates `ijk`.
    #[inline]
    pub fn bin_id(&self, ijk: [usize; DIM]) -> usize {
        ijk[0] + ijk[1] * self.divisions[0] + ijk[2] * self.divisions[0] * self.divisions[1]
    }

    /// The integer coordinates of the bin `bin_id`.
    #[inline]
    pub fn bin_ijk(&self, bin_id: usize) -> [usize; DIM] {
        let slice = self.divisions[0] * self.divisions[1];
        let k = bin_id / slice;
        let rem = bin_id % slice;
        [rem % self.divisions[0], rem / self.divisions[0], k]
    }

    /// The integer coordinates of the bin containing `pt`.
    ///
    /// Points outside of the grid are clamped to the closest bin, and points
    /// on the upper faces of the grid belong to the last bins.
    #[inline]
    pub fn point_ijk(&self, pt: &Point<Real>) -> [usize; DIM] {
        let mut ijk = [0; DIM];

        for i in 0..DIM {
            let f = ((pt[i] - self.aabb.mins[i]) * self.inv_h[i]).floor();
            // NOTE: this is also false for NaN.
            let id = if f >= 0.0 { f as usize } else { 0 };
            ijk[i] = id.min(self.divisions[i] - 1);
        }

        ijk
    }

    /// The id of the bin containing `pt`, clamped like [`BinGrid::point_ijk`].
    #[inline]
    pub fn point_bin(&self, pt: &Point<Real>) -> usize {
        self.bin_id(self.point_ijk(pt))
    }

    /// The inclusive range of bin coordinates overlapped by `aabb`.
    ///
    /// The range is ordered even if `aabb` is inverted along some axis.
    #[inline]
    pub fn aabb_ijk_range(&self, aabb: &Aabb) -> ([usize; DIM], [usize; DIM]) {
        let a = self.point_ijk(&aabb.mins);
        let b = self.point_ijk(&aabb.maxs);
        (
            core::array::from_fn(|i| a[i].min(b[i])),
            core::array::from_fn(|i| a[i].max(b[i])),
        )
    }

    /// The number of bins in an inclusive range of bin coordinates.
    #[inline]
    pub fn range_len(min: [usize; DIM], max: [usize; DIM]) -> usize {
        (max[0] + 1 - min[0]) * (max[1] + 1 - min[1]) * (max[2] + 1 - min[2])
    }

    /// Calls `f` with the id of every bin of an inclusive range of bin coordinates.
    #[inline]
    pub fn for_each_bin_in_range(
        &self,
        min: [usize; DIM],
        max: [usize; DIM],
        mut f: impl FnMut(usize),
    ) {
        let slice = self.divisions[0] * self.divisions[1];

        for k in min[2]..=max[2] {
            for j in min[1]..=max[1] {
                let row = j * self.divisions[0] + k * slice;
                for i in min[0]..=max[0] {
                    f(row + i);
                }
            }
        }
    }

    /// The spatial bounds of the bin at the integer coordinates `ijk`.
    #[inline]
    pub fn ijk_aabb(&self, ijk: [usize; DIM]) -> Aabb {
        let mins = self.aabb.mins
            + Vector::new(
                ijk[0] as Real * self.h.x,
                ijk[1] as Real * self.h.y,
                ijk[2] as Real * self.h.z,
            );
        Aabb::new(mins, mins + self.h)
    }

    /// The spatial bounds of the bin `bin_id`.
    #[inline]
    pub fn bin_aabb(&self, bin_id: usize) -> Aabb {
        self.ijk_aabb(self.bin_ijk(bin_id))
    }

    /// The center of the bin `bin_id`.
    #[inline]
    pub fn bin_center(&self, bin_id: usize) -> Point<Real> {
        self.bin_aabb(bin_id).center()
    }

    /// The position of the lattice point at the integer coordinates `ijk`,
    /// where each coordinate lies in `0..=divisions[i]`.
    #[inline]
    pub fn lattice_point(&self, ijk: [usize; DIM]) -> Point<Real> {
        Point::new(
            self.aabb.mins.x + ijk[0] as Real * self.h.x,
            self.aabb.mins.y + ijk[1] as Real * self.h.y,
            self.aabb.mins.z + ijk[2] as Real * self.h.z,
        )
    }

    /// The ids of the (up to 26) bins sharing a face, an edge, or a corner
    /// with the bin `bin_id`.
    pub fn bin_neighbors(&self, bin_id: usize) -> ArrayVec<usize, 26> {
        let ijk = self.bin_ijk(bin_id);
        let mut result = ArrayVec::new();

        let range = |i: usize| {
            let lo = ijk[i].saturating_sub(1);
            let hi = (ijk[i] + 1).min(self.divisions[i] - 1);
            lo..=hi
        };

        for k in range(2) {
            for j in range(1) {
                for i in range(0) {
                    if [i, j, k] != ijk {
                        result.push(self.bin_id([i, j, k]));
                    }
                }
            }
        }

        result
    }
}

/// Inflates the flat sides of `aabb` so that it has a non-zero volume.
///
/// The inflation along a flat axis is a fraction of the largest side, or `0.5`
/// if the box is reduced to a single point.
pub(crate) fn inflate_degenerate(aabb: &Aabb) -> Aabb {
    let mut result = if aabb.is_valid() {
        *aabb
    } else {
        Aabb::new(Point::origin(), Point::origin())
    };
    let extents = result.extents();
    let max_len = extents.max();
    let delta = if max_len > 0.0 { max_len * 0.005 } else { 0.5 };

    for i in 0..DIM {
        if extents[i] <= 0.0 {
            result.mins[i] -= delta;
            result.maxs[i] += delta;
        }
    }

    result
}

/// Computes the grid divisions of `aabb` giving at most `target_bins` bins,
/// as close to cubic as the proportions of `aabb` allow.
pub(crate) fn compute_divisions(aabb: &Aabb, target_bins: usize) -> [usize; DIM] {
    let target_bins = target_bins.max(1) as f64;
    let extents = if aabb.is_valid() {
        aabb.extents()
    } else {
        Vector::zeros()
    };
    let max_len = extents.max() as f64;

    if max_len <= 0.0 {
        return [1; DIM];
    }

    let mut num_non_flat = 0;
    let mut f = target_bins;

    for i in 0..DIM {
        if extents[i] > 0.0 {
            num_non_flat += 1;
            f /= extents[i] as f64 / max_len;
        }
    }

    f = f.powf(1.0 / num_non_flat as f64);

    let mut divisions = [1; DIM];
    for i in 0..DIM {
        if extents[i] > 0.0 {
            // The epsilon absorbs the rounding error of `powf` on exact roots.
            let div = (extents[i] as f64 / max_len * f + 1.0e-9).floor();
            divisions[i] = if div >= 1.0 { div as usize } else { 1 };
        }
    }

    divisions
}

#[cfg(test)]
mod test {
    use super::{compute_divisions, BinGrid};
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Real};

    fn unit_grid(divisions: [usize; 3]) -> BinGrid {
        BinGrid::new(
            Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)),
            divisions,
        )
    }

    #[test]
    fn bin_ids_are_bijective() {
        let grid = unit_grid([3, 4, 5]);
        assert_eq!(grid.num_bins(), 60);

        for bin in 0..grid.num_bins() {
            assert_eq!(grid.bin_id(grid.bin_ijk(bin)), bin);
        }
        assert_eq!(grid.bin_id([1, 2, 3]), 1 + 2 * 3 + 3 * 12);
    }

    #[test]
    fn points_are_clamped() {
        let grid = unit_grid([4, 4, 4]);
        assert_eq!(grid.point_ijk(&Point::new(1.0, 1.0, 1.0)), [3, 3, 3]);
        assert_eq!(grid.point_ijk(&Point::new(-5.0, 0.3, 20.0)), [0, 1, 3]);
        assert_eq!(grid.point_ijk(&Point::new(Real::NAN, 0.0, 0.0)), [0, 0, 0]);
        assert_eq!(grid.point_ijk(&Point::new(0.25, 0.5, 0.74)), [1, 2, 2]);
    }

    #[test]
    fn inverted_box_ranges_are_ordered() {
        let grid = unit_grid([4, 4, 4]);
        let inverted = Aabb::new(Point::new(0.9, 0.1, 0.6), Point::new(0.1, 0.9, 0.3));
        let (min, max) = grid.aabb_ijk_range(&inverted);
        assert_eq!(min, [0, 0, 1]);
        assert_eq!(max, [3, 3, 2]);
        assert_eq!(BinGrid::range_len(min, max), 4 * 4 * 2);
    }

    #[test]
    fn divisions_are_clamped_and_degenerate_bounds_inflated() {
        let flat = BinGrid::new(
            Aabb::new(Point::origin(), Point::new(2.0, 1.0, 0.0)),
            [0, 2, 3],
        );
        assert_eq!(flat.divisions(), [1, 2, 3]);
        assert!(flat.aabb().extents().z > 0.0);
        assert!(flat.bin_size().iter().all(|h| *h > 0.0));

        let point = BinGrid::automatic(Aabb::new(Point::origin(), Point::origin()), 100);
        assert_eq!(point.divisions(), [1, 1, 1]);
        assert!(point.aabb().volume() > 0.0);
    }

    #[test]
    fn automatic_divisions_follow_proportions() {
        let aabb = Aabb::new(Point::origin(), Point::new(4.0, 2.0, 1.0));
        let divs = compute_divisions(&aabb, 1000);
        assert!(divs[0] * divs[1] * divs[2] <= 1000);
        assert!(divs[0] > divs[1] && divs[1] > divs[2]);

        let flat = Aabb::new(Point::origin(), Point::new(1.0, 1.0, 0.0));
        assert_eq!(compute_divisions(&flat, 100), [10, 10, 1]);
    }

    #[test]
    fn neighbors_stay_in_the_grid() {
        let grid = unit_grid([3, 3, 3]);
        assert_eq!(grid.bin_neighbors(grid.bin_id([1, 1, 1])).len(), 26);
        assert_eq!(grid.bin_neighbors(grid.bin_id([0, 0, 0])).len(), 7);
        assert_eq!(grid.bin_neighbors(grid.bin_id([2, 1, 0])).len(), 11);

        let single = unit_grid([1, 1, 1]);
        assert!(single.bin_neighbors(0).is_empty());
    }

    #[test]
    fn bin_bounds() {
        let grid = unit_grid([2, 4, 1]);
        let aabb = grid.bin_aabb(grid.bin_id([1, 3, 0]));
        assert_relative_eq!(aabb.mins, Point::new(0.5, 0.75, 0.0));
        assert_relative_eq!(aabb.maxs, Point::new(1.0, 1.0, 1.0));
    }
}
