use super::cell_index::CellProcessor;
use super::{BinGrid, LocatorId};
use crate::math::{Point, Real, DIM};
use crate::mesh::CellMesh;
use crate::query::Segment;
use crate::shape::LocatableCell;
use alloc::vec::Vec;
use ordered_float::OrderedFloat;

/// An intersection between a segment and a cell.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentHit {
    /// The parameter of the intersection along the segment, in `[0, 1]`.
    pub t: Real,
    /// The intersection point.
    pub point: Point<Real>,
    /// The id of the intersected cell.
    pub cell_id: usize,
}

/// A 3D-DDA walk through the bins crossed by a segment.
///
/// Bins are visited in the order the segment reaches them, starting with the
/// bin containing the entry point of the segment into the grid.
///
/// With a positive tolerance the grid is loosened by the tolerance, and the
/// parts of the segment outside of the grid walk the boundary bins closest
/// to them.
struct BinWalk {
    ijk: [isize; DIM],
    step: [isize; DIM],
    // Parameter at which the segment leaves the current bin along each axis.
    t_max: [Real; DIM],
    // Parameter increment to cross one bin along each axis.
    t_delta: [Real; DIM],
    divisions: [isize; DIM],
    // Parameter at which the walk ends.
    t_end: Real,
    loose: bool,
}

impl BinWalk {
    fn new(grid: &BinGrid, segment: &Segment, tolerance: Real) -> Option<Self> {
        let bounds = if tolerance > 0.0 {
            grid.aabb().loosened(tolerance)
        } else {
            *grid.aabb()
        };
        let (t_enter, t_leave) = bounds.clip_segment(segment)?;
        let entry = grid.point_ijk(&segment.point_at(t_enter));
        let dir = segment.scaled_direction();
        let h = grid.bin_size();
        let mins = grid.aabb().mins;

        let mut walk = BinWalk {
            ijk: entry.map(|i| i as isize),
            step: [0; DIM],
            t_max: [Real::INFINITY; DIM],
            t_delta: [Real::INFINITY; DIM],
            divisions: grid.divisions().map(|d| d as isize),
            t_end: if tolerance > 0.0 { t_leave } else { 1.0 },
            loose: tolerance > 0.0,
        };

        for i in 0..DIM {
            if dir[i] > 0.0 {
                let next_plane = mins[i] + (entry[i] + 1) as Real * h[i];
                walk.step[i] = 1;
                walk.t_max[i] = (next_plane - segment.a[i]) / dir[i];
                walk.t_delta[i] = h[i] / dir[i];
            } else if dir[i] < 0.0 {
                let next_plane = mins[i] + entry[i] as Real * h[i];
                walk.step[i] = -1;
                walk.t_max[i] = (next_plane - segment.a[i]) / dir[i];
                walk.t_delta[i] = -h[i] / dir[i];
            }
        }

        Some(walk)
    }

    fn bin_ijk(&self) -> [usize; DIM] {
        self.ijk.map(|i| i as usize)
    }

    /// The parameter at which the segment leaves the current bin.
    fn t_exit(&self) -> Real {
        self.t_max[0].min(self.t_max[1]).min(self.t_max[2])
    }

    /// Moves to the next bin, returning `false` if the segment ends in the
    /// current bin or leaves the grid.
    fn advance(&mut self) -> bool {
        loop {
            let mut axis = 0;
            for i in 1..DIM {
                if self.t_max[i] < self.t_max[axis] {
                    axis = i;
                }
            }

            if self.t_max[axis] > self.t_end {
                return false;
            }

            self.ijk[axis] += self.step[axis];
            if self.ijk[axis] >= 0 && self.ijk[axis] < self.divisions[axis] {
                self.t_max[axis] += self.t_delta[axis];
                return true;
            }

            if !self.loose {
                return false;
            }

            // Keep following the boundary bins along the other axes.
            self.ijk[axis] -= self.step[axis];
            self.t_max[axis] = Real::INFINITY;
        }
    }
}

impl<T: LocatorId, M: CellMesh> CellProcessor<'_, T, M> {
    // Calls `f` with the current bin of `walk` and, if `tolerance` is positive,
    // with every bin within `tolerance` of it.
    fn for_each_walked_bin(&self, walk: &BinWalk, tolerance: Real, mut f: impl FnMut(usize)) {
        let ijk = walk.bin_ijk();

        if tolerance > 0.0 {
            let near = self.grid.ijk_aabb(ijk).loosened(tolerance);
            let (min, max) = self.grid.aabb_ijk_range(&near);
            self.grid.for_each_bin_in_range(min, max, f);
        } else {
            f(self.grid.bin_id(ijk));
        }
    }

    // Calls `f` once with each cell of the walked bins whose bounding box
    // touches the segment.
    fn walk_candidates(&self, segment: &Segment, tolerance: Real, mut f: impl FnMut(usize)) {
        let Some(mut walk) = BinWalk::new(self.grid, segment, tolerance) else {
            return;
        };
        let mut visited = vec![false; self.cell_bounds.len()];

        loop {
            self.for_each_walked_bin(&walk, tolerance, |bin_id| {
                for cell_id in self.cells.bin_cell_ids(bin_id) {
                    if visited[cell_id] {
                        continue;
                    }
                    visited[cell_id] = true;

                    if self.cell_bounds[cell_id].intersects_segment(segment, tolerance) {
                        f(cell_id);
                    }
                }
            });

            if !walk.advance() {
                return;
            }
        }
    }

    fn segment_hit(
        &self,
        cell_id: usize,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<SegmentHit> {
        let hit = self
            .mesh
            .cell(cell_id)
            .intersect_with_segment(segment, tolerance)?;
        Some(SegmentHit {
            t: hit.t,
            point: hit.point,
            cell_id,
        })
    }

    pub fn intersect_with_line(&self, segment: &Segment, tolerance: Real) -> Option<SegmentHit> {
        let mut walk = BinWalk::new(self.grid, segment, tolerance)?;
        let mut visited = vec![false; self.cell_bounds.len()];
        let mut best: Option<SegmentHit> = None;

        loop {
            self.for_each_walked_bin(&walk, tolerance, |bin_id| {
                for cell_id in self.cells.bin_cell_ids(bin_id) {
                    if visited[cell_id] {
                        continue;
                    }
                    visited[cell_id] = true;

                    if !self.cell_bounds[cell_id].intersects_segment(segment, tolerance) {
                        continue;
                    }

                    if let Some(hit) = self.segment_hit(cell_id, segment, tolerance) {
                        if best.map(|best| hit.t < best.t).unwrap_or(true) {
                            best = Some(hit);
                        }
                    }
                }
            });

            // A hit beyond the current bin may still be preceded by a hit on
            // a cell of the bins ahead.
            if let Some(best) = best {
                if best.t <= walk.t_exit() {
                    return Some(best);
                }
            }

            if !walk.advance() {
                return best;
            }
        }
    }

    pub fn intersect_with_line_all(&self, segment: &Segment, tolerance: Real) -> Vec<SegmentHit> {
        let mut hits = Vec::new();

        self.walk_candidates(segment, tolerance, |cell_id| {
            if let Some(hit) = self.segment_hit(cell_id, segment, tolerance) {
                hits.push(hit);
            }
        });

        hits.sort_unstable_by_key(|hit| (OrderedFloat(hit.t), hit.cell_id));
        hits
    }

    pub fn find_cells_along_line(&self, segment: &Segment, tolerance: Real) -> Vec<usize> {
        let mut result = Vec::new();

        self.walk_candidates(segment, tolerance, |cell_id| result.push(cell_id));

        result
    }
}

#[cfg(test)]
mod test {
    use super::BinWalk;
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Real};
    use crate::partitioning::BinGrid;
    use crate::query::Segment;

    fn walked_bins(grid: &BinGrid, segment: &Segment, tolerance: Real) -> Vec<[usize; 3]> {
        let mut result = Vec::new();
        if let Some(mut walk) = BinWalk::new(grid, segment, tolerance) {
            loop {
                result.push(walk.bin_ijk());
                if !walk.advance() {
                    break;
                }
            }
        }
        result
    }

    #[test]
    fn walk_follows_the_segment() {
        let grid = BinGrid::new(
            Aabb::new(Point::origin(), Point::new(4.0, 4.0, 4.0)),
            [4, 4, 4],
        );

        let seg = Segment::new(Point::new(-1.0, 0.5, 0.5), Point::new(2.5, 0.5, 0.5));
        assert_eq!(walked_bins(&grid, &seg, 0.0), vec![[0, 0, 0], [1, 0, 0], [2, 0, 0]]);

        let backward = Segment::new(Point::new(3.5, 2.5, 0.5), Point::new(1.5, 0.6, 0.5));
        assert_eq!(
            walked_bins(&grid, &backward, 0.0),
            vec![[3, 2, 0], [2, 2, 0], [2, 1, 0], [1, 1, 0], [1, 0, 0]]
        );

        let outside = Segment::new(Point::new(-1.0, 5.0, 0.5), Point::new(5.0, 5.0, 0.5));
        assert!(walked_bins(&grid, &outside, 0.0).is_empty());
    }

    #[test]
    fn walk_enters_the_grid_loosened_by_the_tolerance() {
        let grid = BinGrid::new(
            Aabb::new(Point::origin(), Point::new(4.0, 4.0, 4.0)),
            [4, 4, 4],
        );

        // Runs along the top face of the grid, slightly above it.
        let grazing = Segment::new(Point::new(-1.0, 4.01, 0.5), Point::new(2.5, 4.01, 0.5));
        assert!(walked_bins(&grid, &grazing, 0.0).is_empty());
        assert_eq!(
            walked_bins(&grid, &grazing, 0.1 as Real),
            vec![[0, 3, 0], [1, 3, 0], [2, 3, 0]]
        );
        assert!(walked_bins(&grid, &grazing, 0.001 as Real).is_empty());

        // Leaves the grid through its top face, then stays close to it.
        let leaving = Segment::new(Point::new(0.5, 3.9, 0.5), Point::new(3.5, 4.05, 0.5));
        assert_eq!(
            walked_bins(&grid, &leaving, 0.1 as Real),
            vec![[0, 3, 0], [1, 3, 0], [2, 3, 0], [3, 3, 0]]
        );
        assert_eq!(walked_bins(&grid, &leaving, 0.0), vec![[0, 3, 0], [1, 3, 0], [2, 3, 0]]);
    }

    #[test]
    fn walk_stops_at_the_end_of_the_segment_or_the_grid() {
        let grid = BinGrid::new(
            Aabb::new(Point::origin(), Point::new(4.0, 4.0, 4.0)),
            [4, 4, 4],
        );

        let through = Segment::new(Point::new(0.5, 0.5, -10.0), Point::new(0.5, 0.5, 10.0));
        assert_eq!(walked_bins(&grid, &through, 0.0).len(), 4);

        let point = Segment::new(Point::new(1.5, 1.5, 1.5), Point::new(1.5, 1.5, 1.5));
        assert_eq!(walked_bins(&grid, &point, 0.0), vec![[1, 1, 1]]);
    }
}
