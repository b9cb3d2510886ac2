use super::cell_index::CellProcessor;
use super::LocatorId;
use crate::math::{Point, Real};
use crate::mesh::CellMesh;
use crate::shape::LocatableCell;
use crate::utils::WeightedValue;
use alloc::collections::BinaryHeap;
use hashbrown::HashSet;
use smallvec::SmallVec;

/// A cell containing a query point.
#[derive(Clone, Debug, PartialEq)]
pub struct CellLocation {
    /// The id of the cell.
    pub cell_id: usize,
    /// The interpolation weights of the query point, one per point of the cell.
    pub weights: SmallVec<[Real; 8]>,
}

/// The point of a mesh closest to a query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClosestPoint {
    /// The closest point.
    pub point: Point<Real>,
    /// The id of the cell the closest point lies on.
    pub cell_id: usize,
    /// The squared distance between the query point and `self.point`.
    pub dist2: Real,
    /// Is the query point inside the cell?
    pub inside: bool,
}

// Could a squared distance `dist2` replace the current best?
#[inline]
fn improves(dist2: Real, bound: Real, found: bool) -> bool {
    if found {
        dist2 < bound
    } else {
        dist2 <= bound
    }
}

impl<T: LocatorId, M: CellMesh> CellProcessor<'_, T, M> {
    pub fn locate_point(&self, pt: &Point<Real>, tolerance: Real) -> Option<CellLocation> {
        if !self
            .grid
            .aabb()
            .contains_local_point_with_tolerance(pt, tolerance)
        {
            return None;
        }

        let bin_id = self.grid.point_bin(pt);
        let mut weights = SmallVec::with_capacity(self.mesh.max_cell_size());

        for cell_id in self.cells.bin_cell_ids(bin_id) {
            if !self.cell_bounds[cell_id].contains_local_point_with_tolerance(pt, tolerance) {
                continue;
            }

            let cell = self.mesh.cell(cell_id);
            weights.clear();
            weights.resize(cell.num_points(), 0.0);

            if cell.evaluate_position(pt, tolerance, &mut weights).inside {
                return Some(CellLocation { cell_id, weights });
            }
        }

        None
    }

    /// Best-first search over the bins, ordered by their distance to `pt`.
    pub fn find_closest_point_within_radius(
        &self,
        pt: &Point<Real>,
        radius: Real,
    ) -> Option<ClosestPoint> {
        // NOTE: this also rejects NaN.
        if !(radius >= 0.0) {
            return None;
        }

        let mut bound = radius * radius;
        let mut best: Option<ClosestPoint> = None;

        let seed = self.grid.point_bin(pt);
        let seed_dist2 = self.grid.bin_aabb(seed).distance_squared_to_local_point(pt);
        if !improves(seed_dist2, bound, false) {
            return None;
        }

        let mut queue = BinaryHeap::new();
        let mut visited_bins = HashSet::new();
        let mut visited_cells = HashSet::new();
        queue.push(WeightedValue::new(seed, seed_dist2));
        let _ = visited_bins.insert(seed);

        while let Some(entry) = queue.pop() {
            if !improves(entry.cost, bound, best.is_some()) {
                break;
            }

            for cell_id in self.cells.bin_cell_ids(entry.value) {
                let box_dist2 = self.cell_bounds[cell_id].distance_squared_to_local_point(pt);
                if !improves(box_dist2, bound, best.is_some()) || !visited_cells.insert(cell_id) {
                    continue;
                }

                let proj = self.mesh.cell(cell_id).project_point(pt);
                if improves(proj.dist2, bound, best.is_some()) {
                    bound = proj.dist2;
                    best = Some(ClosestPoint {
                        point: proj.point,
                        cell_id,
                        dist2: proj.dist2,
                        inside: proj.inside,
                    });
                }
            }

            for neighbor in self.grid.bin_neighbors(entry.value) {
                if visited_bins.insert(neighbor) {
                    let dist2 = self
                        .grid
                        .bin_aabb(neighbor)
                        .distance_squared_to_local_point(pt);
                    // Bounds only shrink, so a bin rejected now is never needed later.
                    if improves(dist2, bound, best.is_some()) {
                        queue.push(WeightedValue::new(neighbor, dist2));
                    }
                }
            }
        }

        best
    }
}
