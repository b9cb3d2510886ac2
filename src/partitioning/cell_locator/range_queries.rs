use super::cell_index::CellProcessor;
use super::LocatorId;
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::mesh::CellMesh;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

const UNVISITED: u8 = 0;
const VISITED: u8 = 1;
const SELECTED: u8 = 2;

impl<T: LocatorId, M: CellMesh> CellProcessor<'_, T, M> {
    pub fn find_cells_within_bounds(&self, aabb: &Aabb) -> Vec<usize> {
        if !aabb.is_valid() || !self.grid.aabb().intersects(aabb) {
            return Vec::new();
        }

        let (min, max) = self.grid.aabb_ijk_range(aabb);
        let mut visited = vec![false; self.cell_bounds.len()];
        let mut result = Vec::new();

        self.grid.for_each_bin_in_range(min, max, |bin_id| {
            for cell_id in self.cells.bin_cell_ids(bin_id) {
                if !visited[cell_id] {
                    visited[cell_id] = true;
                    result.push(cell_id);
                }
            }
        });

        result
    }

    pub fn find_cells_along_plane(
        &self,
        origin: &Point<Real>,
        normal: &Vector<Real>,
        tolerance: Real,
    ) -> Vec<usize> {
        let Some(normal) = normal.try_normalize(DEFAULT_EPSILON) else {
            return Vec::new();
        };

        if !self.grid.aabb().intersects_plane(origin, &normal, tolerance) {
            return Vec::new();
        }

        // Largest distance, along the normal, between the center of a bin and its corners.
        let bin_radius = self.grid.bin_size().dot(&normal.abs()) * 0.5;
        let states: Vec<AtomicU8> = (0..self.cell_bounds.len())
            .map(|_| AtomicU8::new(UNVISITED))
            .collect();

        let visit_bin = |bin_id: usize| {
            let center = self.grid.bin_center(bin_id);
            if (center - origin).dot(&normal).abs() > bin_radius + tolerance {
                return;
            }

            for cell_id in self.cells.bin_cell_ids(bin_id) {
                // Only the thread moving the cell out of `UNVISITED` tests it.
                let first_visit = states[cell_id]
                    .compare_exchange(
                        UNVISITED,
                        VISITED,
                        AtomicOrdering::Relaxed,
                        AtomicOrdering::Relaxed,
                    )
                    .is_ok();

                if first_visit
                    && self.cell_bounds[cell_id].intersects_plane(origin, &normal, tolerance)
                {
                    states[cell_id].store(SELECTED, AtomicOrdering::Relaxed);
                }
            }
        };

        #[cfg(feature = "parallel")]
        (0..self.grid.num_bins()).into_par_iter().for_each(visit_bin);
        #[cfg(not(feature = "parallel"))]
        (0..self.grid.num_bins()).for_each(visit_bin);

        states
            .iter()
            .enumerate()
            .filter(|(_, state)| state.load(AtomicOrdering::Relaxed) == SELECTED)
            .map(|(cell_id, _)| cell_id)
            .collect()
    }
}
