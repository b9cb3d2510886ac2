//! Computation of the cell bounds and of the per-cell fragment counts.

use super::BinGrid;
use crate::bounding_volume::Aabb;
use crate::math::DIM;
use crate::mesh::CellMesh;
use alloc::vec::Vec;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Computes the bounding box of every cell of `mesh`.
///
/// Inverted bounds are reordered axis by axis. NaN coordinates are kept as-is.
pub(crate) fn compute_cell_bounds<M: CellMesh>(mesh: &M) -> Vec<Aabb> {
    let bounds = |cell_id: usize| reordered(mesh.cell_aabb(cell_id));

    #[cfg(feature = "parallel")]
    {
        (0..mesh.num_cells()).into_par_iter().map(bounds).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..mesh.num_cells()).map(bounds).collect()
    }
}

fn reordered(mut aabb: Aabb) -> Aabb {
    for i in 0..DIM {
        if aabb.mins[i] > aabb.maxs[i] {
            core::mem::swap(&mut aabb.mins[i], &mut aabb.maxs[i]);
        }
    }
    aabb
}

/// Computes, for each cell, the offset of its first fragment in the fragment
/// table.
///
/// The result has one more element than `cell_bounds`: the fragments of cell
/// `i` are at `result[i]..result[i + 1]`, and the last element is the total
/// number of fragments.
pub(crate) fn compute_cell_offsets(grid: &BinGrid, cell_bounds: &[Aabb]) -> Vec<usize> {
    let count = |aabb: &Aabb| {
        let (min, max) = grid.aabb_ijk_range(aabb);
        BinGrid::range_len(min, max)
    };

    let mut offsets: Vec<usize> = Vec::with_capacity(cell_bounds.len() + 1);

    #[cfg(feature = "parallel")]
    cell_bounds.par_iter().map(count).collect_into_vec(&mut offsets);
    #[cfg(not(feature = "parallel"))]
    offsets.extend(cell_bounds.iter().map(count));

    // Exclusive prefix sum, in place.
    let mut total = 0;
    for offset in &mut offsets {
        let num_bins = *offset;
        *offset = total;
        total += num_bins;
    }
    offsets.push(total);

    offsets
}
