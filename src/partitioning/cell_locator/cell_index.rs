use super::binner::{compute_cell_bounds, compute_cell_offsets};
use super::{
    BinGrid, BinRepresentation, BinnedCells, CellLocation, ClosestPoint, FragmentTable,
    LocatorConfig, LocatorId, SegmentHit,
};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::mesh::{CellMesh, ModificationStamp};
use crate::query::Segment;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// Error raised when the search structure of a locator cannot be built.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocatorBuildError {
    /// No mesh was given to the locator.
    #[error("no mesh was given to the locator.")]
    MissingMesh,
    /// The mesh has no cells.
    #[error("the mesh has no cells.")]
    EmptyMesh,
    /// The bounds of a cell are not finite.
    #[error("the bounds of a cell are not finite.")]
    InvalidBounds,
}

/// The immutable search structure of a [`StaticCellLocator`](super::StaticCellLocator).
///
/// It keeps a handle on the mesh it was built from, so it can be shared
/// between threads with an `Arc` and queried through `&self` without any
/// synchronization.
#[derive(Clone, Debug)]
pub struct CellIndex<M> {
    mesh: Arc<M>,
    mesh_stamp: ModificationStamp,
    grid: BinGrid,
    cell_bounds: Vec<Aabb>,
    cell_offsets: Vec<usize>,
    table: FragmentTable,
    tolerance: Real,
}

/// The query algorithms, operating on a fragment table with ids of type `T`.
pub(crate) struct CellProcessor<'a, T, M> {
    pub grid: &'a BinGrid,
    pub cell_bounds: &'a [Aabb],
    pub cells: &'a BinnedCells<T>,
    pub mesh: &'a M,
}

// Runs `$body` with a processor specialized for the id width of the table.
macro_rules! with_processor {
    ($index: expr, |$processor: ident| $body: expr) => {
        match &$index.table {
            FragmentTable::Narrow(cells) => {
                let $processor = $index.processor(cells);
                $body
            }
            FragmentTable::Wide(cells) => {
                let $processor = $index.processor(cells);
                $body
            }
        }
    };
}

impl<M: CellMesh> CellIndex<M> {
    /// Bins the cells of `mesh`.
    pub fn build(mesh: Arc<M>, config: &LocatorConfig) -> Result<Self, LocatorBuildError> {
        let num_cells = mesh.num_cells();
        if num_cells == 0 {
            return Err(LocatorBuildError::EmptyMesh);
        }

        let mesh_stamp = mesh.modification_stamp();
        let cell_bounds = compute_cell_bounds(&*mesh);
        let is_finite =
            |aabb: &Aabb| aabb.mins.iter().chain(aabb.maxs.iter()).all(|x| x.is_finite());

        if let Some(cell_id) = cell_bounds.iter().position(|bounds| !is_finite(bounds)) {
            log::debug!("the cell {} has non-finite bounds.", cell_id);
            return Err(LocatorBuildError::InvalidBounds);
        }

        let aabb = cell_bounds
            .iter()
            .fold(Aabb::new_invalid(), |acc, bounds| acc.merged(bounds));

        let grid = Self::bin_grid_for(aabb, num_cells, config);
        log::debug!(
            "binning {} cells into {:?} bins of size {:?}.",
            num_cells,
            grid.divisions(),
            grid.bin_size().as_slice()
        );

        let cell_offsets = compute_cell_offsets(&grid, &cell_bounds);
        let table = FragmentTable::build(&grid, &cell_bounds, &cell_offsets, config.large_ids);
        log::debug!(
            "built {} fragments with {} ids.",
            table.num_fragments(),
            if table.uses_large_ids() {
                "pointer-sized"
            } else {
                "32-bits"
            }
        );

        Ok(CellIndex {
            tolerance: config.tolerance.max(0.0) * aabb.diagonal_length(),
            mesh,
            mesh_stamp,
            grid,
            cell_bounds,
            cell_offsets,
            table,
        })
    }

    fn bin_grid_for(aabb: Aabb, num_cells: usize, config: &LocatorConfig) -> BinGrid {
        let Some(divisions) = config.divisions else {
            return BinGrid::automatic(aabb, config.target_bins(num_cells));
        };

        let divisions = divisions.map(|d| d.max(1));
        let num_bins = divisions
            .iter()
            .try_fold(1usize, |acc, d| acc.checked_mul(*d));

        match num_bins {
            Some(num_bins) if num_bins <= config.max_number_of_buckets => {
                BinGrid::new(aabb, divisions)
            }
            _ => {
                log::warn!(
                    "the divisions {:?} exceed the {} bins limit, computing them automatically.",
                    divisions,
                    config.max_number_of_buckets
                );
                BinGrid::automatic(aabb, config.max_number_of_buckets)
            }
        }
    }

    #[inline]
    fn processor<'a, T: LocatorId>(
        &'a self,
        cells: &'a BinnedCells<T>,
    ) -> CellProcessor<'a, T, M> {
        CellProcessor {
            grid: &self.grid,
            cell_bounds: &self.cell_bounds,
            cells,
            mesh: &*self.mesh,
        }
    }

    /// The mesh this structure was built from.
    #[inline]
    pub fn mesh(&self) -> &Arc<M> {
        &self.mesh
    }

    /// The modification stamp the mesh had when this structure was built.
    #[inline]
    pub fn mesh_stamp(&self) -> ModificationStamp {
        self.mesh_stamp
    }

    /// The bin grid.
    #[inline]
    pub fn bin_grid(&self) -> &BinGrid {
        &self.grid
    }

    /// The fragment table.
    #[inline]
    pub fn fragment_table(&self) -> &FragmentTable {
        &self.table
    }

    /// The cached bounding box of each cell.
    #[inline]
    pub fn cell_bounds(&self) -> &[Aabb] {
        &self.cell_bounds
    }

    /// The offset of the first fragment of each cell before sorting, followed
    /// by the total number of fragments.
    #[inline]
    pub fn cell_offsets(&self) -> &[usize] {
        &self.cell_offsets
    }

    /// The absolute tolerance of the point queries.
    #[inline]
    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    /// The number of indexed cells.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cell_bounds.len()
    }

    /// The number of (cell, bin) overlaps.
    #[inline]
    pub fn num_fragments(&self) -> usize {
        self.table.num_fragments()
    }

    /// Are the ids of the fragment table pointer-sized?
    #[inline]
    pub fn uses_large_ids(&self) -> bool {
        self.table.uses_large_ids()
    }

    /// The number of cells overlapping the bin `bin_id`.
    pub fn num_cells_in_bin(&self, bin_id: usize) -> usize {
        if bin_id < self.grid.num_bins() {
            self.table.num_cells_in_bin(bin_id)
        } else {
            0
        }
    }

    /// The ids of the cells overlapping the bin `bin_id`.
    pub fn bin_cell_ids(&self, bin_id: usize) -> Vec<usize> {
        if bin_id < self.grid.num_bins() {
            self.table.bin_cell_ids(bin_id)
        } else {
            Vec::new()
        }
    }

    /// Does the cached bounding box of the cell `cell_id` contain `pt`?
    pub fn inside_cell_bounds(&self, pt: &Point<Real>, cell_id: usize) -> bool {
        self.cell_bounds
            .get(cell_id)
            .map(|aabb| aabb.contains_local_point_with_tolerance(pt, self.tolerance))
            .unwrap_or(false)
    }

    /// The id of a cell containing `pt`.
    pub fn find_cell(&self, pt: &Point<Real>) -> Option<usize> {
        self.locate_point_with_tolerance(pt, self.tolerance)
            .map(|location| location.cell_id)
    }

    /// The id of a cell containing `pt`, and the interpolation weights of
    /// `pt` in that cell.
    pub fn locate_point(&self, pt: &Point<Real>) -> Option<CellLocation> {
        self.locate_point_with_tolerance(pt, self.tolerance)
    }

    /// The id of a cell containing `pt` up to the absolute distance
    /// `tolerance`, and the interpolation weights of `pt` in that cell.
    pub fn locate_point_with_tolerance(
        &self,
        pt: &Point<Real>,
        tolerance: Real,
    ) -> Option<CellLocation> {
        with_processor!(self, |processor| processor.locate_point(pt, tolerance))
    }

    /// The ids of the cells overlapping the bins overlapped by `aabb`.
    pub fn find_cells_within_bounds(&self, aabb: &Aabb) -> Vec<usize> {
        with_processor!(self, |processor| processor.find_cells_within_bounds(aabb))
    }

    /// The ids, in increasing order, of the cells whose bounding box is
    /// crossed by the plane through `origin` with the normal `normal`.
    pub fn find_cells_along_plane(
        &self,
        origin: &Point<Real>,
        normal: &Vector<Real>,
        tolerance: Real,
    ) -> Vec<usize> {
        with_processor!(self, |processor| processor.find_cells_along_plane(
            origin, normal, tolerance
        ))
    }

    /// The ids of the cells whose bounding box is crossed by `segment`, in
    /// the order the segment reaches their bins.
    pub fn find_cells_along_line(&self, segment: &Segment, tolerance: Real) -> Vec<usize> {
        with_processor!(self, |processor| processor.find_cells_along_line(
            segment, tolerance
        ))
    }

    /// The intersection of `segment` with the cells closest to its first point.
    pub fn intersect_with_line(&self, segment: &Segment, tolerance: Real) -> Option<SegmentHit> {
        with_processor!(self, |processor| processor.intersect_with_line(
            segment, tolerance
        ))
    }

    /// All the intersections of `segment` with the cells, one per cell, sorted
    /// by increasing segment parameter.
    pub fn intersect_with_line_all(&self, segment: &Segment, tolerance: Real) -> Vec<SegmentHit> {
        with_processor!(self, |processor| processor.intersect_with_line_all(
            segment, tolerance
        ))
    }

    /// The point of the cells closest to `pt`, if it is at a distance of at
    /// most `radius`.
    pub fn find_closest_point_within_radius(
        &self,
        pt: &Point<Real>,
        radius: Real,
    ) -> Option<ClosestPoint> {
        with_processor!(self, |processor| processor
            .find_closest_point_within_radius(pt, radius))
    }

    /// The point of the cells closest to `pt`.
    pub fn find_closest_point(&self, pt: &Point<Real>) -> Option<ClosestPoint> {
        self.find_closest_point_within_radius(pt, Real::INFINITY)
    }

    /// The boundary faces of the region covered by non-empty bins.
    pub fn generate_representation(&self) -> BinRepresentation {
        with_processor!(self, |processor| processor.generate_representation())
    }

    /// Shuffles the candidates of every bin.
    #[cfg(test)]
    pub(crate) fn shuffle_bins(&mut self, seed: u64) {
        match &mut self.table {
            FragmentTable::Narrow(cells) => cells.shuffle_bins(seed),
            FragmentTable::Wide(cells) => cells.shuffle_bins(seed),
        }
    }
}
