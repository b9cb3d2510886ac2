use super::{
    BinGrid, BinRepresentation, CellIndex, CellLocation, ClosestPoint, LocatorBuildError,
    LocatorConfig, SegmentHit,
};
use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::mesh::{CellMesh, ModificationStamp};
use crate::query::Segment;
use alloc::sync::Arc;
use alloc::vec::Vec;

/// A spatial index locating the cells of a mesh, based on a uniform grid of bins.
///
/// The search structure is built lazily, by the first query following a
/// modification of the mesh or of the configuration, and is immutable once
/// built. Shallow copies of a locator share the same structure.
///
/// Queries go through `&mut self` since they may need to build the structure
/// first. For concurrent queries, build once and share [`StaticCellLocator::index`]
/// between threads.
///
/// # Example
///
/// ```rust
/// # #[cfg(feature = "f32")] {
/// use cellgrid3d::mesh::UnstructuredMesh;
/// use cellgrid3d::na::{Point3, Vector3};
/// use cellgrid3d::partitioning::StaticCellLocator;
/// use std::sync::Arc;
///
/// let mesh = UnstructuredMesh::voxel_grid(Point3::origin(), Vector3::repeat(1.0), [4, 4, 4]);
/// let mut locator = StaticCellLocator::with_mesh(Arc::new(mesh));
///
/// assert_eq!(locator.find_cell(&Point3::new(1.5, 0.5, 0.5)), Some(1));
/// assert_eq!(locator.find_cell(&Point3::new(10.0, 0.5, 0.5)), None);
/// # }
/// ```
pub struct StaticCellLocator<M> {
    config: LocatorConfig,
    mesh: Option<Arc<M>>,
    index: Option<Arc<CellIndex<M>>>,
    // Last change of the configuration or of the mesh handle.
    modified: ModificationStamp,
    // Last build attempt, successful or not.
    build_stamp: ModificationStamp,
    last_error: Option<LocatorBuildError>,
}

impl<M> Clone for StaticCellLocator<M> {
    fn clone(&self) -> Self {
        StaticCellLocator {
            config: self.config,
            mesh: self.mesh.clone(),
            index: self.index.clone(),
            modified: self.modified,
            build_stamp: self.build_stamp,
            last_error: self.last_error,
        }
    }
}

impl<M: CellMesh> Default for StaticCellLocator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: CellMesh> StaticCellLocator<M> {
    /// Creates a locator with the default configuration and no mesh.
    pub fn new() -> Self {
        Self::with_config(LocatorConfig::default())
    }

    /// Creates a locator with the given configuration and no mesh.
    pub fn with_config(config: LocatorConfig) -> Self {
        StaticCellLocator {
            config,
            mesh: None,
            index: None,
            modified: ModificationStamp::next(),
            build_stamp: ModificationStamp::ZERO,
            last_error: None,
        }
    }

    /// Creates a locator with the default configuration for `mesh`.
    pub fn with_mesh(mesh: Arc<M>) -> Self {
        let mut result = Self::new();
        result.set_mesh(mesh);
        result
    }

    /// Sets the mesh whose cells are located.
    pub fn set_mesh(&mut self, mesh: Arc<M>) {
        self.mesh = Some(mesh);
        self.modified.modified();
    }

    /// The mesh whose cells are located.
    #[inline]
    pub fn mesh(&self) -> Option<&Arc<M>> {
        self.mesh.as_ref()
    }

    /// Mutable access to the mesh, cloned first if it is shared.
    ///
    /// The search structure keeps a handle on the mesh it was built from, so
    /// a built locator always clones the mesh here. The structure is rebuilt
    /// by the next query if the mesh's modification stamp changes.
    pub fn mesh_mut(&mut self) -> Option<&mut M>
    where
        M: Clone,
    {
        self.mesh.as_mut().map(Arc::make_mut)
    }

    /// The configuration of this locator.
    #[inline]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Replaces the configuration of this locator.
    ///
    /// The structure is rebuilt by the next query if the configuration changed.
    pub fn set_config(&mut self, config: LocatorConfig) {
        if config != self.config {
            self.config = config;
            self.modified.modified();
        }
    }

    /// Does the next query need to rebuild the search structure?
    pub fn needs_build(&self) -> bool {
        self.build_stamp < self.modified
            || self
                .mesh
                .as_ref()
                .map(|mesh| self.build_stamp < mesh.modification_stamp())
                .unwrap_or(false)
    }

    /// Builds the search structure, unless it is up-to-date.
    ///
    /// A failed build is not attempted again until the mesh or the
    /// configuration change, and returns the same error meanwhile.
    pub fn build(&mut self) -> Result<(), LocatorBuildError> {
        if !self.needs_build() {
            return match self.last_error {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }

        self.force_build()
    }

    /// Builds the search structure, even if it is up-to-date.
    pub fn force_build(&mut self) -> Result<(), LocatorBuildError> {
        self.build_stamp = ModificationStamp::next();
        self.index = None;

        let result = match &self.mesh {
            Some(mesh) => CellIndex::build(mesh.clone(), &self.config).map(Arc::new),
            None => Err(LocatorBuildError::MissingMesh),
        };

        match result {
            Ok(index) => {
                self.index = Some(index);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to build the cell locator: {}", err);
                self.last_error = Some(err);
                Err(err)
            }
        }
    }

    /// Releases this locator's handle on the search structure.
    ///
    /// The structure is freed once no shallow copy uses it anymore, and is
    /// rebuilt by the next query.
    pub fn free_search_structure(&mut self) {
        self.index = None;
        self.build_stamp = ModificationStamp::ZERO;
        self.last_error = None;
    }

    /// Makes `self` share the configuration, the mesh, and the search
    /// structure of `other`, without rebuilding anything.
    pub fn shallow_copy(&mut self, other: &Self) {
        *self = other.clone();
    }

    /// Is the search structure built?
    #[inline]
    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    /// The built search structure, to share between threads.
    ///
    /// This does not build anything: call [`StaticCellLocator::build`] first.
    #[inline]
    pub fn index(&self) -> Option<&Arc<CellIndex<M>>> {
        self.index.as_ref()
    }

    /// The stamp of the last build attempt.
    #[inline]
    pub fn build_stamp(&self) -> ModificationStamp {
        self.build_stamp
    }

    /// The bin grid of the built structure.
    #[inline]
    pub fn bin_grid(&self) -> Option<&BinGrid> {
        self.index.as_deref().map(|index| index.bin_grid())
    }

    /// Does the built structure use pointer-sized ids?
    #[inline]
    pub fn uses_large_ids(&self) -> bool {
        self.index
            .as_deref()
            .map(|index| index.uses_large_ids())
            .unwrap_or(false)
    }

    /// The number of (cell, bin) overlaps of the built structure.
    #[inline]
    pub fn num_fragments(&self) -> usize {
        self.index
            .as_deref()
            .map(|index| index.num_fragments())
            .unwrap_or(0)
    }

    // Builds if needed. Build errors are logged by `force_build`.
    fn built_index(&mut self) -> Option<&CellIndex<M>> {
        let _ = self.build();
        self.index.as_deref()
    }

    /// The id of a cell containing `pt`.
    pub fn find_cell(&mut self, pt: &Point<Real>) -> Option<usize> {
        self.built_index()?.find_cell(pt)
    }

    /// The id of a cell containing `pt`, and the interpolation weights of
    /// `pt` in that cell.
    pub fn locate_point(&mut self, pt: &Point<Real>) -> Option<CellLocation> {
        self.built_index()?.locate_point(pt)
    }

    /// The id of a cell containing `pt` up to the absolute distance
    /// `tolerance`, and the interpolation weights of `pt` in that cell.
    pub fn locate_point_with_tolerance(
        &mut self,
        pt: &Point<Real>,
        tolerance: Real,
    ) -> Option<CellLocation> {
        self.built_index()?
            .locate_point_with_tolerance(pt, tolerance)
    }

    /// Does the bounding box of the cell `cell_id` contain `pt`?
    pub fn inside_cell_bounds(&mut self, pt: &Point<Real>, cell_id: usize) -> bool {
        self.built_index()
            .map(|index| index.inside_cell_bounds(pt, cell_id))
            .unwrap_or(false)
    }

    /// The ids of the cells in the bins overlapped by `aabb`.
    pub fn find_cells_within_bounds(&mut self, aabb: &Aabb) -> Vec<usize> {
        self.built_index()
            .map(|index| index.find_cells_within_bounds(aabb))
            .unwrap_or_default()
    }

    /// The ids, in increasing order, of the cells whose bounding box is
    /// crossed by the plane through `origin` with the normal `normal`.
    pub fn find_cells_along_plane(
        &mut self,
        origin: &Point<Real>,
        normal: &Vector<Real>,
        tolerance: Real,
    ) -> Vec<usize> {
        self.built_index()
            .map(|index| index.find_cells_along_plane(origin, normal, tolerance))
            .unwrap_or_default()
    }

    /// The ids of the cells whose bounding box is crossed by `segment`.
    pub fn find_cells_along_line(&mut self, segment: &Segment, tolerance: Real) -> Vec<usize> {
        self.built_index()
            .map(|index| index.find_cells_along_line(segment, tolerance))
            .unwrap_or_default()
    }

    /// The intersection of `segment` with the cells closest to its first point.
    pub fn intersect_with_line(
        &mut self,
        segment: &Segment,
        tolerance: Real,
    ) -> Option<SegmentHit> {
        self.built_index()?.intersect_with_line(segment, tolerance)
    }

    /// All the intersections of `segment` with the cells, sorted by
    /// increasing segment parameter.
    pub fn intersect_with_line_all(
        &mut self,
        segment: &Segment,
        tolerance: Real,
    ) -> Vec<SegmentHit> {
        self.built_index()
            .map(|index| index.intersect_with_line_all(segment, tolerance))
            .unwrap_or_default()
    }

    /// The point of the cells closest to `pt` if it is at most at the
    /// distance `radius`.
    pub fn find_closest_point_within_radius(
        &mut self,
        pt: &Point<Real>,
        radius: Real,
    ) -> Option<ClosestPoint> {
        self.built_index()?
            .find_closest_point_within_radius(pt, radius)
    }

    /// The point of the cells closest to `pt`.
    pub fn find_closest_point(&mut self, pt: &Point<Real>) -> Option<ClosestPoint> {
        self.built_index()?.find_closest_point(pt)
    }

    /// The ids of the cells overlapping the bin `bin_id`.
    pub fn bin_cell_ids(&mut self, bin_id: usize) -> Vec<usize> {
        self.built_index()
            .map(|index| index.bin_cell_ids(bin_id))
            .unwrap_or_default()
    }

    /// The number of cells overlapping the bin `bin_id`.
    pub fn num_cells_in_bin(&mut self, bin_id: usize) -> usize {
        self.built_index()
            .map(|index| index.num_cells_in_bin(bin_id))
            .unwrap_or(0)
    }

    /// The boundary faces of the region covered by the non-empty bins.
    pub fn generate_representation(&mut self) -> BinRepresentation {
        self.built_index()
            .map(|index| index.generate_representation())
            .unwrap_or_default()
    }
}
