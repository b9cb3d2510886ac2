use crate::bounding_volume::Aabb;
use crate::mesh::ModificationStamp;
use crate::shape::LocatableCell;

/// A collection of cells the locator can index.
///
/// This is the only view the locator has on the mesh: it never mutates it,
/// and reads it from several threads at once.
pub trait CellMesh: Send + Sync {
    /// The exact geometry of one cell.
    type Cell: LocatableCell;

    /// The number of cells of this mesh.
    fn num_cells(&self) -> usize;

    /// The geometry of the `cell_id`-th cell.
    fn cell(&self, cell_id: usize) -> Self::Cell;

    /// The bounding box of the `cell_id`-th cell.
    fn cell_aabb(&self, cell_id: usize) -> Aabb {
        self.cell(cell_id).aabb()
    }

    /// The bounding box of the whole mesh.
    fn aabb(&self) -> Aabb {
        let mut result = Aabb::new_invalid();
        for i in 0..self.num_cells() {
            result.merge(&self.cell_aabb(i));
        }
        result
    }

    /// The largest number of points of a single cell of this mesh.
    ///
    /// Sizes the interpolation weights scratch buffers.
    fn max_cell_size(&self) -> usize;

    /// The stamp of the last modification of this mesh.
    fn modification_stamp(&self) -> ModificationStamp;
}
