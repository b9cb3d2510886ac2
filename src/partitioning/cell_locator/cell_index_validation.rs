use super::{BinnedCells, CellIndex, FragmentTable, LocatorId};
use crate::mesh::CellMesh;

impl<M: CellMesh> CellIndex<M> {
    /// Panics if the search structure isn’t well-formed.
    ///
    /// The structure is well-formed if the per-cell fragment offsets are a
    /// prefix sum of the number of bins overlapped by each cell, the per-bin
    /// offsets are non-decreasing and end with the number of fragments, and
    /// every fragment lies in a bin overlapped by its cell's bounding box.
    ///
    /// This is mostly a utility for debugging.
    pub fn assert_well_formed(&self) {
        let num_cells = self.num_cells();
        let cell_offsets = self.cell_offsets();
        assert_eq!(cell_offsets.len(), num_cells + 1);
        assert_eq!(cell_offsets[num_cells], self.num_fragments());

        for (cell_id, aabb) in self.cell_bounds().iter().enumerate() {
            let (min, max) = self.bin_grid().aabb_ijk_range(aabb);
            assert_eq!(
                cell_offsets[cell_id + 1] - cell_offsets[cell_id],
                crate::partitioning::BinGrid::range_len(min, max),
                "Invalid fragment count for the cell {}.",
                cell_id
            );
        }

        match self.fragment_table() {
            FragmentTable::Narrow(cells) => self.assert_binned_cells_well_formed(cells),
            FragmentTable::Wide(cells) => self.assert_binned_cells_well_formed(cells),
        }
    }

    fn assert_binned_cells_well_formed<T: LocatorId>(&self, cells: &BinnedCells<T>) {
        let grid = self.bin_grid();
        let num_bins = grid.num_bins();
        let offsets = cells.offsets();

        assert_eq!(offsets.len(), num_bins + 1);
        assert_eq!(offsets[0].to_usize(), 0);
        assert_eq!(offsets[num_bins].to_usize(), cells.num_fragments());
        assert_eq!(cells.fragments().len(), cells.num_fragments());

        for bin_id in 0..num_bins {
            assert!(
                offsets[bin_id] <= offsets[bin_id + 1],
                "Decreasing offsets at the bin {}.",
                bin_id
            );

            let ijk = grid.bin_ijk(bin_id);
            for fragment in cells.bin_fragments(bin_id) {
                assert_eq!(fragment.bin_id.to_usize(), bin_id);

                let cell_id = fragment.cell_id.to_usize();
                let (min, max) = grid.aabb_ijk_range(&self.cell_bounds()[cell_id]);
                assert!(
                    (0..3).all(|i| min[i] <= ijk[i] && ijk[i] <= max[i]),
                    "The cell {} is not overlapping the bin {}.",
                    cell_id,
                    bin_id
                );
            }
        }
    }
}
