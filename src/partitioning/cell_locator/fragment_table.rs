use super::BinGrid;
use crate::bounding_volume::Aabb;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::mem;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of cells whose fragments are written by a single task.
const CELL_BATCH_SIZE: usize = 1000;
/// Number of fragments scanned by a single task when computing bin offsets.
const FRAGMENT_BATCH_SIZE: usize = 5000;

/// An integer type usable for the cell and bin ids of a fragment table.
pub trait LocatorId: Copy + Ord + Default + Debug + Send + Sync + 'static {
    /// The largest id representable by this type.
    const MAX_ID: usize;

    /// Converts `id` to `Self`, which must be at most `Self::MAX_ID`.
    fn from_usize(id: usize) -> Self;

    /// Converts `self` to `usize`.
    fn to_usize(self) -> usize;
}

impl LocatorId for u32 {
    const MAX_ID: usize = u32::MAX as usize;

    #[inline(always)]
    fn from_usize(id: usize) -> Self {
        id as u32
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl LocatorId for usize {
    const MAX_ID: usize = usize::MAX;

    #[inline(always)]
    fn from_usize(id: usize) -> Self {
        id
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self
    }
}

/// The pair recording that a cell's bounding box overlaps a bin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct CellFragment<T> {
    /// The id of the cell.
    pub cell_id: T,
    /// The id of the bin.
    pub bin_id: T,
}

static_assertions::assert_eq_size!(CellFragment<u32>, u64);

/// The fragments of every cell, grouped by bin.
#[derive(Clone, Debug)]
pub struct BinnedCells<T> {
    // Sorted by bin id, followed by one sentinel with the bin id `num_bins`.
    fragments: Vec<CellFragment<T>>,
    // The fragments of bin `b` are `fragments[offsets[b]..offsets[b + 1]]`.
    offsets: Vec<T>,
}

impl<T: LocatorId> BinnedCells<T> {
    /// Bins the cells whose bounding boxes are `cell_bounds`.
    ///
    /// The fragments of cell `i` are written at `cell_offsets[i]..cell_offsets[i + 1]`
    /// before being sorted by bin.
    pub(crate) fn build(grid: &BinGrid, cell_bounds: &[Aabb], cell_offsets: &[usize]) -> Self {
        let num_cells = cell_bounds.len();
        let num_fragments = cell_offsets[num_cells];
        let num_bins = grid.num_bins();

        let mut fragments = vec![CellFragment::default(); num_fragments + 1];
        fragments[num_fragments] = CellFragment {
            cell_id: T::default(),
            bin_id: T::from_usize(num_bins),
        };

        // Split the fragments into disjoint chunks, one per batch of cells.
        let mut batches = Vec::with_capacity(num_cells.div_ceil(CELL_BATCH_SIZE));
        let mut rest = &mut fragments[..num_fragments];
        for first_cell in (0..num_cells).step_by(CELL_BATCH_SIZE) {
            let last_cell = (first_cell + CELL_BATCH_SIZE).min(num_cells);
            let len = cell_offsets[last_cell] - cell_offsets[first_cell];
            let (chunk, tail) = mem::take(&mut rest).split_at_mut(len);
            batches.push((first_cell..last_cell, chunk));
            rest = tail;
        }

        let write_batch = |(cells, chunk): (core::ops::Range<usize>, &mut [CellFragment<T>])| {
            let mut k = 0;
            for cell_id in cells {
                let (min, max) = grid.aabb_ijk_range(&cell_bounds[cell_id]);
                grid.for_each_bin_in_range(min, max, |bin_id| {
                    chunk[k] = CellFragment {
                        cell_id: T::from_usize(cell_id),
                        bin_id: T::from_usize(bin_id),
                    };
                    k += 1;
                });
            }
        };

        #[cfg(feature = "parallel")]
        {
            batches.into_par_iter().for_each(write_batch);
            fragments[..num_fragments].par_sort_unstable_by_key(|f| f.bin_id);
        }
        #[cfg(not(feature = "parallel"))]
        {
            batches.into_iter().for_each(write_batch);
            fragments[..num_fragments].sort_unstable_by_key(|f| f.bin_id);
        }

        let offsets = compute_bin_offsets(&fragments, num_bins);
        BinnedCells { fragments, offsets }
    }

    /// The number of fragments, i.e., the number of (cell, bin) overlaps.
    #[inline]
    pub fn num_fragments(&self) -> usize {
        self.fragments.len() - 1
    }

    /// The number of bins.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.offsets.len() - 1
    }

    /// All the fragments sorted by bin id, excluding the trailing sentinel.
    #[inline]
    pub fn fragments(&self) -> &[CellFragment<T>] {
        &self.fragments[..self.num_fragments()]
    }

    /// The offset of the first fragment of each bin, followed by the total
    /// number of fragments.
    #[inline]
    pub fn offsets(&self) -> &[T] {
        &self.offsets
    }

    /// The fragments of the bin `bin_id`.
    #[inline]
    pub fn bin_fragments(&self, bin_id: usize) -> &[CellFragment<T>] {
        let start = self.offsets[bin_id].to_usize();
        let end = self.offsets[bin_id + 1].to_usize();
        &self.fragments[start..end]
    }

    /// The number of cells overlapping the bin `bin_id`.
    #[inline]
    pub fn num_cells_in_bin(&self, bin_id: usize) -> usize {
        self.offsets[bin_id + 1].to_usize() - self.offsets[bin_id].to_usize()
    }

    /// The ids of the cells overlapping the bin `bin_id`.
    #[inline]
    pub fn bin_cell_ids(&self, bin_id: usize) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.bin_fragments(bin_id)
            .iter()
            .map(|frag| frag.cell_id.to_usize())
    }

    /// Shuffles the fragments inside of each bin.
    #[cfg(test)]
    pub(crate) fn shuffle_bins(&mut self, seed: u64) {
        let mut rng = oorandom::Rand32::new(seed);

        for bin_id in 0..self.num_bins() {
            let start = self.offsets[bin_id].to_usize();
            let end = self.offsets[bin_id + 1].to_usize();
            let bin = &mut self.fragments[start..end];

            for i in (1..bin.len()).rev() {
                let j = rng.rand_range(0..(i as u32 + 1)) as usize;
                bin.swap(i, j);
            }
        }
    }
}

/// Computes the offset of the first fragment of each bin.
///
/// `fragments` must be sorted by bin id and end with a sentinel with the bin
/// id `num_bins`. Each batch of fragments `[s, e)` owns the offsets of the
/// bins `fragments[s - 1].bin_id + 1..=fragments[e - 1].bin_id`, so the batches
/// write disjoint parts of the result.
fn compute_bin_offsets<T: LocatorId>(fragments: &[CellFragment<T>], num_bins: usize) -> Vec<T> {
    let num_entries = fragments.len();
    let mut offsets = vec![T::default(); num_bins + 1];

    let mut batches = Vec::with_capacity(num_entries.div_ceil(FRAGMENT_BATCH_SIZE));
    let mut rest = &mut offsets[..];
    let mut first_bin = 0;
    for start in (0..num_entries).step_by(FRAGMENT_BATCH_SIZE) {
        let end = (start + FRAGMENT_BATCH_SIZE).min(num_entries);
        let last_bin = fragments[end - 1].bin_id.to_usize();
        let (chunk, tail) = mem::take(&mut rest).split_at_mut(last_bin + 1 - first_bin);
        batches.push((start..end, first_bin, chunk));
        rest = tail;
        first_bin = last_bin + 1;
    }

    let fill_batch =
        |(range, first_bin, chunk): (core::ops::Range<usize>, usize, &mut [T])| {
            let mut next_bin = first_bin;
            for i in range {
                let bin_id = fragments[i].bin_id.to_usize();
                while next_bin <= bin_id {
                    chunk[next_bin - first_bin] = T::from_usize(i);
                    next_bin += 1;
                }
            }
        };

    #[cfg(feature = "parallel")]
    batches.into_par_iter().for_each(fill_batch);
    #[cfg(not(feature = "parallel"))]
    batches.into_iter().for_each(fill_batch);

    offsets
}

/// The fragment table of a cell locator, with ids stored on 32 bits when
/// every id fits, and on pointer-sized integers otherwise.
#[derive(Clone, Debug)]
pub enum FragmentTable {
    /// A table with 32-bits ids.
    Narrow(BinnedCells<u32>),
    /// A table with pointer-sized ids.
    Wide(BinnedCells<usize>),
}

impl FragmentTable {
    /// Can a table with these sizes be stored with 32-bits ids?
    ///
    /// Offsets range up to `num_fragments` and the sentinel uses the bin id
    /// `num_bins`.
    #[inline]
    pub fn fits_narrow_ids(num_cells: usize, num_bins: usize, num_fragments: usize) -> bool {
        num_cells <= u32::MAX_ID && num_bins <= u32::MAX_ID && num_fragments <= u32::MAX_ID
    }

    /// Builds the table with the narrowest suitable id type, or with
    /// pointer-sized ids if `large_ids` is `true`.
    pub(crate) fn build(
        grid: &BinGrid,
        cell_bounds: &[Aabb],
        cell_offsets: &[usize],
        large_ids: bool,
    ) -> Self {
        let num_fragments = cell_offsets[cell_bounds.len()];

        if !large_ids
            && Self::fits_narrow_ids(cell_bounds.len(), grid.num_bins(), num_fragments)
        {
            FragmentTable::Narrow(BinnedCells::build(grid, cell_bounds, cell_offsets))
        } else {
            FragmentTable::Wide(BinnedCells::build(grid, cell_bounds, cell_offsets))
        }
    }

    /// Is this table using pointer-sized ids?
    #[inline]
    pub fn uses_large_ids(&self) -> bool {
        matches!(self, FragmentTable::Wide(_))
    }

    /// The number of fragments, i.e., the number of (cell, bin) overlaps.
    #[inline]
    pub fn num_fragments(&self) -> usize {
        match self {
            FragmentTable::Narrow(cells) => cells.num_fragments(),
            FragmentTable::Wide(cells) => cells.num_fragments(),
        }
    }

    /// The number of cells overlapping the bin `bin_id`.
    #[inline]
    pub fn num_cells_in_bin(&self, bin_id: usize) -> usize {
        match self {
            FragmentTable::Narrow(cells) => cells.num_cells_in_bin(bin_id),
            FragmentTable::Wide(cells) => cells.num_cells_in_bin(bin_id),
        }
    }

    /// The ids of the cells overlapping the bin `bin_id`.
    pub fn bin_cell_ids(&self, bin_id: usize) -> Vec<usize> {
        match self {
            FragmentTable::Narrow(cells) => cells.bin_cell_ids(bin_id).collect(),
            FragmentTable::Wide(cells) => cells.bin_cell_ids(bin_id).collect(),
        }
    }
}
