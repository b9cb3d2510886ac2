use crate::math::Real;

/// Parameters controlling the construction of a [`StaticCellLocator`](super::StaticCellLocator).
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LocatorConfig {
    /// The average number of cells per bin targeted when the divisions
    /// are computed automatically.
    pub cells_per_bucket: usize,
    /// The number of bins along each axis, or `None` to compute them
    /// from `cells_per_bucket`.
    pub divisions: Option<[usize; 3]>,
    /// The maximum number of bins of the grid.
    pub max_number_of_buckets: usize,
    /// The tolerance of the point and segment queries, relative to the length
    /// of the diagonal of the mesh bounds.
    pub tolerance: Real,
    /// Always store the fragment table with pointer-sized ids, even when
    /// 32-bits ids would be enough.
    pub large_ids: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            cells_per_bucket: 10,
            divisions: None,
            max_number_of_buckets: i32::MAX as usize,
            tolerance: 1.0e-6,
            large_ids: false,
        }
    }
}

impl LocatorConfig {
    /// Sets the average number of cells per bin.
    pub fn with_cells_per_bucket(mut self, cells_per_bucket: usize) -> Self {
        self.cells_per_bucket = cells_per_bucket;
        self
    }

    /// Sets explicit divisions for the bin grid.
    pub fn with_divisions(mut self, divisions: [usize; 3]) -> Self {
        self.divisions = Some(divisions);
        self
    }

    /// Sets the maximum number of bins of the grid.
    pub fn with_max_number_of_buckets(mut self, max_number_of_buckets: usize) -> Self {
        self.max_number_of_buckets = max_number_of_buckets;
        self
    }

    /// Sets the relative tolerance of the queries.
    pub fn with_tolerance(mut self, tolerance: Real) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Forces the use of pointer-sized ids in the fragment table.
    pub fn with_large_ids(mut self, large_ids: bool) -> Self {
        self.large_ids = large_ids;
        self
    }

    /// The number of bins targeted for a mesh with `num_cells` cells when
    /// the divisions are computed automatically.
    pub fn target_bins(&self, num_cells: usize) -> usize {
        (num_cells / self.cells_per_bucket.max(1)).clamp(1, self.max_number_of_buckets.max(1))
    }
}
