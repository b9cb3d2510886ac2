//! Spatial partitioning tools.

pub use self::cell_locator::{
    BinGrid, BinRepresentation, BinnedCells, CellFragment, CellIndex, CellLocation, ClosestPoint,
    FragmentTable, LocatorBuildError, LocatorConfig, LocatorId, SegmentHit, StaticCellLocator,
};

mod cell_locator;
