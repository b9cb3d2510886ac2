pub use bin_grid::BinGrid;
pub use cell_index::{CellIndex, LocatorBuildError};
pub use fragment_table::{BinnedCells, CellFragment, FragmentTable, LocatorId};
pub use locator_config::LocatorConfig;
pub use point_queries::{CellLocation, ClosestPoint};
pub use representation::BinRepresentation;
pub use segment_queries::SegmentHit;
pub use static_cell_locator::StaticCellLocator;

mod bin_grid;
mod binner;
mod cell_index;
mod cell_index_validation;
mod fragment_table;
mod locator_config;
mod point_queries;
mod range_queries;
mod representation;
mod segment_queries;
mod static_cell_locator;
