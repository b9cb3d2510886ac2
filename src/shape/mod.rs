//! Mesh cells and their exact geometric evaluation.

pub use self::cell::{CellProjection, CellSegmentHit, LocatableCell, MeshCell};
pub use self::tetrahedron::Tetrahedron;
pub use self::triangle::Triangle;
pub use self::voxel::Voxel;

mod cell;
mod tetrahedron;
mod triangle;
mod voxel;
