//! The mesh abstraction the locator indexes.

pub use self::cell_mesh::CellMesh;
pub use self::modification_stamp::ModificationStamp;
pub use self::unstructured_mesh::{CellKind, MeshError, UnstructuredMesh};

mod cell_mesh;
mod modification_stamp;
mod unstructured_mesh;
