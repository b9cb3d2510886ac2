use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::mesh::{CellMesh, ModificationStamp};
use crate::shape::{MeshCell, Tetrahedron, Triangle, Voxel};
use alloc::vec::Vec;

/// The kind of a cell of an [`UnstructuredMesh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum CellKind {
    /// A triangle, defined by 3 points.
    Triangle,
    /// A tetrahedron, defined by 4 points.
    Tetrahedron,
    /// An axis-aligned hexahedron, defined by 8 points with `x` varying
    /// fastest, then `y`, then `z`.
    Voxel,
}

impl CellKind {
    /// The number of points defining a cell of this kind.
    #[inline]
    pub fn num_points(self) -> usize {
        match self {
            CellKind::Triangle => 3,
            CellKind::Tetrahedron => 4,
            CellKind::Voxel => 8,
        }
    }
}

/// Error raised when adding an inconsistent cell to an [`UnstructuredMesh`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A cell references a point that does not exist.
    #[error("the cell {cell} references the point {point} which does not exist.")]
    InvalidPointId {
        /// The index the cell would have had.
        cell: usize,
        /// The invalid point index.
        point: u32,
    },
    /// A cell has a number of points inconsistent with its kind.
    #[error("the cell {cell} of kind {kind:?} needs {expected} points but {found} were given.")]
    WrongPointCount {
        /// The index the cell would have had.
        cell: usize,
        /// The kind of the cell.
        kind: CellKind,
        /// The number of points required by `kind`.
        expected: usize,
        /// The number of points given.
        found: usize,
    },
}

/// A mesh made of points and of cells of mixed kinds referencing them.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct UnstructuredMesh {
    points: Vec<Point<Real>>,
    kinds: Vec<CellKind>,
    // CSR layout: the points of cell `i` are `connectivity[offsets[i]..offsets[i + 1]]`.
    offsets: Vec<u32>,
    connectivity: Vec<u32>,
    stamp: ModificationStamp,
}

impl UnstructuredMesh {
    /// Creates a mesh with the given points and no cells.
    pub fn new(points: Vec<Point<Real>>) -> Self {
        UnstructuredMesh {
            points,
            kinds: Vec::new(),
            offsets: vec![0],
            connectivity: Vec::new(),
            stamp: ModificationStamp::next(),
        }
    }

    /// Creates a mesh from its points and the kind and point indices of each cell.
    pub fn try_new(
        points: Vec<Point<Real>>,
        cells: impl IntoIterator<Item = (CellKind, Vec<u32>)>,
    ) -> Result<Self, MeshError> {
        let mut result = Self::new(points);
        for (kind, ids) in cells {
            let _ = result.push_cell(kind, &ids)?;
        }
        Ok(result)
    }

    /// Creates a regular grid of `dims[0] x dims[1] x dims[2]` voxels, the
    /// first one having its smallest corner at `origin`.
    pub fn voxel_grid(origin: Point<Real>, spacing: Vector<Real>, dims: [usize; 3]) -> Self {
        let (points, np) = Self::grid_points(origin, spacing, dims);
        let mut result = Self::new(points);

        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let ids = Self::grid_voxel_corners(np, [i, j, k]);
                    result.push_cell_unchecked(CellKind::Voxel, &ids);
                }
            }
        }

        result
    }

    /// Creates a regular grid of voxels, each split into 6 tetrahedra sharing
    /// the voxel's main diagonal.
    pub fn tetrahedralized_grid(
        origin: Point<Real>,
        spacing: Vector<Real>,
        dims: [usize; 3],
    ) -> Self {
        // Each permutation of the axes gives one monotone path from corner 0
        // to corner 7 of the voxel, hence one tetrahedron.
        const AXES_PERMUTATIONS: [[usize; 3]; 6] = [
            [1, 2, 4],
            [1, 4, 2],
            [2, 1, 4],
            [2, 4, 1],
            [4, 1, 2],
            [4, 2, 1],
        ];

        let (points, np) = Self::grid_points(origin, spacing, dims);
        let mut result = Self::new(points);

        for k in 0..dims[2] {
            for j in 0..dims[1] {
                for i in 0..dims[0] {
                    let corners = Self::grid_voxel_corners(np, [i, j, k]);
                    for perm in AXES_PERMUTATIONS {
                        let ids = [
                            corners[0],
                            corners[perm[0]],
                            corners[perm[0] | perm[1]],
                            corners[7],
                        ];
                        result.push_cell_unchecked(CellKind::Tetrahedron, &ids);
                    }
                }
            }
        }

        result
    }

    fn grid_points(
        origin: Point<Real>,
        spacing: Vector<Real>,
        dims: [usize; 3],
    ) -> (Vec<Point<Real>>, [usize; 3]) {
        let np = [dims[0] + 1, dims[1] + 1, dims[2] + 1];
        let mut points = Vec::with_capacity(np[0] * np[1] * np[2]);

        for k in 0..np[2] {
            for j in 0..np[1] {
                for i in 0..np[0] {
                    points.push(Point::new(
                        origin.x + spacing.x * i as Real,
                        origin.y + spacing.y * j as Real,
                        origin.z + spacing.z * k as Real,
                    ));
                }
            }
        }

        (points, np)
    }

    fn grid_voxel_corners(np: [usize; 3], ijk: [usize; 3]) -> [u32; 8] {
        let id = |i: usize, j: usize, k: usize| (i + j * np[0] + k * np[0] * np[1]) as u32;
        let [i, j, k] = ijk;
        [
            id(i, j, k),
            id(i + 1, j, k),
            id(i, j + 1, k),
            id(i + 1, j + 1, k),
            id(i, j, k + 1),
            id(i + 1, j, k + 1),
            id(i, j + 1, k + 1),
            id(i + 1, j + 1, k + 1),
        ]
    }

    /// Appends a cell to this mesh and returns its index.
    pub fn push_cell(&mut self, kind: CellKind, point_ids: &[u32]) -> Result<usize, MeshError> {
        let cell = self.kinds.len();

        if point_ids.len() != kind.num_points() {
            return Err(MeshError::WrongPointCount {
                cell,
                kind,
                expected: kind.num_points(),
                found: point_ids.len(),
            });
        }

        if let Some(point) = point_ids
            .iter()
            .copied()
            .find(|id| *id as usize >= self.points.len())
        {
            return Err(MeshError::InvalidPointId { cell, point });
        }

        self.push_cell_unchecked(kind, point_ids);
        Ok(cell)
    }

    fn push_cell_unchecked(&mut self, kind: CellKind, point_ids: &[u32]) {
        self.kinds.push(kind);
        self.connectivity.extend_from_slice(point_ids);
        self.offsets.push(self.connectivity.len() as u32);
        self.stamp.modified();
    }

    /// The points of this mesh.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// Mutable access to the points of this mesh.
    ///
    /// Marks the mesh as modified.
    #[inline]
    pub fn points_mut(&mut self) -> &mut [Point<Real>] {
        self.stamp.modified();
        &mut self.points
    }

    /// Translates every point of this mesh.
    pub fn translate(&mut self, shift: &Vector<Real>) {
        for pt in self.points_mut() {
            *pt += shift;
        }
    }

    /// The kind of the `cell_id`-th cell.
    #[inline]
    pub fn cell_kind(&self, cell_id: usize) -> CellKind {
        self.kinds[cell_id]
    }

    /// The point indices of the `cell_id`-th cell.
    #[inline]
    pub fn cell_point_ids(&self, cell_id: usize) -> &[u32] {
        let start = self.offsets[cell_id] as usize;
        let end = self.offsets[cell_id + 1] as usize;
        &self.connectivity[start..end]
    }

    #[inline]
    fn point(&self, id: u32) -> Point<Real> {
        self.points[id as usize]
    }
}

impl CellMesh for UnstructuredMesh {
    type Cell = MeshCell;

    #[inline]
    fn num_cells(&self) -> usize {
        self.kinds.len()
    }

    fn cell(&self, cell_id: usize) -> MeshCell {
        let ids = self.cell_point_ids(cell_id);
        match self.kinds[cell_id] {
            CellKind::Triangle => MeshCell::Triangle(Triangle::new(
                self.point(ids[0]),
                self.point(ids[1]),
                self.point(ids[2]),
            )),
            CellKind::Tetrahedron => MeshCell::Tetrahedron(Tetrahedron::new(
                self.point(ids[0]),
                self.point(ids[1]),
                self.point(ids[2]),
                self.point(ids[3]),
            )),
            CellKind::Voxel => MeshCell::Voxel(Voxel::new(self.point(ids[0]), self.point(ids[7]))),
        }
    }

    fn cell_aabb(&self, cell_id: usize) -> Aabb {
        Aabb::from_points(self.cell_point_ids(cell_id).iter().map(|id| self.point(*id)))
    }

    fn aabb(&self) -> Aabb {
        Aabb::from_points(self.connectivity.iter().map(|id| self.point(*id)))
    }

    #[inline]
    fn max_cell_size(&self) -> usize {
        self.kinds
            .iter()
            .map(|kind| kind.num_points())
            .max()
            .unwrap_or(0)
    }

    #[inline]
    fn modification_stamp(&self) -> ModificationStamp {
        self.stamp
    }
}
