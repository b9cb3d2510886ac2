use super::cell_index::CellProcessor;
use super::LocatorId;
use crate::math::{Point, Real, DIM};
use crate::mesh::CellMesh;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// A quad mesh of the boundary of the region covered by the non-empty bins
/// of a locator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BinRepresentation {
    /// The vertices of the quads.
    pub vertices: Vec<Point<Real>>,
    /// The quads, as indices into `vertices`, counter-clockwise when seen
    /// from outside of the covered region.
    pub quads: Vec<[u32; 4]>,
}

impl<T: LocatorId, M: CellMesh> CellProcessor<'_, T, M> {
    pub fn generate_representation(&self) -> BinRepresentation {
        let divisions = self.grid.divisions();
        let is_occupied = |ijk: [isize; DIM]| {
            (0..DIM).all(|i| ijk[i] >= 0 && (ijk[i] as usize) < divisions[i])
                && self
                    .cells
                    .num_cells_in_bin(self.grid.bin_id(ijk.map(|i| i as usize)))
                    > 0
        };

        let mut result = BinRepresentation::default();
        let mut vertex_ids: HashMap<[usize; DIM], u32> = HashMap::new();

        for k in 0..divisions[2] {
            for j in 0..divisions[1] {
                for i in 0..divisions[0] {
                    let ijk = [i as isize, j as isize, k as isize];
                    if !is_occupied(ijk) {
                        continue;
                    }

                    for axis in 0..DIM {
                        for side in [-1, 1] {
                            let mut neighbor = ijk;
                            neighbor[axis] += side;
                            if is_occupied(neighbor) {
                                continue;
                            }

                            let mut face = Self::face_lattice_points([i, j, k], axis, side > 0);
                            if side < 0 {
                                face.reverse();
                            }

                            let quad = face.map(|lattice| {
                                *vertex_ids.entry(lattice).or_insert_with(|| {
                                    result.vertices.push(self.grid.lattice_point(lattice));
                                    (result.vertices.len() - 1) as u32
                                })
                            });
                            result.quads.push(quad);
                        }
                    }
                }
            }
        }

        result
    }

    // The corners of a face orthogonal to `axis`, counter-clockwise around
    // the positive direction of `axis`.
    fn face_lattice_points(ijk: [usize; DIM], axis: usize, upper: bool) -> [[usize; DIM]; 4] {
        let u = (axis + 1) % DIM;
        let v = (axis + 2) % DIM;
        let mut base = ijk;
        if upper {
            base[axis] += 1;
        }

        let corner = |du: usize, dv: usize| {
            let mut result = base;
            result[u] += du;
            result[v] += dv;
            result
        };

        [corner(0, 0), corner(1, 0), corner(1, 1), corner(0, 1)]
    }
}
