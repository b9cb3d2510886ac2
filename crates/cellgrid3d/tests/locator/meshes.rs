use cellgrid3d::bounding_volume::Aabb;
use cellgrid3d::math::{Point, Real, Vector};
use cellgrid3d::mesh::{CellKind, UnstructuredMesh};
use std::sync::Arc;

pub fn random_point(rng: &mut oorandom::Rand32, aabb: &Aabb) -> Point<Real> {
    let extents = aabb.extents();
    Point::new(
        aabb.mins.x + extents.x * rng.rand_float() as Real,
        aabb.mins.y + extents.y * rng.rand_float() as Real,
        aabb.mins.z + extents.z * rng.rand_float() as Real,
    )
}

pub fn unit_grid(dims: [usize; 3], tetrahedralize: bool) -> Arc<UnstructuredMesh> {
    let mesh = if tetrahedralize {
        UnstructuredMesh::tetrahedralized_grid(Point::origin(), Vector::repeat(1.0), dims)
    } else {
        UnstructuredMesh::voxel_grid(Point::origin(), Vector::repeat(1.0), dims)
    };
    Arc::new(mesh)
}

/// Random triangles of various sizes inside `[0, 10]^3`, mixed with a few tetrahedra.
pub fn random_soup(
    num_triangles: usize,
    num_tetrahedra: usize,
    seed: u64,
) -> Arc<UnstructuredMesh> {
    let mut rng = oorandom::Rand32::new(seed);
    let domain = Aabb::new(Point::origin(), Point::new(10.0, 10.0, 10.0));
    let mut points = Vec::new();
    let mut cells = Vec::new();

    for (kind, count) in [
        (CellKind::Triangle, num_triangles),
        (CellKind::Tetrahedron, num_tetrahedra),
    ] {
        for _ in 0..count {
            let center = random_point(&mut rng, &domain);
            let size = 0.2 + 2.0 * rng.rand_float() as Real;
            let first = points.len() as u32;

            for _ in 0..kind.num_points() {
                let offset = Vector::new(
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                );
                points.push(center + offset * size);
            }

            cells.push((kind, (first..first + kind.num_points() as u32).collect::<Vec<_>>()));
        }
    }

    Arc::new(UnstructuredMesh::try_new(points, cells).unwrap())
}
