use crate::meshes::{random_point, unit_grid};
use cellgrid3d::math::{Point, Real};
use cellgrid3d::mesh::{CellKind, CellMesh, UnstructuredMesh};
use cellgrid3d::partitioning::StaticCellLocator;
use cellgrid3d::shape::LocatableCell;
use std::sync::Arc;

#[test]
fn points_inside_a_single_tetrahedron() {
    let vertices = [
        Point::new(0.0, 0.0, 0.0),
        Point::new(2.0, 0.1, 0.0),
        Point::new(0.3, 1.5, 0.2),
        Point::new(0.5, 0.4, 3.0),
    ];
    let mesh = UnstructuredMesh::try_new(
        vertices.to_vec(),
        [(CellKind::Tetrahedron, vec![0, 1, 2, 3])],
    )
    .unwrap();
    let mut locator = StaticCellLocator::with_mesh(Arc::new(mesh));
    let mut rng = oorandom::Rand32::new(17);

    for _ in 0..1000 {
        let weights: [Real; 4] = core::array::from_fn(|_| 0.05 + rng.rand_float() as Real);
        let total: Real = weights.iter().sum();
        let pt = vertices
            .iter()
            .zip(weights.iter())
            .fold(Point::origin(), |acc, (v, w)| acc + v.coords * (*w / total));

        assert_eq!(locator.find_cell(&pt), Some(0));
    }

    for far in [
        Point::new(100.0, 0.0, 0.0),
        Point::new(-5.0, -5.0, -5.0),
        Point::new(0.5, 0.4, 30.0),
    ] {
        assert_eq!(locator.find_cell(&far), None);
    }
}

#[test]
fn points_inside_a_voxel_grid() {
    let dims = [5, 4, 3];
    let mut locator = StaticCellLocator::with_mesh(unit_grid(dims, false));
    let mut rng = oorandom::Rand32::new(23);

    for _ in 0..1000 {
        let ijk: [usize; 3] = core::array::from_fn(|i| rng.rand_range(0..dims[i] as u32) as usize);
        let pt = Point::new(
            ijk[0] as Real + 0.05 + 0.9 * rng.rand_float() as Real,
            ijk[1] as Real + 0.05 + 0.9 * rng.rand_float() as Real,
            ijk[2] as Real + 0.05 + 0.9 * rng.rand_float() as Real,
        );
        let expected = ijk[0] + ijk[1] * dims[0] + ijk[2] * dims[0] * dims[1];
        assert_eq!(locator.find_cell(&pt), Some(expected));
    }

    assert_eq!(locator.find_cell(&Point::new(5.5, 1.0, 1.0)), None);
    assert_eq!(locator.find_cell(&Point::new(1.0, -0.5, 1.0)), None);
}

#[test]
fn points_inside_a_tetrahedralized_grid() {
    let dims = [4, 3, 3];
    let mesh = unit_grid(dims, true);
    let mut locator = StaticCellLocator::with_mesh(mesh.clone());
    let mut rng = oorandom::Rand32::new(29);
    let aabb = mesh.aabb();
    let mut weights = [0.0; 8];

    for _ in 0..1000 {
        let pt = random_point(&mut rng, &aabb);
        let cell_id = locator
            .find_cell(&pt)
            .expect("Every point of the grid lies in a tetrahedron.");

        // The 6 tetrahedra of a voxel are consecutive.
        let ijk: [usize; 3] =
            core::array::from_fn(|i| (pt[i].floor() as usize).min(dims[i] - 1));
        let expected_voxel = ijk[0] + ijk[1] * dims[0] + ijk[2] * dims[0] * dims[1];
        let tolerance = locator.index().unwrap().tolerance();
        let proj = mesh
            .cell(cell_id)
            .evaluate_position(&pt, tolerance, &mut weights);
        assert!(proj.inside);

        if pt.iter().all(|c| (*c - c.round()).abs() > 1.0e-3) {
            assert_eq!(cell_id / 6, expected_voxel);
        }
    }
}
