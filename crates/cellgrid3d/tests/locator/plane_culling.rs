use crate::meshes::{random_point, random_soup, unit_grid};
use cellgrid3d::math::{Real, Vector};
use cellgrid3d::mesh::CellMesh;
use cellgrid3d::partitioning::{LocatorConfig, StaticCellLocator};

#[test]
fn plane_queries_match_brute_force() {
    let meshes = [
        unit_grid([6, 5, 4], false),
        unit_grid([3, 3, 3], true),
        random_soup(500, 0, 5),
    ];
    let mut rng = oorandom::Rand32::new(31);

    for mesh in meshes {
        let aabb = mesh.aabb();

        for config in [
            LocatorConfig::default(),
            LocatorConfig::default().with_cells_per_bucket(1),
            LocatorConfig::default().with_large_ids(true),
        ] {
            let mut locator = StaticCellLocator::with_config(config);
            locator.set_mesh(mesh.clone());

            for _ in 0..100 {
                let origin = random_point(&mut rng, &aabb);
                let normal = Vector::new(
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                    rng.rand_float() as Real - 0.5,
                );
                let unit_normal = normal.normalize();
                let tolerance = 0.01 * rng.rand_float() as Real;

                let found = locator.find_cells_along_plane(&origin, &normal, tolerance);
                let expected: Vec<_> = (0..mesh.num_cells())
                    .filter(|cell_id| {
                        mesh.cell_aabb(*cell_id)
                            .intersects_plane(&origin, &unit_normal, tolerance)
                    })
                    .collect();

                assert_eq!(found, expected);
            }
        }
    }
}

#[test]
fn degenerate_and_distant_planes() {
    let mesh = unit_grid([4, 4, 4], false);
    let mut locator = StaticCellLocator::with_mesh(mesh);
    let origin = cellgrid3d::math::Point::new(2.0, 2.0, 2.0);

    assert!(locator
        .find_cells_along_plane(&origin, &Vector::zeros(), 0.0)
        .is_empty());

    let far = cellgrid3d::math::Point::new(0.0, 0.0, 100.0);
    assert!(locator
        .find_cells_along_plane(&far, &Vector::z(), 0.0)
        .is_empty());

    // The plane z = 1.5 crosses the second layer of voxels only.
    let layer = locator.find_cells_along_plane(
        &cellgrid3d::math::Point::new(0.0, 0.0, 1.5),
        &Vector::new(0.0, 0.0, 3.0),
        0.0,
    );
    assert_eq!(layer, (16..32).collect::<Vec<_>>());
}
