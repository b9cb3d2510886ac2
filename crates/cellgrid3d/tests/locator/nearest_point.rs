use crate::meshes::{random_point, random_soup, unit_grid};
use cellgrid3d::math::{Point, Real};
use cellgrid3d::mesh::{CellMesh, UnstructuredMesh};
use cellgrid3d::partitioning::{LocatorConfig, StaticCellLocator};
use cellgrid3d::shape::LocatableCell;

fn brute_force_dist2(mesh: &UnstructuredMesh, pt: &Point<Real>) -> Real {
    (0..mesh.num_cells())
        .map(|cell_id| mesh.cell(cell_id).project_point(pt).dist2)
        .fold(Real::INFINITY, Real::min)
}

#[test]
fn closest_points_match_brute_force() {
    let meshes = [unit_grid([3, 4, 2], true), random_soup(200, 20, 13)];
    let mut rng = oorandom::Rand32::new(37);

    for mesh in meshes {
        let aabb = mesh.aabb();
        let enlarged = aabb.loosened(aabb.diagonal_length() * 0.5);

        for config in [
            LocatorConfig::default(),
            LocatorConfig::default().with_cells_per_bucket(2),
            LocatorConfig::default().with_divisions([1, 1, 1]),
        ] {
            let mut locator = StaticCellLocator::with_config(config);
            locator.set_mesh(mesh.clone());

            for _ in 0..200 {
                let pt = random_point(&mut rng, &enlarged);
                let expected = brute_force_dist2(&mesh, &pt);

                let closest = locator.find_closest_point(&pt).unwrap();
                assert_relative_eq!(closest.dist2, expected, epsilon = 1.0e-4);
                assert_relative_eq!(
                    (closest.point - pt).norm_squared(),
                    closest.dist2,
                    epsilon = 1.0e-4
                );

                let radius = 3.0 * rng.rand_float() as Real;
                // Skip the radii too close to the exact distance to be decided reliably.
                if (expected.sqrt() - radius).abs() < 1.0e-3 {
                    continue;
                }

                match locator.find_closest_point_within_radius(&pt, radius) {
                    Some(within) => {
                        assert!(expected.sqrt() < radius);
                        assert_relative_eq!(within.dist2, expected, epsilon = 1.0e-4);
                    }
                    None => assert!(expected.sqrt() > radius),
                }
            }
        }
    }
}

#[test]
fn no_cell_within_radius() {
    let mesh = unit_grid([2, 2, 2], false);
    let mut locator = StaticCellLocator::with_mesh(mesh);
    let pt = Point::new(5.0, 1.0, 1.0);

    assert!(locator.find_closest_point_within_radius(&pt, 2.9).is_none());
    assert!(locator.find_closest_point_within_radius(&pt, -1.0).is_none());

    let touching = locator.find_closest_point_within_radius(&pt, 3.1).unwrap();
    assert_relative_eq!(touching.dist2, 9.0, epsilon = 1.0e-5);
    assert_relative_eq!(touching.point, Point::new(2.0, 1.0, 1.0), epsilon = 1.0e-5);
    assert!(!touching.inside);
}
