use crate::meshes::{random_soup, unit_grid};
use cellgrid3d::mesh::CellMesh;
use cellgrid3d::partitioning::{LocatorConfig, StaticCellLocator};

#[test]
fn every_cell_is_found_within_its_own_bounds() {
    let meshes = [
        unit_grid([6, 5, 4], false),
        unit_grid([4, 4, 4], true),
        random_soup(400, 50, 7),
    ];

    for mesh in meshes {
        for config in [
            LocatorConfig::default(),
            LocatorConfig::default().with_cells_per_bucket(1),
            LocatorConfig::default().with_divisions([1, 1, 1]),
            LocatorConfig::default().with_large_ids(true),
        ] {
            let mut locator = StaticCellLocator::with_config(config);
            locator.set_mesh(mesh.clone());

            for cell_id in 0..mesh.num_cells() {
                let found = locator.find_cells_within_bounds(&mesh.cell_aabb(cell_id));
                assert!(
                    found.contains(&cell_id),
                    "The cell {} is missing from its own bounds query.",
                    cell_id
                );
                assert!(locator.inside_cell_bounds(&mesh.cell_aabb(cell_id).center(), cell_id));
            }
        }
    }
}

#[test]
fn range_queries_are_deduplicated() {
    let mesh = unit_grid([4, 4, 4], true);
    let mut locator =
        StaticCellLocator::with_config(LocatorConfig::default().with_cells_per_bucket(1));
    locator.set_mesh(mesh.clone());

    let mut found = locator.find_cells_within_bounds(&mesh.aabb());
    let len = found.len();
    found.sort_unstable();
    found.dedup();
    assert_eq!(found.len(), len);
    assert_eq!(len, mesh.num_cells());

    let far = cellgrid3d::bounding_volume::Aabb::new(
        cellgrid3d::math::Point::new(10.0, 10.0, 10.0),
        cellgrid3d::math::Point::new(11.0, 11.0, 11.0),
    );
    assert!(locator.find_cells_within_bounds(&far).is_empty());
}
