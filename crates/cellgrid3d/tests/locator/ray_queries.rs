use crate::meshes::{random_point, random_soup, unit_grid};
use cellgrid3d::bounding_volume::Aabb;
use cellgrid3d::math::Real;
use cellgrid3d::mesh::{CellMesh, UnstructuredMesh};
use cellgrid3d::partitioning::{LocatorConfig, StaticCellLocator};
use cellgrid3d::query::Segment;
use cellgrid3d::shape::LocatableCell;

// The cells whose bounding box is crossed by the segment.
fn brute_force_candidates(
    mesh: &UnstructuredMesh,
    segment: &Segment,
    tolerance: Real,
) -> Vec<usize> {
    (0..mesh.num_cells())
        .filter(|cell_id| mesh.cell_aabb(*cell_id).intersects_segment(segment, tolerance))
        .collect()
}

// The hits of every cell whose bounding box is crossed by the segment.
fn brute_force_hits(
    mesh: &UnstructuredMesh,
    segment: &Segment,
    tolerance: Real,
) -> Vec<(usize, Real)> {
    brute_force_candidates(mesh, segment, tolerance)
        .into_iter()
        .filter_map(|cell_id| {
            mesh.cell(cell_id)
                .intersect_with_segment(segment, tolerance)
                .map(|hit| (cell_id, hit.t))
        })
        .collect()
}

fn random_segments(aabb: &Aabb, count: usize, seed: u64) -> Vec<Segment> {
    let mut rng = oorandom::Rand32::new(seed);
    let enlarged = aabb.loosened(aabb.diagonal_length() * 0.25);
    (0..count)
        .map(|_| {
            Segment::new(
                random_point(&mut rng, &enlarged),
                random_point(&mut rng, &enlarged),
            )
        })
        .collect()
}

#[test]
fn segment_queries_match_brute_force() {
    let meshes = [unit_grid([5, 4, 3], true), random_soup(300, 30, 11)];

    for mesh in meshes {
        let segments = random_segments(&mesh.aabb(), 200, 3);

        for (config, tolerance) in [
            (LocatorConfig::default(), 0.0),
            (LocatorConfig::default().with_cells_per_bucket(1), 0.0),
            (LocatorConfig::default().with_divisions([7, 1, 3]), 0.0),
            (LocatorConfig::default(), 0.05),
            (LocatorConfig::default().with_cells_per_bucket(1), 0.05),
            (LocatorConfig::default().with_divisions([7, 1, 3]), 0.2),
        ] {
            let mut locator = StaticCellLocator::with_config(config);
            locator.set_mesh(mesh.clone());

            for segment in &segments {
                let expected = brute_force_hits(&mesh, segment, tolerance);

                // Closest hit.
                let closest = locator.intersect_with_line(segment, tolerance);
                let expected_t = expected
                    .iter()
                    .map(|(_, t)| *t)
                    .min_by(|a, b| a.total_cmp(b));
                assert_eq!(closest.is_some(), expected_t.is_some());

                if let (Some(hit), Some(expected_t)) = (closest, expected_t) {
                    assert_relative_eq!(hit.t, expected_t, epsilon = 1.0e-5);
                    let own_hit = mesh
                        .cell(hit.cell_id)
                        .intersect_with_segment(segment, tolerance)
                        .unwrap();
                    assert_relative_eq!(own_hit.t, hit.t, epsilon = 1.0e-5);
                }

                // All the hits.
                let all = locator.intersect_with_line_all(segment, tolerance);
                assert!(all.windows(2).all(|w| w[0].t <= w[1].t));

                let mut found: Vec<_> = all.iter().map(|hit| hit.cell_id).collect();
                let mut expected_ids: Vec<_> = expected.iter().map(|(id, _)| *id).collect();
                found.sort_unstable();
                expected_ids.sort_unstable();
                assert_eq!(found, expected_ids);

                // Candidate cells.
                let mut candidates = locator.find_cells_along_line(segment, tolerance);
                candidates.sort_unstable();
                assert_eq!(candidates, brute_force_candidates(&mesh, segment, tolerance));
            }
        }
    }
}

#[test]
fn segments_missing_the_mesh() {
    let mesh = unit_grid([3, 3, 3], false);
    let mut locator = StaticCellLocator::with_mesh(mesh);
    let above = Segment::new(
        cellgrid3d::math::Point::new(-1.0, -1.0, 5.0),
        cellgrid3d::math::Point::new(4.0, 4.0, 5.0),
    );

    assert!(locator.intersect_with_line(&above, 0.0).is_none());
    assert!(locator.intersect_with_line_all(&above, 0.0).is_empty());
    assert!(locator.find_cells_along_line(&above, 0.0).is_empty());
}
