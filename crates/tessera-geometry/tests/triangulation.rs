//! Triangulation and fill tests.
//!
//! These tests verify winding numbers, component grouping, boundary
//! extraction and the split triangulation on small shapes whose regions are
//! known exactly.

mod common;

use common::{
    EPSILON, adjacent_squares, annulus, bow_tie, cornered_squares, overlapping_squares,
    regular_polygon, square, touching_lobes, unit_circle, unit_square,
};
use glam::Vec2;
use tessera_core::alloc::HashSet;
use tessera_geometry::{
    ContourId, FillRule, FilledComponent, Outline, PointKind, Shape, TessellatedShape,
    TessellationParams, Triangulation, filled_components,
};

fn triangulate(shape: &Shape) -> Triangulation {
    tessera_core::logging::init_for_tests();
    let tessellated = TessellatedShape::build(shape, &TessellationParams::default());
    Triangulation::build(&tessellated)
}

fn area(triangulation: &Triangulation, component: &FilledComponent) -> f32 {
    component
        .triangles()
        .map(|[a, b, c]| {
            let (a, b, c) = (
                triangulation.position(a),
                triangulation.position(b),
                triangulation.position(c),
            );
            0.5 * (b - a).perp_dot(c - a)
        })
        .sum()
}

fn windings(triangulation: &Triangulation) -> Vec<i32> {
    triangulation.components().keys().copied().collect()
}

// ====================
// Windings
// ====================

#[test]
fn test_convex_polygons_form_one_component() {
    for sides in 3..10 {
        let triangulation = triangulate(&regular_polygon(sides));
        assert_eq!(windings(&triangulation), vec![1]);
        assert!(triangulation.induced_points().is_empty());
        assert!(triangulation.winding_zero_bounded().is_none());
        let component = triangulation.component(1).map(FilledComponent::triangle_count);
        assert_eq!(component, Some(sides as usize - 2));
    }
}

#[test]
fn test_clockwise_outline_has_negative_winding() {
    let shape = Shape::from_outlines(vec![common::clockwise_square(Vec2::ZERO, 1.0)]);
    let triangulation = triangulate(&shape);
    assert_eq!(windings(&triangulation), vec![-1]);
}

#[test]
fn test_overlapping_squares() {
    let triangulation = triangulate(&overlapping_squares());
    assert_eq!(windings(&triangulation), vec![1, 2]);
    assert_eq!(triangulation.induced_points().len(), 2);

    let overlap = &triangulation.components()[&2];
    assert_eq!(overlap.triangle_count(), 2);
    assert!((area(&triangulation, overlap) - 1.0).abs() < EPSILON);
    let single = &triangulation.components()[&1];
    assert!((area(&triangulation, single) - 6.0).abs() < EPSILON);

    for point in triangulation.induced_points() {
        let weight: f32 = point.sources().iter().map(|(_, w)| w).sum();
        assert!((weight - 1.0).abs() < EPSILON);
    }
}

#[test]
fn test_bow_tie_lobes_have_opposite_windings() {
    let triangulation = triangulate(&bow_tie());
    assert_eq!(windings(&triangulation), vec![-1, 1]);
    assert_eq!(triangulation.induced_points().len(), 1);
    assert_eq!(triangulation.induced_points()[0].position, Vec2::ONE);
    for component in triangulation.components().values() {
        assert_eq!(component.triangle_count(), 1);
        assert!((area(&triangulation, component) - 1.0).abs() < EPSILON);
    }
}

#[test]
fn test_lobes_touching_at_a_vertex() {
    let triangulation = triangulate(&touching_lobes());
    assert_eq!(windings(&triangulation), vec![-1, 1]);
    assert!(triangulation.winding_zero_bounded().is_none());

    let left = &triangulation.components()[&1];
    let right = &triangulation.components()[&-1];
    assert!((area(&triangulation, left) - 3.0).abs() < EPSILON);
    assert!((area(&triangulation, right) - 1.5).abs() < EPSILON);

    let corners = triangulation.unbounded_points();
    let size = corners[2] - corners[0];
    let outside = area(&triangulation, triangulation.winding_zero_unbounded());
    assert!((outside - (size.x * size.y - 4.5)).abs() < 1e-3);
}

#[test]
fn test_collinear_overlaps_cancel_or_stack() {
    let adjacent = triangulate(&adjacent_squares());
    assert_eq!(windings(&adjacent), vec![1]);
    assert!(adjacent.winding_zero_bounded().is_none());
    assert!((area(&adjacent, &adjacent.components()[&1]) - 8.0).abs() < EPSILON);

    let cornered = triangulate(&cornered_squares());
    assert_eq!(windings(&cornered), vec![1, 2]);
    assert!((area(&cornered, &cornered.components()[&1]) - 3.0).abs() < EPSILON);
    assert!((area(&cornered, &cornered.components()[&2]) - 1.0).abs() < EPSILON);
}

#[test]
fn test_annulus_has_bounded_hole() {
    let triangulation = triangulate(&annulus());
    assert_eq!(windings(&triangulation), vec![1]);

    let ring = &triangulation.components()[&1];
    assert_eq!(ring.triangle_count(), 8);
    assert!((area(&triangulation, ring) - 12.0).abs() < EPSILON);

    let hole = triangulation.winding_zero_bounded();
    assert!(hole.is_some_and(|h| h.triangle_count() == 2));
    assert!(triangulation.component(0).is_some());
}

#[test]
fn test_triangles_tile_the_bounding_box() {
    let shapes = [
        unit_square(),
        overlapping_squares(),
        annulus(),
        bow_tie(),
        touching_lobes(),
        adjacent_squares(),
        cornered_squares(),
    ];
    for shape in shapes {
        let triangulation = triangulate(&shape);
        let corners = triangulation.unbounded_points();
        let size = corners[2] - corners[0];
        let total: f32 = triangulation
            .all_components()
            .map(|c| area(&triangulation, c))
            .sum();
        assert!((total - size.x * size.y).abs() < 1e-3, "{} vs {}", total, size.x * size.y);
        assert!(
            triangulation
                .all_components()
                .flat_map(FilledComponent::triangles)
                .all(|[a, b, c]| {
                    let (a, b, c) = (
                        triangulation.position(a),
                        triangulation.position(b),
                        triangulation.position(c),
                    );
                    (b - a).perp_dot(c - a) > 0.0
                })
        );
    }
}

#[test]
fn test_unit_circle_golden() {
    let tessellated = TessellatedShape::build(
        &unit_circle(),
        &TessellationParams::default().with_samples_per_revolution(60),
    );
    let triangulation = Triangulation::build(&tessellated);
    assert_eq!(triangulation.points().len(), 64);
    assert!(triangulation.induced_points().is_empty());
    assert!(triangulation.winding_zero_bounded().is_none());
    assert_eq!(windings(&triangulation), vec![1]);

    let filled: Vec<_> = filled_components(&triangulation, &FillRule::OddEven).collect();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].triangle_count(), 62);
    assert!(triangulation.winding_zero_unbounded().triangle_count() > 0);
}

#[test]
fn test_empty_shape_triangulates_box() {
    let triangulation = triangulate(&Shape::new());
    assert!(triangulation.components().is_empty());
    assert!(triangulation.winding_zero_bounded().is_none());
    let outside = triangulation.winding_zero_unbounded();
    assert!((area(&triangulation, outside) - 4.0).abs() < EPSILON);
}

#[test]
fn test_repeated_point_is_merged() {
    let shape = Shape::from_outlines(vec![Outline::polygon([
        Vec2::ZERO,
        Vec2::X,
        Vec2::X,
        Vec2::ONE,
        Vec2::Y,
    ])]);
    let triangulation = triangulate(&shape);
    assert_eq!(triangulation.component(1).map(FilledComponent::triangle_count), Some(2));
}

// ====================
// Point table
// ====================

#[test]
fn test_point_table_layout() {
    let triangulation = triangulate(&overlapping_squares());
    assert_eq!(triangulation.points().len(), 8);
    assert_eq!(triangulation.point_kind(7), PointKind::Original);
    assert_eq!(triangulation.point_kind(8), PointKind::Unbounded);
    assert_eq!(triangulation.point_kind(11), PointKind::Unbounded);
    assert_eq!(triangulation.point_kind(12), PointKind::Induced);
    assert_eq!(triangulation.positions().len(), triangulation.point_count());
    assert_eq!(triangulation.position(8), triangulation.unbounded_points()[0]);
    assert!(triangulation.points().iter().all(|p| p.outline_id < 2 && p.edge_id < 4));
}

// ====================
// Boundaries
// ====================

#[test]
fn test_square_boundary_runs_counter_clockwise() {
    let triangulation = triangulate(&unit_square());
    let component = &triangulation.components()[&1];
    let edges = component.boundary_edges();
    assert_eq!(edges.len(), 4);
    assert!(edges.iter().all(|e| e.neighbor_winding == Some(0)));
    assert!(edges.iter().all(|e| e.contour == Some(ContourId::Outline(0))));
    // Outline order is counter-clockwise, so every edge steps to the next point.
    assert!(edges.iter().all(|e| e.end == (e.start + 1) % 4));

    assert_eq!(component.boundary_contours().len(), 1);
    assert_eq!(component.boundary_contours()[0].len(), 4);
    assert_eq!(component.component_ranges(), &[0..6]);
}

#[test]
fn test_annulus_boundary_has_two_contours() {
    let triangulation = triangulate(&annulus());
    let ring = &triangulation.components()[&1];
    assert_eq!(ring.boundary_edges().len(), 8);
    assert_eq!(ring.boundary_contours().len(), 2);
}

#[test]
fn test_disjoint_pieces_get_separate_ranges() {
    let shape = Shape::from_outlines(vec![
        square(Vec2::ZERO, 1.0),
        square(Vec2::new(3.0, 0.0), 1.0),
    ]);
    let triangulation = triangulate(&shape);
    let component = &triangulation.components()[&1];
    assert_eq!(component.component_ranges().len(), 2);
    assert_eq!(component.split_component_ranges().len(), 2);
    assert_eq!(component.boundary_contours().len(), 2);
}

#[test]
fn test_split_triangles_never_lie_on_boundary() {
    for shape in [unit_square(), overlapping_squares(), annulus(), bow_tie()] {
        let triangulation = triangulate(&shape);
        for component in triangulation.all_components() {
            let boundary: HashSet<u32> = component
                .boundary_edges()
                .iter()
                .flat_map(|e| [e.start, e.end])
                .collect();
            let split = component.split_indices();
            assert_eq!(split.len() % 3, 0);
            assert!(split.iter().all(|&i| (i as usize) < triangulation.point_count()));
            assert!(
                split
                    .chunks_exact(3)
                    .all(|t| t.iter().any(|i| !boundary.contains(i)))
            );
            let split_area: f32 = split
                .chunks_exact(3)
                .map(|t| {
                    let (a, b, c) = (
                        triangulation.position(t[0]),
                        triangulation.position(t[1]),
                        triangulation.position(t[2]),
                    );
                    0.5 * (b - a).perp_dot(c - a)
                })
                .sum();
            assert!((split_area - area(&triangulation, component)).abs() < 1e-3);
        }
    }
}

#[test]
fn test_unit_square_split_triangulation() {
    let triangulation = triangulate(&unit_square());
    let component = &triangulation.components()[&1];
    // Both corners-only triangles get a centroid; the shared diagonal a midpoint.
    assert_eq!(component.split_indices().len() / 3, 8);
}

// ====================
// Fill rules and meshes
// ====================

#[test]
fn test_fill_rules_select_components() {
    let nested = Shape::from_outlines(vec![square(Vec2::ZERO, 4.0), square(Vec2::ONE, 2.0)]);
    let triangulation = triangulate(&nested);
    assert_eq!(windings(&triangulation), vec![1, 2]);

    let count = |rule: FillRule| -> usize {
        filled_components(&triangulation, &rule)
            .map(FilledComponent::triangle_count)
            .sum()
    };
    assert_eq!(count(FillRule::NonZero), 10);
    assert_eq!(count(FillRule::OddEven), 8);
    assert_eq!(count(FillRule::AtLeastTwo), 2);
    assert_eq!(count(FillRule::Negative), 0);
}

#[test]
fn test_fill_mesh_marks_boundary_vertices() {
    let mut shape = unit_square();
    let params = TessellationParams::default();

    let plain = shape.fill_mesh(&params, &FillRule::NonZero, false);
    assert_eq!(plain.triangle_count(), 2);
    assert_eq!(plain.vertex_count(), 4);
    assert!(plain.vertices.iter().all(|v| v.boundary == 1.0 && v.winding == 1));

    let smooth = shape.fill_mesh(&params, &FillRule::NonZero, true);
    assert_eq!(smooth.triangle_count(), 8);
    assert_eq!(smooth.vertex_count(), 7);
    assert_eq!(smooth.vertices.iter().filter(|v| v.boundary == 1.0).count(), 4);
}

#[test]
fn test_custom_rule_can_fill_outside() {
    let mut shape = unit_square();
    let mesh = shape.fill_mesh(
        &TessellationParams::default(),
        &FillRule::custom(|w| w == 0),
        false,
    );
    assert!(!mesh.is_empty());
    assert!(mesh.vertices.iter().all(|v| v.winding == 0));
}
