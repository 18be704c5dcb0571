//! Tessellation tests.
//!
//! These tests verify that outlines are sampled adaptively, that every edge
//! starts and ends on its outline points, and that the recursion cap bounds
//! the output.

mod common;

use common::{approx_eq, unit_circle, unit_square};
use glam::Vec2;
use tessera_geometry::{
    CurveInterpolator, CurveSample, MAX_RECURSE_LIMIT, SegmentCurve, ShapeBuilder,
    TessellatedShape, TessellationParams, tessellate_curve,
};

// ====================
// Edge endpoints
// ====================

#[test]
fn test_edges_start_and_end_on_outline_points() {
    let shape = ShapeBuilder::new()
        .move_to(Vec2::ZERO)
        .cubic_to(Vec2::new(1.0, 2.0), Vec2::new(3.0, -2.0), Vec2::new(4.0, 0.0))
        .arc_to(2.0, true, Vec2::new(4.0, 3.0))
        .quad_to(Vec2::new(2.0, 5.0), Vec2::new(0.0, 3.0))
        .build();
    let tessellated = TessellatedShape::build(&shape, &TessellationParams::default());
    let outline = &shape.outlines()[0];

    for edge in tessellated.outlines()[0].edges() {
        let start = outline.points()[edge.start_point_id()].position;
        let end = outline.points()[edge.end_point_id()].position;
        assert!(approx_eq(edge.first().position, start));
        assert!(approx_eq(edge.last().position, end));
        assert_eq!(edge.first().time, 0.0);
        assert_eq!(edge.last().time, 1.0);
    }
}

#[test]
fn test_times_strictly_increase() {
    let tessellated = TessellatedShape::build(&unit_circle(), &TessellationParams::default());
    for edge in tessellated.outlines()[0].edges() {
        assert!(edge.points().windows(2).all(|w| w[0].time < w[1].time));
    }
}

#[test]
fn test_times_strictly_increase_past_the_recursion_limit() {
    // Turning rate grows without bound towards t = 1.
    let spike = SegmentCurve::custom(|t| {
        let d = (1.0 - t).max(1e-7);
        CurveSample {
            position: Vec2::new(t, 0.0),
            p_t: Vec2::X,
            p_tt: Vec2::new(0.0, 1.0 / (d * d)),
        }
    });
    let interpolator = CurveInterpolator::new(Vec2::ZERO, Vec2::X, &spike);
    let threshold = TessellationParams::default().curvature_threshold();
    let points = tessellate_curve(&interpolator, 30, threshold);

    assert!(points.len() > 2);
    assert!(points.len() <= 1 + (1 << MAX_RECURSE_LIMIT));
    assert!(points.windows(2).all(|w| w[0].time < w[1].time));
    assert_eq!(points.last().map(|p| p.time), Some(1.0));
}

// ====================
// Sample counts
// ====================

#[test]
fn test_straight_edges_have_two_points() {
    let tessellated = TessellatedShape::build(&unit_square(), &TessellationParams::default());
    let outline = &tessellated.outlines()[0];
    assert_eq!(outline.edges().len(), 4);
    assert!(outline.edges().iter().all(|e| e.points().len() == 2));
    assert_eq!(outline.polygon().count(), 4);
}

#[test]
fn test_recursion_cap_bounds_point_count() {
    let wiggle = SegmentCurve::Bezier(vec![
        Vec2::new(0.0, 10.0),
        Vec2::new(1.0, -10.0),
        Vec2::new(2.0, 10.0),
        Vec2::new(3.0, -10.0),
    ]);
    let interpolator = CurveInterpolator::new(Vec2::ZERO, Vec2::new(4.0, 0.0), &wiggle);
    for max_recurse in 0..6 {
        let points = tessellate_curve(&interpolator, max_recurse, 1e-3);
        assert!(points.len() >= 2);
        assert!(points.len() <= (1 << max_recurse) + 1);
    }
}

#[test]
fn test_circle_at_sixty_samples_per_revolution() {
    let params = TessellationParams::default().with_samples_per_revolution(60);
    let tessellated = TessellatedShape::build(&unit_circle(), &params);
    let outline = &tessellated.outlines()[0];
    // Half circles bisected until each interval turns less than 6 degrees.
    assert!(outline.edges().iter().all(|e| e.points().len() == 33));
    assert_eq!(outline.polygon().count(), 64);
    assert!(
        outline
            .polygon()
            .all(|p| (p.position.length() - 1.0).abs() < 1e-4)
    );
}

#[test]
fn test_point_count_grows_with_samples_per_revolution() {
    let counts: Vec<usize> = [4, 8, 16, 32, 64]
        .into_iter()
        .map(|spr| {
            let params = TessellationParams::default().with_samples_per_revolution(spr);
            TessellatedShape::build(&unit_circle(), &params).point_count()
        })
        .collect();
    assert!(counts.windows(2).all(|w| w[0] <= w[1]), "{:?}", counts);
    assert!(counts[0] < counts[4]);
}

#[test]
fn test_bounds_cover_all_points() {
    let tessellated = TessellatedShape::build(&unit_circle(), &TessellationParams::default());
    let bounds = tessellated.bounds();
    assert!(
        tessellated.outlines()[0]
            .polygon()
            .all(|p| bounds.contains(p.position))
    );
    assert!((bounds.size() - Vec2::splat(2.0)).abs().max_element() < 1e-3);
}

#[test]
fn test_single_point_outline_has_degenerate_closing_edge() {
    let shape = ShapeBuilder::new().move_to(Vec2::ONE).build();
    let tessellated = TessellatedShape::build(&shape, &TessellationParams::default());
    let outline = &tessellated.outlines()[0];
    assert_eq!(outline.edges().len(), 1);
    assert!(outline.last_edge().is_none());
    let closing = outline.closing_edge().map(|e| e.points().len());
    assert_eq!(closing, Some(2));
}
