//! Shapes Example - Fill and stroke meshes with tessera-geometry
//!
//! This example demonstrates:
//! - Building shapes from lines, Bezier curves and arcs
//! - Filling with different fill rules, with and without anti-aliasing
//! - Stroking with each join and cap style
//!
//! Set `RUST_LOG=tessera_geometry=trace` for per-outline logging. With the
//! `profiling` feature, scopes are served to puffin_viewer on port 8585.

use glam::{Affine2, Vec2};
use std::f32::consts::FRAC_PI_2;
use tessera_core::logging;
use tessera_core::profiling::{ProfilingBackend, init_profiling, is_enabled, new_frame};
use tessera_geometry::{
    CapStyle, FillRule, JoinStyle, Shape, ShapeBuilder, StrokingParameters, TessellationParams,
};

fn badge() -> Shape {
    ShapeBuilder::new()
        .rounded_rect(Vec2::ZERO, Vec2::new(200.0, 120.0), 24.0)
        .circle(Vec2::new(100.0, 60.0), 40.0)
        .star(Vec2::new(100.0, 60.0), 30.0, 12.0, 5)
        .build()
}

fn wave() -> Shape {
    ShapeBuilder::new()
        .move_to(Vec2::ZERO)
        .cubic_to(Vec2::new(40.0, 80.0), Vec2::new(80.0, -80.0), Vec2::new(120.0, 0.0))
        .arc_to(FRAC_PI_2, false, Vec2::new(160.0, 40.0))
        .line_to(Vec2::new(200.0, 40.0))
        .build()
}

fn main() {
    logging::init();
    init_profiling(ProfilingBackend::PuffinHttp);
    tracing::debug!("Profiling scopes recorded: {}", is_enabled());

    let params = TessellationParams::default().with_samples_per_revolution(64);

    let mut badge = badge();
    if let Err(e) = badge.validate() {
        tracing::error!("Invalid shape: {}", e);
        return;
    }

    for (name, rule) in [
        ("non-zero", FillRule::NonZero),
        ("odd-even", FillRule::OddEven),
        ("overlaps", FillRule::AtLeastTwo),
    ] {
        for anti_aliased in [false, true] {
            new_frame();
            let mesh = badge.fill_mesh(&params, &rule, anti_aliased);
            tracing::info!(
                "fill {:<9} aa={:<5} -> {:>4} vertices, {:>4} triangles",
                name,
                anti_aliased,
                mesh.vertex_count(),
                mesh.triangle_count()
            );
        }
    }

    let mut wave = wave();
    for join in [JoinStyle::Bevel, JoinStyle::Miter, JoinStyle::Round] {
        for cap in [CapStyle::Flat, CapStyle::Square, CapStyle::Round] {
            new_frame();
            let stroke = StrokingParameters::with_width(6.0)
                .with_join(join)
                .with_cap(cap)
                .with_close_outline(false);
            let mesh = wave.stroke_mesh(&params, &stroke);
            tracing::info!(
                "stroke {:?}/{:?} -> {:>4} vertices, {:>4} triangles",
                join,
                cap,
                mesh.vertex_count(),
                mesh.triangle_count()
            );
        }
    }
    tracing::info!("{} payloads cached for the wave", wave.cached_payloads());

    // Mirroring keeps the stroke but drops every cached payload.
    wave.transform(&Affine2::from_scale(Vec2::new(-1.0, 1.0)));
    let mesh = wave.stroke_mesh(&params, &StrokingParameters::with_width(6.0));
    tracing::info!(
        "mirrored closed stroke -> {} triangles, bounds {:?}",
        mesh.triangle_count(),
        wave.bounds()
    );
}
