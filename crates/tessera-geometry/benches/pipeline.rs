//! Benchmarks for the tessellation, stroking and triangulation pipeline

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec2;
use tessera_geometry::{
    FillRule, JoinStyle, PreStrokedShape, Shape, ShapeBuilder, StrokeGeometryFlags,
    StrokingParameters, TessellatedShape, TessellationParams, Triangulation, fill_mesh,
};

fn circles(count: u32) -> Shape {
    let mut builder = ShapeBuilder::new();
    for i in 0..count {
        let angle = i as f32 * 0.7;
        builder.circle(Vec2::from_angle(angle) * (i as f32 * 0.3), 2.0);
    }
    builder.build()
}

fn star() -> Shape {
    ShapeBuilder::new()
        .star(Vec2::ZERO, 10.0, 4.0, 12)
        .ellipse(Vec2::ZERO, Vec2::new(6.0, 3.0))
        .build()
}

fn bench_tessellation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tessellation");

    for spr in [16, 32, 64, 128] {
        let params = TessellationParams::default().with_samples_per_revolution(spr);
        let shape = circles(16);
        group.bench_with_input(BenchmarkId::from_parameter(spr), &params, |b, params| {
            b.iter(|| black_box(TessellatedShape::build(&shape, params)));
        });
    }

    group.finish();
}

fn bench_pre_stroke(c: &mut Criterion) {
    let mut group = c.benchmark_group("pre_stroke");
    let params = TessellationParams::default();
    let tessellated = TessellatedShape::build(&star(), &params);

    for (name, flags) in [
        ("bevel", StrokeGeometryFlags::BEVEL_JOINS),
        ("miter", StrokeGeometryFlags::MITER_JOINS),
        ("round", StrokeGeometryFlags::ROUNDED_JOINS),
        ("all", StrokeGeometryFlags::all()),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(PreStrokedShape::build(
                    &tessellated,
                    flags,
                    params.curvature_threshold(),
                ))
            });
        });
    }

    group.finish();
}

fn bench_triangulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation");
    let params = TessellationParams::default();

    for count in [1, 4, 16, 32] {
        let tessellated = TessellatedShape::build(&circles(count), &params);
        group.throughput(Throughput::Elements(tessellated.point_count() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &tessellated, |b, t| {
            b.iter(|| black_box(Triangulation::build(t)));
        });
    }

    group.finish();
}

fn bench_meshes(c: &mut Criterion) {
    let mut group = c.benchmark_group("meshes");
    let params = TessellationParams::default();
    let mut shape = circles(16);
    let triangulation = shape.triangulated(&params);

    group.bench_function("fill_non_zero", |b| {
        b.iter(|| black_box(fill_mesh(&triangulation, &FillRule::NonZero, false)));
    });
    group.bench_function("fill_anti_aliased", |b| {
        b.iter(|| black_box(fill_mesh(&triangulation, &FillRule::OddEven, true)));
    });

    let stroke = StrokingParameters::with_width(0.5).with_join(JoinStyle::Round);
    shape.pre_stroked(&params, stroke.geometry_flags());
    group.bench_function("stroke_cached", |b| {
        b.iter(|| black_box(shape.stroke_mesh(&params, &stroke)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_tessellation,
    bench_pre_stroke,
    bench_triangulation,
    bench_meshes
);
criterion_main!(benches);
