//! Stroke mesh assembly.
//!
//! Combines the per-edge offset quads of a tessellated shape with the join
//! and cap geometry of its pre-stroke into one triangle mesh.

use crate::{
    CapStyle, JoinPoint, JoinStyle, PreStrokedShape, StrokeCurves, StrokeGeometry, StrokeVertex,
    StrokingParameters, TessellatedEdge, TessellatedMesh, TessellatedShape,
};
use tessera_core::profiling::{profile_function, profile_scope};

/// Builds stroke meshes from tessellated and pre-stroked shapes.
pub struct StrokeMeshBuilder;

impl StrokeMeshBuilder {
    /// Assemble the stroke of `shape` described by `params`.
    ///
    /// # Panics
    /// If `pre_stroke` was built without the join or cap geometry that
    /// `params` selects; see [`StrokingParameters::geometry_flags`].
    pub fn build(
        shape: &TessellatedShape,
        pre_stroke: &PreStrokedShape,
        params: &StrokingParameters,
    ) -> TessellatedMesh<StrokeVertex> {
        profile_function!();

        let radius = params.radius;
        let mut mesh = TessellatedMesh::new();

        if params.stroke_curves == StrokeCurves::Solid {
            profile_scope!("edges");
            for outline in shape.outlines() {
                let edges = outline.edges();
                let drawn = if params.close_outline {
                    edges.len()
                } else {
                    edges.len().saturating_sub(1)
                };
                for edge in &edges[..drawn] {
                    push_edge(&mut mesh, edge, radius);
                }
            }
        }

        match params.join_style {
            JoinStyle::Bevel => push_fixed(&mut mesh, pre_stroke.bevel_joins(), params),
            JoinStyle::Round => push_fixed(&mut mesh, pre_stroke.rounded_joins(), params),
            JoinStyle::Miter => {
                let (points, indices) = pre_stroke.miter_joins().select(params.close_outline);
                mesh.append(
                    points.iter().map(|p| {
                        StrokeVertex::new(p.pre_position, p.offset_vector(params.miter_limit), radius)
                    }),
                    indices,
                );
            }
        }

        if !params.close_outline {
            match params.cap_style {
                CapStyle::Flat => {}
                CapStyle::Square => push_fixed(&mut mesh, pre_stroke.square_caps(), params),
                CapStyle::Round => push_fixed(&mut mesh, pre_stroke.rounded_caps(), params),
            }
        }

        tracing::debug!(
            "Stroke mesh (radius {}, {:?} joins, {:?} caps): {} vertices, {} triangles",
            radius,
            params.join_style,
            params.cap_style,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        mesh
    }
}

fn push_edge(mesh: &mut TessellatedMesh<StrokeVertex>, edge: &TessellatedEdge, radius: f32) {
    let points = edge.points();
    let vertices = points.iter().flat_map(|p| {
        [
            StrokeVertex::new(p.position, p.normal, radius),
            StrokeVertex::new(p.position, -p.normal, radius),
        ]
    });
    let indices: Vec<u32> = (0..points.len().saturating_sub(1) as u32)
        .flat_map(|j| {
            let k = 2 * j;
            [k, k + 1, k + 2, k + 1, k + 3, k + 2]
        })
        .collect();
    mesh.append(vertices, &indices);
}

fn push_fixed(
    mesh: &mut TessellatedMesh<StrokeVertex>,
    geometry: &StrokeGeometry<JoinPoint>,
    params: &StrokingParameters,
) {
    let (points, indices) = geometry.select(params.close_outline);
    mesh.append(
        points
            .iter()
            .map(|p| StrokeVertex::new(p.pre_position, p.offset, params.radius)),
        indices,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Outline, Shape, StrokeGeometryFlags, TessellationParams};
    use glam::Vec2;

    fn square() -> TessellatedShape {
        let shape = Shape::from_outlines(vec![Outline::polygon([
            Vec2::ZERO,
            Vec2::new(1.0, 0.0),
            Vec2::ONE,
            Vec2::new(0.0, 1.0),
        ])]);
        TessellatedShape::build(&shape, &TessellationParams::default())
    }

    #[test]
    fn test_closed_square_with_bevels() {
        let tess = square();
        let params = StrokingParameters::with_width(0.2);
        let pre = PreStrokedShape::build(&tess, params.geometry_flags(), 0.1);
        let mesh = StrokeMeshBuilder::build(&tess, &pre, &params);
        // Four edge quads and four bevel joins of two triangles each.
        assert_eq!(mesh.triangle_count(), 16);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_open_outline_skips_closing_edge_and_adds_caps() {
        let tess = square();
        let params = StrokingParameters::with_width(0.2)
            .with_close_outline(false)
            .with_cap(CapStyle::Square);
        let pre = PreStrokedShape::build(&tess, params.geometry_flags(), 0.1);
        let mesh = StrokeMeshBuilder::build(&tess, &pre, &params);
        // Three edges, two core joins, two square caps of three triangles.
        assert_eq!(mesh.triangle_count(), 3 * 2 + 2 * 2 + 2 * 3);
    }

    #[test]
    fn test_joins_only() {
        let tess = square();
        let params = StrokingParameters::default()
            .with_join(JoinStyle::Miter)
            .with_stroke_curves(StrokeCurves::None);
        let pre = PreStrokedShape::build(&tess, StrokeGeometryFlags::MITER_JOINS, 0.1);
        let mesh = StrokeMeshBuilder::build(&tess, &pre, &params);
        assert_eq!(mesh.triangle_count(), 8);
        // Every corner of the unit square is convex, so the miter tip sits
        // diagonally outside it at distance sqrt(2).
        let tip = Vec2::from_array(mesh.vertices[2].position);
        let center = Vec2::from_array(mesh.vertices[2].center);
        assert!(((tip - center).length() - 2f32.sqrt()).abs() < 1e-5);
    }
}
