//! Shapes and their cached payloads.
//!
//! A [`Shape`] is a list of outlines. Tessellations, pre-strokes and
//! triangulations derived from it are built on first request and cached
//! until the shape is mutated.

use crate::payload::PayloadCache;
use crate::{
    ArcInterpolator, BoundingBox, CurveSample, FillRule, FillVertex, GeometryError,
    GeometryResult, Outline, ParametricCurve, PayloadKey, PreStrokedShape, SegmentCurve,
    ShapeBuilder, ShapePayload, StrokeGeometryFlags, StrokeMeshBuilder, StrokeVertex,
    StrokingParameters, TessellatedMesh, TessellatedShape, TessellationParams, Triangulation,
};
use glam::{Affine2, Vec2};
use std::fmt;
use std::sync::Arc;

/// Samples taken from custom curves when computing bounds.
const CUSTOM_BOUNDS_SAMPLES: usize = 16;

/// A 2D vector shape made of implicitly closed outlines.
#[derive(Clone, Default)]
pub struct Shape {
    outlines: Vec<Outline>,
    cache: PayloadCache,
}

impl Shape {
    /// Create an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a shape from outlines.
    pub fn from_outlines(outlines: Vec<Outline>) -> Self {
        Self {
            outlines,
            cache: PayloadCache::new(),
        }
    }

    /// Start building a shape.
    pub fn builder() -> ShapeBuilder {
        ShapeBuilder::new()
    }

    /// Outlines of the shape, indexed by outline ID.
    pub fn outlines(&self) -> &[Outline] {
        &self.outlines
    }

    /// Mutable access to the outlines. Invalidates cached payloads.
    pub fn outlines_mut(&mut self) -> &mut Vec<Outline> {
        self.cache.clear();
        &mut self.outlines
    }

    /// Append an outline. Invalidates cached payloads.
    pub fn push_outline(&mut self, outline: Outline) {
        self.cache.clear();
        self.outlines.push(outline);
    }

    /// Apply an affine transform to every point, control point and custom
    /// curve. Invalidates cached payloads.
    ///
    /// Arcs keep their included angle; a reflecting transform flips their
    /// direction of travel.
    pub fn transform(&mut self, transform: &Affine2) {
        let reflects = transform.matrix2.determinant() < 0.0;
        self.cache.clear();
        for outline in &mut self.outlines {
            for point in outline.points_mut() {
                point.position = transform.transform_point2(point.position);
                point.curve = match std::mem::take(&mut point.curve) {
                    SegmentCurve::Line => SegmentCurve::Line,
                    SegmentCurve::Bezier(controls) => SegmentCurve::Bezier(
                        controls
                            .into_iter()
                            .map(|c| transform.transform_point2(c))
                            .collect(),
                    ),
                    SegmentCurve::Arc {
                        angle,
                        counter_clockwise,
                    } => SegmentCurve::Arc {
                        angle,
                        counter_clockwise: counter_clockwise != reflects,
                    },
                    SegmentCurve::Custom(curve) => SegmentCurve::Custom(Arc::new(TransformedCurve {
                        curve,
                        transform: *transform,
                    })),
                };
            }
        }
    }

    /// Translate the shape. Invalidates cached payloads.
    pub fn translate(&mut self, offset: Vec2) {
        self.transform(&Affine2::from_translation(offset));
    }

    /// Conservative bounds of the shape.
    ///
    /// Includes Bezier control points, the full circle of every arc and a
    /// coarse sampling of custom curves.
    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::EMPTY;
        for outline in &self.outlines {
            let points = outline.points();
            for (i, point) in points.iter().enumerate() {
                bounds.include(point.position);
                match &point.curve {
                    SegmentCurve::Line => {}
                    SegmentCurve::Bezier(controls) => {
                        controls.iter().for_each(|&c| bounds.include(c));
                    }
                    SegmentCurve::Arc {
                        angle,
                        counter_clockwise,
                    } => {
                        let end = points[outline.next_index(i)].position;
                        if let Some(arc) =
                            ArcInterpolator::new(point.position, end, *angle, *counter_clockwise)
                        {
                            let r = Vec2::splat(arc.radius());
                            bounds = bounds.union(&BoundingBox::new(
                                arc.center() - r,
                                arc.center() + r,
                            ));
                        }
                    }
                    SegmentCurve::Custom(curve) => {
                        for k in 0..=CUSTOM_BOUNDS_SAMPLES {
                            let t = k as f32 / CUSTOM_BOUNDS_SAMPLES as f32;
                            bounds.include(curve.evaluate(t).position);
                        }
                    }
                }
            }
        }
        bounds
    }

    /// Check that every coordinate and arc angle is finite.
    pub fn validate(&self) -> GeometryResult<()> {
        for (outline_id, outline) in self.outlines.iter().enumerate() {
            for (point_id, point) in outline.points().iter().enumerate() {
                let finite = point.position.is_finite()
                    && point.curve.control_points().iter().all(|c| c.is_finite());
                if !finite {
                    return Err(GeometryError::NonFinitePoint {
                        outline: outline_id,
                        point: point_id,
                    });
                }
                if let SegmentCurve::Arc { angle, .. } = point.curve
                    && !angle.is_finite()
                {
                    return Err(GeometryError::NonFiniteArcAngle {
                        outline: outline_id,
                        point: point_id,
                    });
                }
            }
        }
        Ok(())
    }

    /// Tessellation for `params`, built on first request.
    pub fn tessellated(&mut self, params: &TessellationParams) -> Arc<TessellatedShape> {
        let key = PayloadKey::tessellated(params);
        if let Some(payload) = self.cache.get(&key).and_then(ShapePayload::as_tessellated) {
            return Arc::clone(payload);
        }
        let payload = Arc::new(TessellatedShape::build(self, params));
        self.cache
            .insert(key, ShapePayload::Tessellated(Arc::clone(&payload)));
        payload
    }

    /// Join and cap geometry selected by `flags`, built on first request.
    pub fn pre_stroked(
        &mut self,
        params: &TessellationParams,
        flags: StrokeGeometryFlags,
    ) -> Arc<PreStrokedShape> {
        let key = PayloadKey::pre_stroked(params, flags);
        if let Some(payload) = self.cache.get(&key).and_then(ShapePayload::as_pre_stroked) {
            return Arc::clone(payload);
        }
        let tessellated = self.tessellated(params);
        let payload = Arc::new(PreStrokedShape::build(
            &tessellated,
            flags,
            params.curvature_threshold(),
        ));
        self.cache
            .insert(key, ShapePayload::PreStroked(Arc::clone(&payload)));
        payload
    }

    /// Triangulation for `params`, built on first request.
    pub fn triangulated(&mut self, params: &TessellationParams) -> Arc<Triangulation> {
        let key = PayloadKey::triangulated(params);
        if let Some(payload) = self.cache.get(&key).and_then(ShapePayload::as_triangulated) {
            return Arc::clone(payload);
        }
        let tessellated = self.tessellated(params);
        let payload = Arc::new(Triangulation::build(&tessellated));
        self.cache
            .insert(key, ShapePayload::Triangulated(Arc::clone(&payload)));
        payload
    }

    /// Fill mesh for `rule`, using the cached triangulation.
    pub fn fill_mesh(
        &mut self,
        params: &TessellationParams,
        rule: &FillRule,
        anti_aliased: bool,
    ) -> TessellatedMesh<FillVertex> {
        let triangulation = self.triangulated(params);
        crate::fill_mesh(&triangulation, rule, anti_aliased)
    }

    /// Stroke mesh for `stroke`, using the cached tessellation and pre-stroke.
    pub fn stroke_mesh(
        &mut self,
        params: &TessellationParams,
        stroke: &StrokingParameters,
    ) -> TessellatedMesh<StrokeVertex> {
        let tessellated = self.tessellated(params);
        let pre_stroked = self.pre_stroked(params, stroke.geometry_flags());
        StrokeMeshBuilder::build(&tessellated, &pre_stroked, stroke)
    }

    /// Number of cached payloads.
    pub fn cached_payloads(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("outlines", &self.outlines)
            .field("cached_payloads", &self.cache.len())
            .finish()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.outlines == other.outlines
    }
}

impl From<Vec<Outline>> for Shape {
    fn from(outlines: Vec<Outline>) -> Self {
        Self::from_outlines(outlines)
    }
}

/// A custom curve seen through an affine transform.
#[derive(Debug)]
struct TransformedCurve {
    curve: Arc<dyn ParametricCurve>,
    transform: Affine2,
}

impl ParametricCurve for TransformedCurve {
    fn evaluate(&self, t: f32) -> CurveSample {
        let sample = self.curve.evaluate(t);
        CurveSample {
            position: self.transform.transform_point2(sample.position),
            p_t: self.transform.transform_vector2(sample.p_t),
            p_tt: self.transform.transform_vector2(sample.p_tt),
        }
    }

    fn is_flat(&self) -> bool {
        self.curve.is_flat()
    }
}
