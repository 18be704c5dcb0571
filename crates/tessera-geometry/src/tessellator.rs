//! Curvature-adaptive curve tessellation.
//!
//! Each outline segment is bisected recursively until the tangent turns by
//! less than `2π / samples_per_revolution` over every interval, or until the
//! recursion cap is reached. Reaching the cap is not an error: the segment is
//! simply left coarser than requested.

use crate::{
    BoundingBox, CurveInterpolator, CurvePoint, CurveSample, GeometryError, GeometryResult,
    Outline, Shape,
};
use std::f32::consts::TAU;
use tessera_core::profiling::profile_function;

/// Largest accepted recursion depth.
pub const MAX_RECURSE_LIMIT: u32 = 20;

/// Parameters controlling curve tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TessellationParams {
    /// Maximum bisection depth per segment; a segment yields at most
    /// `1 + 2^max_recurse` points.
    pub max_recurse: u32,
    /// Number of samples a full turn of the tangent should receive.
    pub samples_per_revolution: u32,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            max_recurse: 8,
            samples_per_revolution: 32,
        }
    }
}

impl TessellationParams {
    /// Create parameters.
    pub fn new(max_recurse: u32, samples_per_revolution: u32) -> Self {
        Self {
            max_recurse,
            samples_per_revolution,
        }
    }

    /// Set the maximum recursion depth.
    pub fn with_max_recurse(mut self, max_recurse: u32) -> Self {
        self.max_recurse = max_recurse;
        self
    }

    /// Set the number of samples per full revolution.
    pub fn with_samples_per_revolution(mut self, samples: u32) -> Self {
        self.samples_per_revolution = samples;
        self
    }

    /// Maximum tangent turn per interval, `2π / samples_per_revolution`.
    pub fn curvature_threshold(&self) -> f32 {
        TAU / self.samples_per_revolution.max(1) as f32
    }

    /// Check the parameters for use with untrusted input.
    pub fn validated(self) -> GeometryResult<Self> {
        if self.samples_per_revolution == 0 {
            return Err(GeometryError::InvalidParameter {
                name: "samples_per_revolution",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_recurse > MAX_RECURSE_LIMIT {
            return Err(GeometryError::InvalidParameter {
                name: "max_recurse",
                reason: format!("{} exceeds the limit of {}", self.max_recurse, MAX_RECURSE_LIMIT),
            });
        }
        Ok(self)
    }
}

#[derive(Clone, Copy)]
struct Knot {
    t: f32,
    rate: f32,
}

struct Subdivider<'a> {
    interpolator: &'a CurveInterpolator,
    max_recurse: u32,
    threshold: f32,
    points: Vec<CurvePoint>,
}

impl Subdivider<'_> {
    fn subdivide(&mut self, a: Knot, b: Knot, depth: u32) {
        if depth >= self.max_recurse {
            return;
        }

        let t = 0.5 * (a.t + b.t);
        if t <= a.t || t >= b.t {
            return;
        }
        let sample: CurveSample = self.interpolator.evaluate(t);
        let mid = Knot {
            t,
            rate: sample.turning_rate(),
        };

        let dt = b.t - a.t;
        let turn = a.rate * dt + b.rate * dt + 2.0 * mid.rate * dt;
        if turn <= 4.0 * self.threshold {
            return;
        }

        self.points.push(self.interpolator.make_point(&sample, t));
        self.subdivide(a, mid, depth + 1);
        self.subdivide(mid, b, depth + 1);
    }
}

/// Tessellate one segment.
///
/// The result has at least two points, strictly increasing times, and its
/// first and last points are the interpolator's analytic endpoints. Flat
/// interpolators always produce exactly their two endpoints. `max_recurse`
/// is clamped to [`MAX_RECURSE_LIMIT`].
pub fn tessellate_curve(
    interpolator: &CurveInterpolator,
    max_recurse: u32,
    curvature_threshold: f32,
) -> Vec<CurvePoint> {
    let start = interpolator.start_point();
    let end = interpolator.end_point();
    let mut points = vec![
        interpolator.make_point(&start, 0.0),
        interpolator.make_point(&end, 1.0),
    ];
    if interpolator.is_flat() {
        return points;
    }

    let mut subdivider = Subdivider {
        interpolator,
        max_recurse: max_recurse.min(MAX_RECURSE_LIMIT),
        threshold: curvature_threshold,
        points,
    };
    subdivider.subdivide(
        Knot {
            t: 0.0,
            rate: start.turning_rate(),
        },
        Knot {
            t: 1.0,
            rate: end.turning_rate(),
        },
        0,
    );

    points = subdivider.points;
    points.sort_by(|a, b| a.time.total_cmp(&b.time));
    points
}

/// A tessellated outline segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellatedEdge {
    points: Vec<CurvePoint>,
    line_indices: Vec<u32>,
    outline_id: usize,
    edge_id: usize,
    start_point_id: usize,
    end_point_id: usize,
    bounds: BoundingBox,
}

impl TessellatedEdge {
    fn new(
        points: Vec<CurvePoint>,
        outline_id: usize,
        edge_id: usize,
        start_point_id: usize,
        end_point_id: usize,
    ) -> Self {
        let line_indices = (1..points.len() as u32)
            .flat_map(|i| [i - 1, i])
            .collect();
        let bounds = BoundingBox::from_points(points.iter().map(|p| p.position));
        Self {
            points,
            line_indices,
            outline_id,
            edge_id,
            start_point_id,
            end_point_id,
            bounds,
        }
    }

    /// Sample points ordered by time.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Line-list indices connecting consecutive points.
    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Outline this edge belongs to.
    pub fn outline_id(&self) -> usize {
        self.outline_id
    }

    /// Index of this edge within its outline (equal to its start point ID).
    pub fn edge_id(&self) -> usize {
        self.edge_id
    }

    /// Source point the edge starts at.
    pub fn start_point_id(&self) -> usize {
        self.start_point_id
    }

    /// Source point the edge ends at.
    pub fn end_point_id(&self) -> usize {
        self.end_point_id
    }

    /// Bounds of the sample points.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// First sample point.
    pub fn first(&self) -> &CurvePoint {
        &self.points[0]
    }

    /// Last sample point.
    pub fn last(&self) -> &CurvePoint {
        &self.points[self.points.len() - 1]
    }
}

/// A tessellated outline: one edge per source point.
///
/// Edge `i` runs from point `i` to point `i + 1`; the final edge closes the
/// loop back to point 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellatedOutline {
    edges: Vec<TessellatedEdge>,
    outline_id: usize,
    bounds: BoundingBox,
}

impl TessellatedOutline {
    /// Tessellate a single outline.
    pub fn build(outline_id: usize, outline: &Outline, params: &TessellationParams) -> Self {
        let points = outline.points();
        let threshold = params.curvature_threshold();

        let edges: Vec<TessellatedEdge> = points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let next = outline.next_index(i);
                let interpolator =
                    CurveInterpolator::new(point.position, points[next].position, &point.curve);
                let samples = tessellate_curve(&interpolator, params.max_recurse, threshold);
                TessellatedEdge::new(samples, outline_id, i, i, next)
            })
            .collect();

        let bounds = edges
            .iter()
            .fold(BoundingBox::EMPTY, |acc, edge| acc.union(&edge.bounds));

        tracing::trace!(
            "Outline {} tessellated into {} edges, {} points",
            outline_id,
            edges.len(),
            edges.iter().map(|e| e.points.len()).sum::<usize>()
        );

        Self {
            edges,
            outline_id,
            bounds,
        }
    }

    /// Edges in outline order, including the closing edge.
    pub fn edges(&self) -> &[TessellatedEdge] {
        &self.edges
    }

    /// Index of the outline in its shape.
    pub fn outline_id(&self) -> usize {
        self.outline_id
    }

    /// Bounds of every edge.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Number of source points (equal to the number of edges).
    pub fn point_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge terminating at the outline's last point.
    ///
    /// This is not the closing edge; `None` for outlines with fewer than two
    /// points, where the closing edge is the only edge.
    pub fn last_edge(&self) -> Option<&TessellatedEdge> {
        if self.edges.len() >= 2 {
            Some(&self.edges[self.edges.len() - 2])
        } else {
            None
        }
    }

    /// The edge from the last point back to the first.
    pub fn closing_edge(&self) -> Option<&TessellatedEdge> {
        self.edges.last()
    }

    /// Positions of the closed polygon approximating the outline.
    ///
    /// Each edge contributes its points except the last, which is the first
    /// point of the following edge.
    pub fn polygon(&self) -> impl Iterator<Item = &CurvePoint> + '_ {
        self.edges
            .iter()
            .flat_map(|edge| edge.points[..edge.points.len() - 1].iter())
    }
}

/// Tessellation of every outline of a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellatedShape {
    outlines: Vec<TessellatedOutline>,
    bounds: BoundingBox,
    params: TessellationParams,
}

impl TessellatedShape {
    /// Tessellate every outline of `shape`.
    pub fn build(shape: &Shape, params: &TessellationParams) -> Self {
        profile_function!();

        let outlines: Vec<TessellatedOutline> = shape
            .outlines()
            .iter()
            .enumerate()
            .map(|(id, outline)| TessellatedOutline::build(id, outline, params))
            .collect();
        let bounds = outlines
            .iter()
            .fold(BoundingBox::EMPTY, |acc, outline| acc.union(&outline.bounds));

        let shape = Self {
            outlines,
            bounds,
            params: *params,
        };
        tracing::debug!(
            "Tessellated {} outlines into {} points (max_recurse {}, {} samples/rev)",
            shape.outlines.len(),
            shape.point_count(),
            params.max_recurse,
            params.samples_per_revolution
        );
        shape
    }

    /// Tessellated outlines, indexed by outline ID.
    pub fn outlines(&self) -> &[TessellatedOutline] {
        &self.outlines
    }

    /// Bounds of all outlines.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Parameters the shape was tessellated with.
    pub fn params(&self) -> &TessellationParams {
        &self.params
    }

    /// Total number of sample points over all edges.
    pub fn point_count(&self) -> usize {
        self.outlines
            .iter()
            .flat_map(|o| o.edges.iter())
            .map(|e| e.points.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SegmentCurve;
    use glam::Vec2;
    use std::f32::consts::PI;

    fn quarter_arc() -> CurveInterpolator {
        CurveInterpolator::new(
            Vec2::X,
            Vec2::Y,
            &SegmentCurve::Arc {
                angle: PI * 0.5,
                counter_clockwise: true,
            },
        )
    }

    #[test]
    fn test_flat_curve_yields_two_points() {
        let interp = CurveInterpolator::new(Vec2::ZERO, Vec2::new(3.0, 4.0), &SegmentCurve::Line);
        let points = tessellate_curve(&interp, 10, 0.001);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time, 0.0);
        assert_eq!(points[1].time, 1.0);
    }

    #[test]
    fn test_zero_recursion_keeps_endpoints() {
        let points = tessellate_curve(&quarter_arc(), 0, 0.001);
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn test_arc_sample_count_follows_threshold() {
        // A quarter turn at 16 samples per revolution needs 4 intervals.
        let threshold = TAU / 16.0;
        let points = tessellate_curve(&quarter_arc(), 8, threshold);
        assert_eq!(points.len(), 5);
        for w in points.windows(2) {
            assert!(w[0].time < w[1].time);
        }
    }

    #[test]
    fn test_normals_are_unit_and_perpendicular() {
        let interp = quarter_arc();
        let points = tessellate_curve(&interp, 6, 0.05);
        for p in &points {
            assert!((p.normal.length() - 1.0).abs() < 1e-4);
            let sample = interp.evaluate(p.time);
            assert!(p.normal.dot(sample.p_t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_line_indices_connect_consecutive_points() {
        let shape = Shape::from_outlines(vec![Outline::polygon([
            Vec2::ZERO,
            Vec2::X,
            Vec2::ONE,
        ])]);
        let tess = TessellatedShape::build(&shape, &TessellationParams::default());
        let edge = &tess.outlines()[0].edges()[0];
        assert_eq!(edge.line_indices(), &[0, 1]);
    }

    #[test]
    fn test_last_edge_is_not_closing_edge() {
        let shape = Shape::from_outlines(vec![Outline::polygon([
            Vec2::ZERO,
            Vec2::X,
            Vec2::ONE,
        ])]);
        let tess = TessellatedShape::build(&shape, &TessellationParams::default());
        let outline = &tess.outlines()[0];
        assert_eq!(outline.last_edge().unwrap().end_point_id(), 2);
        assert_eq!(outline.closing_edge().unwrap().end_point_id(), 0);
        assert_eq!(outline.polygon().count(), 3);
    }

    #[test]
    fn test_params_validation() {
        assert!(TessellationParams::new(8, 0).validated().is_err());
        assert!(TessellationParams::new(64, 16).validated().is_err());
        assert!(TessellationParams::default().validated().is_ok());
    }
}
