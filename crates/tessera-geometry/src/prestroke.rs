//! Radius-independent join and cap geometry.
//!
//! Every stroke point stores an un-scaled pre-position on the outline and an
//! offset direction; a consumer places it at `pre_position + radius * offset`.
//! The same pre-stroke therefore serves any stroke width. Miter tips store the
//! raw solution of the offset-line intersection and are resolved against a
//! miter limit when queried.

use crate::{CurvePoint, StrokeGeometryFlags, TessellatedEdge, TessellatedShape};
use glam::Vec2;
use std::f32::consts::PI;
use tessera_core::profiling::profile_function;

/// A join or cap vertex with a fixed offset direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinPoint {
    /// Outline the point belongs to.
    pub outline_id: usize,
    /// Source points flanking the join (or the endpoints of the capped edge).
    pub point_ids: (usize, usize),
    /// Position on the outline.
    pub pre_position: Vec2,
    /// Offset direction, scaled by the stroke radius.
    pub offset: Vec2,
}

impl JoinPoint {
    /// Final position for a stroke of the given radius.
    pub fn position(&self, radius: f32) -> Vec2 {
        self.pre_position + self.offset * radius
    }
}

/// Cap vertices share the join vertex layout.
pub type CapPoint = JoinPoint;

/// A miter join vertex whose offset depends on the miter limit.
///
/// The offset is `normal + direction * a`, where `a = lhs / rhs` is the
/// distance along the incoming direction at which the two offset lines meet,
/// clamped to `±limit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiterJoinPoint {
    /// Outline the point belongs to.
    pub outline_id: usize,
    /// Source points flanking the join.
    pub point_ids: (usize, usize),
    /// Position on the outline.
    pub pre_position: Vec2,
    /// Offset at a miter limit of zero.
    pub normal: Vec2,
    /// Direction of the miter extension.
    pub direction: Vec2,
    /// Numerator of the extension length.
    pub lhs: f32,
    /// Denominator of the extension length.
    pub rhs: f32,
}

impl MiterJoinPoint {
    fn fixed(outline_id: usize, point_ids: (usize, usize), pre_position: Vec2, offset: Vec2) -> Self {
        Self {
            outline_id,
            point_ids,
            pre_position,
            normal: offset,
            direction: Vec2::ZERO,
            lhs: 0.0,
            rhs: 1.0,
        }
    }

    /// Extension length along `direction` for the given miter limit.
    pub fn extension(&self, miter_limit: f32) -> f32 {
        if self.lhs == 0.0 {
            return 0.0;
        }
        if self.rhs != 0.0 && self.lhs.abs() <= miter_limit * self.rhs.abs() {
            return self.lhs / self.rhs;
        }
        let rhs_sign = if self.rhs < 0.0 { -1.0 } else { 1.0 };
        miter_limit * self.lhs.signum() * rhs_sign
    }

    /// Offset direction for the given miter limit.
    pub fn offset_vector(&self, miter_limit: f32) -> Vec2 {
        self.normal + self.direction * self.extension(miter_limit)
    }

    /// Final position for a stroke of the given radius and miter limit.
    pub fn position(&self, radius: f32, miter_limit: f32) -> Vec2 {
        self.pre_position + self.offset_vector(miter_limit) * radius
    }
}

/// Points and triangle indices of one join or cap style.
///
/// The first `core_point_count` points and `core_index_count` indices cover
/// everything that does not touch a closing edge; core indices never reference
/// non-core points.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeGeometry<P> {
    points: Vec<P>,
    indices: Vec<u32>,
    core_point_count: usize,
    core_index_count: usize,
}

impl<P> StrokeGeometry<P> {
    /// All points.
    pub fn points(&self) -> &[P] {
        &self.points
    }

    /// All triangle indices.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Points not touching a closing edge.
    pub fn core_points(&self) -> &[P] {
        &self.points[..self.core_point_count]
    }

    /// Indices not touching a closing edge.
    pub fn core_indices(&self) -> &[u32] {
        &self.indices[..self.core_index_count]
    }

    /// Number of core points.
    pub fn core_point_count(&self) -> usize {
        self.core_point_count
    }

    /// Number of core indices.
    pub fn core_index_count(&self) -> usize {
        self.core_index_count
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Points and indices to draw, with or without the closing-edge part.
    pub fn select(&self, include_closing: bool) -> (&[P], &[u32]) {
        if include_closing {
            (&self.points, &self.indices)
        } else {
            (self.core_points(), self.core_indices())
        }
    }
}

struct Part<P> {
    points: Vec<P>,
    indices: Vec<u32>,
}

impl<P> Part<P> {
    fn push_fan(&mut self, points: impl IntoIterator<Item = P>) {
        let base = self.points.len() as u32;
        self.points.extend(points);
        let count = self.points.len() as u32 - base;
        for j in 1..count.saturating_sub(1) {
            self.indices.extend_from_slice(&[base, base + j, base + j + 1]);
        }
    }
}

/// Accumulates core and closing geometry separately and concatenates them.
struct GeometryBuilder<P> {
    core: Part<P>,
    closing: Part<P>,
}

impl<P> GeometryBuilder<P> {
    fn new() -> Self {
        Self {
            core: Part {
                points: Vec::new(),
                indices: Vec::new(),
            },
            closing: Part {
                points: Vec::new(),
                indices: Vec::new(),
            },
        }
    }

    fn part(&mut self, core: bool) -> &mut Part<P> {
        if core {
            &mut self.core
        } else {
            &mut self.closing
        }
    }

    fn finish(self) -> StrokeGeometry<P> {
        let Self { core, closing } = self;
        let core_point_count = core.points.len();
        let core_index_count = core.indices.len();
        let offset = core_point_count as u32;

        let mut points = core.points;
        points.extend(closing.points);
        let mut indices = core.indices;
        indices.extend(closing.indices.into_iter().map(|i| i + offset));

        StrokeGeometry {
            points,
            indices,
            core_point_count,
            core_index_count,
        }
    }
}

/// Local frame of a join between two edges.
struct JoinFrame {
    outline_id: usize,
    point_ids: (usize, usize),
    center_in: Vec2,
    center_out: Vec2,
    v0: Vec2,
    v1: Vec2,
    n0: Vec2,
    n1: Vec2,
    /// Sign selecting the convex side: -1 for left turns, +1 otherwise.
    side: f32,
}

impl JoinFrame {
    fn new(incoming: &TessellatedEdge, outgoing: &TessellatedEdge) -> Self {
        let p_in: &CurvePoint = incoming.last();
        let p_out: &CurvePoint = outgoing.first();
        let v0 = p_in.tangent();
        let v1 = p_out.tangent();
        let det = v1.dot(v0.perp());
        Self {
            outline_id: outgoing.outline_id(),
            point_ids: (incoming.start_point_id(), outgoing.end_point_id()),
            center_in: p_in.position,
            center_out: p_out.position,
            v0,
            v1,
            n0: p_in.normal,
            n1: p_out.normal,
            side: if det > 0.0 { -1.0 } else { 1.0 },
        }
    }

    fn point(&self, pre_position: Vec2, offset: Vec2) -> JoinPoint {
        JoinPoint {
            outline_id: self.outline_id,
            point_ids: self.point_ids,
            pre_position,
            offset,
        }
    }

    fn bevel(&self) -> [JoinPoint; 4] {
        [
            self.point(self.center_in, Vec2::ZERO),
            self.point(self.center_in, self.n0 * self.side),
            self.point(self.center_out, self.n1 * self.side),
            self.point(self.center_out, Vec2::ZERO),
        ]
    }

    fn miter(&self) -> [MiterJoinPoint; 4] {
        let s = self.side;
        let r = (self.n1 - self.n0) * s;
        let tip = MiterJoinPoint {
            outline_id: self.outline_id,
            point_ids: self.point_ids,
            pre_position: self.center_in,
            normal: self.n0 * s,
            direction: self.v0,
            lhs: self.v1.perp_dot(r),
            rhs: -self.v0.perp_dot(self.v1),
        };
        [
            MiterJoinPoint::fixed(self.outline_id, self.point_ids, self.center_in, Vec2::ZERO),
            MiterJoinPoint::fixed(self.outline_id, self.point_ids, self.center_in, self.n0 * s),
            tip,
            MiterJoinPoint::fixed(self.outline_id, self.point_ids, self.center_out, self.n1 * s),
        ]
    }

    fn round(&self, threshold: f32) -> Vec<JoinPoint> {
        let from = self.n0 * self.side;
        let to = self.n1 * self.side;
        let mut sweep = from.perp_dot(to).atan2(from.dot(to));
        if from.perp_dot(to) == 0.0 && from.dot(to) < 0.0 {
            // Exact reversal: sweep through the tip, not behind the corner.
            sweep = if from.perp().dot(self.v0) > 0.0 { PI } else { -PI };
        }
        std::iter::once(self.point(self.center_in, Vec2::ZERO))
            .chain(
                arc_offsets(from, to, sweep, threshold)
                    .into_iter()
                    .map(|offset| self.point(self.center_in, offset)),
            )
            .collect()
    }
}

/// Offsets sweeping from `from` to `to` by `sweep` radians in steps no larger
/// than `threshold`. The last offset is exactly `to`.
fn arc_offsets(from: Vec2, to: Vec2, sweep: f32, threshold: f32) -> Vec<Vec2> {
    let steps = ((sweep.abs() / threshold.max(f32::EPSILON)).ceil() as usize).max(1);
    let rotation = Vec2::from_angle(sweep / steps as f32);
    let mut offsets = Vec::with_capacity(steps + 1);
    let mut current = from;
    offsets.push(current);
    for _ in 1..steps {
        current = rotation.rotate(current);
        offsets.push(current);
    }
    offsets.push(to);
    offsets
}

/// Endpoint frame of an open outline.
struct CapFrame {
    outline_id: usize,
    point_ids: (usize, usize),
    center: Vec2,
    normal: Vec2,
    /// Outward tangent.
    direction: Vec2,
}

impl CapFrame {
    fn start(edge: &TessellatedEdge) -> Self {
        let p = edge.first();
        Self {
            outline_id: edge.outline_id(),
            point_ids: (edge.start_point_id(), edge.end_point_id()),
            center: p.position,
            normal: p.normal,
            direction: -p.tangent(),
        }
    }

    fn end(edge: &TessellatedEdge) -> Self {
        let p = edge.last();
        Self {
            outline_id: edge.outline_id(),
            point_ids: (edge.start_point_id(), edge.end_point_id()),
            center: p.position,
            normal: p.normal,
            direction: p.tangent(),
        }
    }

    fn point(&self, offset: Vec2) -> CapPoint {
        CapPoint {
            outline_id: self.outline_id,
            point_ids: self.point_ids,
            pre_position: self.center,
            offset,
        }
    }

    fn square(&self) -> [CapPoint; 5] {
        let n = self.normal;
        let d = self.direction;
        [
            self.point(Vec2::ZERO),
            self.point(n),
            self.point(n + d),
            self.point(-n + d),
            self.point(-n),
        ]
    }

    fn round(&self, threshold: f32) -> Vec<CapPoint> {
        let sweep = if self.normal.perp().dot(self.direction) >= 0.0 {
            PI
        } else {
            -PI
        };
        std::iter::once(self.point(Vec2::ZERO))
            .chain(
                arc_offsets(self.normal, -self.normal, sweep, threshold)
                    .into_iter()
                    .map(|offset| self.point(offset)),
            )
            .collect()
    }
}

/// Join and cap geometry for every outline of a tessellated shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PreStrokedShape {
    flags: StrokeGeometryFlags,
    curvature_threshold: f32,
    square_caps: Option<StrokeGeometry<CapPoint>>,
    rounded_caps: Option<StrokeGeometry<CapPoint>>,
    miter_joins: Option<StrokeGeometry<MiterJoinPoint>>,
    bevel_joins: Option<StrokeGeometry<JoinPoint>>,
    rounded_joins: Option<StrokeGeometry<JoinPoint>>,
}

impl PreStrokedShape {
    /// Build the geometries selected by `flags`.
    ///
    /// Rounded joins and caps advance by at most `curvature_threshold`
    /// radians per triangle.
    pub fn build(
        shape: &TessellatedShape,
        flags: StrokeGeometryFlags,
        curvature_threshold: f32,
    ) -> Self {
        profile_function!();

        let mut square_caps = flags
            .contains(StrokeGeometryFlags::SQUARE_CAPS)
            .then(GeometryBuilder::new);
        let mut rounded_caps = flags
            .contains(StrokeGeometryFlags::ROUNDED_CAPS)
            .then(GeometryBuilder::new);
        let mut miter_joins = flags
            .contains(StrokeGeometryFlags::MITER_JOINS)
            .then(GeometryBuilder::new);
        let mut bevel_joins = flags
            .contains(StrokeGeometryFlags::BEVEL_JOINS)
            .then(GeometryBuilder::new);
        let mut rounded_joins = flags
            .contains(StrokeGeometryFlags::ROUNDED_JOINS)
            .then(GeometryBuilder::new);

        for outline in shape.outlines() {
            let edges = outline.edges();
            let n = edges.len();
            if n == 0 {
                continue;
            }

            for i in 0..n {
                let core = i >= 1 && i + 1 < n;
                let frame = JoinFrame::new(&edges[(i + n - 1) % n], &edges[i]);
                if let Some(builder) = bevel_joins.as_mut() {
                    builder.part(core).push_fan(frame.bevel());
                }
                if let Some(builder) = miter_joins.as_mut() {
                    builder.part(core).push_fan(frame.miter());
                }
                if let Some(builder) = rounded_joins.as_mut() {
                    builder
                        .part(core)
                        .push_fan(frame.round(curvature_threshold));
                }
            }

            let start = CapFrame::start(&edges[0]);
            let end = match outline.last_edge() {
                Some(edge) => CapFrame::end(edge),
                // A lone point is capped on both sides of its own start.
                None => CapFrame {
                    direction: -start.direction,
                    ..CapFrame::start(&edges[0])
                },
            };
            for cap in [&start, &end] {
                if let Some(builder) = square_caps.as_mut() {
                    builder.part(true).push_fan(cap.square());
                }
                if let Some(builder) = rounded_caps.as_mut() {
                    builder.part(true).push_fan(cap.round(curvature_threshold));
                }
            }
        }

        let shape = Self {
            flags,
            curvature_threshold,
            square_caps: square_caps.map(GeometryBuilder::finish),
            rounded_caps: rounded_caps.map(GeometryBuilder::finish),
            miter_joins: miter_joins.map(GeometryBuilder::finish),
            bevel_joins: bevel_joins.map(GeometryBuilder::finish),
            rounded_joins: rounded_joins.map(GeometryBuilder::finish),
        };
        tracing::debug!("Pre-stroked shape with {:?}", flags);
        shape
    }

    /// Geometries this pre-stroke was built with.
    pub fn flags(&self) -> StrokeGeometryFlags {
        self.flags
    }

    /// Angular step used for rounded joins and caps.
    pub fn curvature_threshold(&self) -> f32 {
        self.curvature_threshold
    }

    /// Square caps, if requested.
    pub fn try_square_caps(&self) -> Option<&StrokeGeometry<CapPoint>> {
        self.square_caps.as_ref()
    }

    /// Rounded caps, if requested.
    pub fn try_rounded_caps(&self) -> Option<&StrokeGeometry<CapPoint>> {
        self.rounded_caps.as_ref()
    }

    /// Miter joins, if requested.
    pub fn try_miter_joins(&self) -> Option<&StrokeGeometry<MiterJoinPoint>> {
        self.miter_joins.as_ref()
    }

    /// Bevel joins, if requested.
    pub fn try_bevel_joins(&self) -> Option<&StrokeGeometry<JoinPoint>> {
        self.bevel_joins.as_ref()
    }

    /// Rounded joins, if requested.
    pub fn try_rounded_joins(&self) -> Option<&StrokeGeometry<JoinPoint>> {
        self.rounded_joins.as_ref()
    }

    /// Square caps.
    ///
    /// # Panics
    /// If [`StrokeGeometryFlags::SQUARE_CAPS`] was not requested.
    pub fn square_caps(&self) -> &StrokeGeometry<CapPoint> {
        requested(self.square_caps.as_ref(), "square caps")
    }

    /// Rounded caps.
    ///
    /// # Panics
    /// If [`StrokeGeometryFlags::ROUNDED_CAPS`] was not requested.
    pub fn rounded_caps(&self) -> &StrokeGeometry<CapPoint> {
        requested(self.rounded_caps.as_ref(), "rounded caps")
    }

    /// Miter joins.
    ///
    /// # Panics
    /// If [`StrokeGeometryFlags::MITER_JOINS`] was not requested.
    pub fn miter_joins(&self) -> &StrokeGeometry<MiterJoinPoint> {
        requested(self.miter_joins.as_ref(), "miter joins")
    }

    /// Bevel joins.
    ///
    /// # Panics
    /// If [`StrokeGeometryFlags::BEVEL_JOINS`] was not requested.
    pub fn bevel_joins(&self) -> &StrokeGeometry<JoinPoint> {
        requested(self.bevel_joins.as_ref(), "bevel joins")
    }

    /// Rounded joins.
    ///
    /// # Panics
    /// If [`StrokeGeometryFlags::ROUNDED_JOINS`] was not requested.
    pub fn rounded_joins(&self) -> &StrokeGeometry<JoinPoint> {
        requested(self.rounded_joins.as_ref(), "rounded joins")
    }
}

fn requested<'a, P>(geometry: Option<&'a StrokeGeometry<P>>, what: &str) -> &'a StrokeGeometry<P> {
    match geometry {
        Some(geometry) => geometry,
        None => panic!("{what} were not requested when the shape was pre-stroked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn miter_tip(v0: Vec2, v1: Vec2) -> MiterJoinPoint {
        let frame = JoinFrame {
            outline_id: 0,
            point_ids: (0, 2),
            center_in: Vec2::ZERO,
            center_out: Vec2::ZERO,
            v0,
            v1,
            n0: v0.perp(),
            n1: v1.perp(),
            side: if v1.dot(v0.perp()) > 0.0 { -1.0 } else { 1.0 },
        };
        frame.miter()[2]
    }

    #[test]
    fn test_right_angle_miter_hits_offset_intersection() {
        let tip = miter_tip(Vec2::X, Vec2::Y);
        assert!((tip.extension(4.0) - 1.0).abs() < 1e-6);
        assert!((tip.offset_vector(4.0) - Vec2::new(1.0, -1.0)).length() < 1e-6);
    }

    #[test]
    fn test_miter_limit_clamps_extension() {
        let tip = miter_tip(Vec2::X, Vec2::new(-1.0, 0.1).normalize());
        let exact = tip.lhs / tip.rhs;
        assert!(exact > 10.0);
        assert_eq!(tip.extension(2.0), 2.0);
        assert_eq!(tip.extension(exact * 2.0), exact);
    }

    #[test]
    fn test_miter_converges_to_normal() {
        let tip = miter_tip(Vec2::X, Vec2::Y);
        assert_eq!(tip.offset_vector(0.0), tip.normal);
    }

    #[test]
    fn test_u_turn_miter_extends_forward() {
        let tip = miter_tip(Vec2::X, -Vec2::X);
        assert_eq!(tip.extension(3.0), 3.0);
    }

    #[test]
    fn test_straight_join_has_no_extension() {
        let tip = miter_tip(Vec2::X, Vec2::X);
        assert_eq!(tip.extension(4.0), 0.0);
    }

    #[test]
    fn test_arc_offsets_end_exactly() {
        let offsets = arc_offsets(Vec2::X, -Vec2::X, PI, PI / 4.0 + 1e-3);
        assert_eq!(offsets.len(), 5);
        assert_eq!(offsets[0], Vec2::X);
        assert_eq!(offsets[4], -Vec2::X);
        assert!((offsets[2] - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_fan_indices_are_offset_by_part_base() {
        let mut part = Part {
            points: Vec::new(),
            indices: Vec::new(),
        };
        part.push_fan([0u8, 1, 2, 3]);
        part.push_fan([4u8, 5, 6]);
        assert_eq!(part.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6]);
    }
}
