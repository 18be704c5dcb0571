//! Analytic curve interpolators.
//!
//! A [`CurveInterpolator`] evaluates the segment between two outline points
//! (line, Bezier of any degree, circular arc or a user curve) and returns the
//! position together with its first and second derivatives.

use crate::{ParametricCurve, SegmentCurve};
use glam::Vec2;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Arcs with an included angle below this are evaluated as lines.
pub const ARC_ANGLE_EPSILON: f32 = 1e-5;

/// Derivatives shorter than this are treated as zero when computing normals.
pub const TANGENT_EPSILON: f32 = 1e-6;

/// Position and derivatives of a curve at a parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    /// Position.
    pub position: Vec2,
    /// First derivative with respect to `t`.
    pub p_t: Vec2,
    /// Second derivative with respect to `t`.
    pub p_tt: Vec2,
}

impl CurveSample {
    /// Curvature times speed, `|p_t × p_tt| / max(ε, |p_t|²)`.
    ///
    /// This is the rate at which the tangent turns per unit of `t`.
    pub fn turning_rate(&self) -> f32 {
        let speed_sq = self.p_t.length_squared().max(TANGENT_EPSILON * TANGENT_EPSILON);
        self.p_t.perp_dot(self.p_tt).abs() / speed_sq
    }
}

/// A sample point of a tessellated curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Position on the curve.
    pub position: Vec2,
    /// Unit normal, the tangent rotated by +90°.
    pub normal: Vec2,
    /// Parameter of the point along its edge, in `[0, 1]`.
    pub time: f32,
}

impl CurvePoint {
    /// Unit tangent, recovered by rotating the normal by -90°.
    pub fn tangent(&self) -> Vec2 {
        Vec2::new(self.normal.y, -self.normal.x)
    }
}

/// Evaluator for a Bezier curve of arbitrary degree.
///
/// The curve is stored as a power-basis polynomial twice: once in `t` and
/// once in `1 - t`. Each half of the domain is evaluated with the polynomial
/// whose expansion point is closest, which keeps the endpoints exact and the
/// evaluation stable near `t = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierInterpolator {
    forward: Vec<Vec2>,
    reverse: Vec<Vec2>,
}

impl BezierInterpolator {
    /// Build from the full control polygon `[start, controls.., end]`.
    pub fn new(control_polygon: &[Vec2]) -> Self {
        debug_assert!(control_polygon.len() >= 2);
        let reversed: Vec<Vec2> = control_polygon.iter().rev().copied().collect();
        Self {
            forward: power_basis(control_polygon),
            reverse: power_basis(&reversed),
        }
    }

    /// Degree of the curve.
    pub fn degree(&self) -> usize {
        self.forward.len() - 1
    }

    /// Evaluate at `t`.
    pub fn evaluate(&self, t: f32) -> CurveSample {
        if t <= 0.5 {
            let (position, p_t, p_tt) = horner(&self.forward, t);
            CurveSample {
                position,
                p_t,
                p_tt,
            }
        } else {
            // d/dt f(1 - t) = -f'(1 - t); the second derivative keeps its sign.
            let (position, p_s, p_ss) = horner(&self.reverse, 1.0 - t);
            CurveSample {
                position,
                p_t: -p_s,
                p_tt: p_ss,
            }
        }
    }
}

/// Power-basis coefficients `c_k = C(n,k) Σ_i (-1)^(k-i) C(k,i) P_i`.
fn power_basis(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len() - 1;
    (0..=n)
        .map(|k| {
            let mut sum = Vec2::ZERO;
            for (i, p) in points.iter().enumerate().take(k + 1) {
                let sign = if (k - i) % 2 == 0 { 1.0 } else { -1.0 };
                sum += *p * (sign * binomial(k, i));
            }
            sum * binomial(n, k)
        })
        .collect()
}

fn binomial(n: usize, k: usize) -> f32 {
    let k = k.min(n - k);
    let mut result = 1.0f64;
    for i in 0..k {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result as f32
}

/// Evaluate a polynomial and its first two derivatives at `t`.
fn horner(coefficients: &[Vec2], t: f32) -> (Vec2, Vec2, Vec2) {
    let mut p = Vec2::ZERO;
    let mut d = Vec2::ZERO;
    let mut dd = Vec2::ZERO;
    for c in coefficients.iter().rev() {
        dd = dd * t + d;
        d = d * t + p;
        p = p * t + *c;
    }
    (p, d, dd * 2.0)
}

/// Evaluator for a circular arc given by its chord and included angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcInterpolator {
    center: Vec2,
    radius: f32,
    start_angle: f32,
    angular_speed: f32,
}

impl ArcInterpolator {
    /// Build the arc from `start` to `end` sweeping `angle` radians.
    ///
    /// Returns `None` when the arc is degenerate (tiny angle or zero chord)
    /// and should be treated as a line.
    pub fn new(start: Vec2, end: Vec2, angle: f32, counter_clockwise: bool) -> Option<Self> {
        let angle = angle.abs().min(TAU - ARC_ANGLE_EPSILON);
        let chord = end - start;
        let length = chord.length();
        if angle < ARC_ANGLE_EPSILON || length < TANGENT_EPSILON {
            return None;
        }

        let half = angle * 0.5;
        let radius = length / (2.0 * half.sin());
        let left = chord.perp() / length;
        let distance = 0.5 * length / half.tan();
        let mid = (start + end) * 0.5;

        let (center, angular_speed) = if counter_clockwise {
            (mid + left * distance, angle)
        } else {
            (mid - left * distance, -angle)
        };
        let offset = start - center;

        Some(Self {
            center,
            radius,
            start_angle: offset.y.atan2(offset.x),
            angular_speed,
        })
    }

    /// Center of the circle.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius of the circle.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Evaluate at `t`.
    pub fn evaluate(&self, t: f32) -> CurveSample {
        let (s, c) = (self.start_angle + self.angular_speed * t).sin_cos();
        let radial = Vec2::new(c, s);
        CurveSample {
            position: self.center + radial * self.radius,
            p_t: Vec2::new(-s, c) * (self.radius * self.angular_speed),
            p_tt: -radial * (self.radius * self.angular_speed * self.angular_speed),
        }
    }
}

#[derive(Debug, Clone)]
enum CurveKind {
    Line,
    Bezier(BezierInterpolator),
    Arc(ArcInterpolator),
    Custom(Arc<dyn ParametricCurve>),
}

/// Analytic evaluator for the segment between two outline points.
#[derive(Debug, Clone)]
pub struct CurveInterpolator {
    kind: CurveKind,
    start: Vec2,
    end: Vec2,
    start_sample: CurveSample,
    end_sample: CurveSample,
}

impl CurveInterpolator {
    /// Build the interpolator for the segment `start → end` shaped by `curve`.
    pub fn new(start: Vec2, end: Vec2, curve: &SegmentCurve) -> Self {
        let kind = match curve {
            SegmentCurve::Line => CurveKind::Line,
            SegmentCurve::Bezier(controls) if controls.is_empty() => CurveKind::Line,
            SegmentCurve::Bezier(controls) => {
                let mut polygon = Vec::with_capacity(controls.len() + 2);
                polygon.push(start);
                polygon.extend_from_slice(controls);
                polygon.push(end);
                CurveKind::Bezier(BezierInterpolator::new(&polygon))
            }
            SegmentCurve::Arc {
                angle,
                counter_clockwise,
            } => match ArcInterpolator::new(start, end, *angle, *counter_clockwise) {
                Some(arc) => CurveKind::Arc(arc),
                None => CurveKind::Line,
            },
            SegmentCurve::Custom(curve) => CurveKind::Custom(Arc::clone(curve)),
        };

        let mut interpolator = Self {
            kind,
            start,
            end,
            start_sample: line_sample(start, end),
            end_sample: line_sample(end, end + (end - start)),
        };
        interpolator.start_sample = CurveSample {
            position: start,
            ..interpolator.evaluate_raw(0.0)
        };
        interpolator.end_sample = CurveSample {
            position: end,
            ..interpolator.evaluate_raw(1.0)
        };
        interpolator
    }

    /// Evaluate the segment at `t` in `[0, 1]`.
    pub fn evaluate(&self, t: f32) -> CurveSample {
        if t <= 0.0 {
            self.start_sample
        } else if t >= 1.0 {
            self.end_sample
        } else {
            self.evaluate_raw(t)
        }
    }

    fn evaluate_raw(&self, t: f32) -> CurveSample {
        match &self.kind {
            CurveKind::Line => CurveSample {
                position: self.start.lerp(self.end, t),
                p_t: self.end - self.start,
                p_tt: Vec2::ZERO,
            },
            CurveKind::Bezier(bezier) => bezier.evaluate(t),
            CurveKind::Arc(arc) => arc.evaluate(t),
            CurveKind::Custom(curve) => curve.evaluate(t),
        }
    }

    /// Sample at `t = 0`, with the position pinned to the start point.
    pub fn start_point(&self) -> CurveSample {
        self.start_sample
    }

    /// Sample at `t = 1`, with the position pinned to the end point.
    pub fn end_point(&self) -> CurveSample {
        self.end_sample
    }

    /// True if the segment is a straight line and never needs subdivision.
    pub fn is_flat(&self) -> bool {
        match &self.kind {
            CurveKind::Line => true,
            CurveKind::Custom(curve) => curve.is_flat(),
            CurveKind::Bezier(_) | CurveKind::Arc(_) => false,
        }
    }

    /// Unit normal for `sample`.
    ///
    /// Falls back to the chord normal where the derivative vanishes (cusps,
    /// coincident control points, zero-length segments).
    pub fn normal(&self, sample: &CurveSample) -> Vec2 {
        let length = sample.p_t.length();
        if length > TANGENT_EPSILON {
            return sample.p_t.perp() / length;
        }
        let chord = self.end - self.start;
        let chord_length = chord.length();
        if chord_length > TANGENT_EPSILON {
            chord.perp() / chord_length
        } else {
            Vec2::Y
        }
    }

    /// Evaluate at `t` and package the result as a [`CurvePoint`].
    pub fn curve_point(&self, t: f32) -> CurvePoint {
        let sample = self.evaluate(t);
        self.make_point(&sample, t)
    }

    pub(crate) fn make_point(&self, sample: &CurveSample, t: f32) -> CurvePoint {
        CurvePoint {
            position: sample.position,
            normal: self.normal(sample),
            time: t,
        }
    }
}

fn line_sample(from: Vec2, to: Vec2) -> CurveSample {
    CurveSample {
        position: from,
        p_t: to - from,
        p_tt: Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_line_interpolator_is_flat() {
        let interp = CurveInterpolator::new(Vec2::ZERO, Vec2::new(10.0, 0.0), &SegmentCurve::Line);
        assert!(interp.is_flat());
        assert_eq!(interp.evaluate(0.5).position, Vec2::new(5.0, 0.0));
        assert_eq!(interp.normal(&interp.evaluate(0.5)), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_quadratic_matches_bernstein_form() {
        let from = Vec2::new(0.0, 0.0);
        let control = Vec2::new(50.0, 100.0);
        let to = Vec2::new(100.0, 0.0);
        let interp = CurveInterpolator::new(from, to, &SegmentCurve::Bezier(vec![control]));

        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let mt = 1.0 - t;
            let expected = from * mt * mt + control * (2.0 * mt * t) + to * t * t;
            let expected_d = (control - from) * (2.0 * mt) + (to - control) * (2.0 * t);
            let expected_dd = (to - control * 2.0 + from) * 2.0;
            let sample = interp.evaluate(t);
            assert!(close(sample.position, expected), "t = {t}");
            assert!(close(sample.p_t, expected_d), "t = {t}");
            assert!(close(sample.p_tt, expected_dd), "t = {t}");
        }
    }

    #[test]
    fn test_cubic_endpoints_are_exact() {
        let from = Vec2::new(0.3, 0.7);
        let to = Vec2::new(100.1, -3.9);
        let interp = CurveInterpolator::new(
            from,
            to,
            &SegmentCurve::Bezier(vec![Vec2::new(25.0, 100.0), Vec2::new(75.0, 100.0)]),
        );
        assert_eq!(interp.start_point().position, from);
        assert_eq!(interp.end_point().position, to);
        assert_eq!(interp.evaluate(1.0).position, to);
    }

    #[test]
    fn test_high_degree_bezier_halves_agree() {
        let controls = vec![
            Vec2::new(10.0, 40.0),
            Vec2::new(20.0, -30.0),
            Vec2::new(30.0, 60.0),
            Vec2::new(40.0, -10.0),
        ];
        let interp = CurveInterpolator::new(Vec2::ZERO, Vec2::new(50.0, 0.0), &SegmentCurve::Bezier(controls));
        let below = interp.evaluate(0.5 - 1e-4);
        let above = interp.evaluate(0.5 + 1e-4);
        assert!((below.position - above.position).length() < 0.05);
        assert!((below.p_t - above.p_t).length() < 0.5);
    }

    #[test]
    fn test_quarter_arc_center_and_radius() {
        let arc = ArcInterpolator::new(Vec2::X, Vec2::Y, FRAC_PI_2, true).unwrap();
        assert!(close(arc.center(), Vec2::ZERO));
        assert!((arc.radius() - 1.0).abs() < 1e-5);

        let mid = arc.evaluate(0.5);
        let radial = Vec2::splat(0.5f32.sqrt());
        assert!(close(mid.position, radial));
        assert!(close(mid.p_t.normalize(), radial.perp()));
    }

    #[test]
    fn test_clockwise_half_circle_goes_below_chord() {
        let interp = CurveInterpolator::new(
            Vec2::new(1.0, 0.0),
            Vec2::new(-1.0, 0.0),
            &SegmentCurve::Arc {
                angle: PI,
                counter_clockwise: false,
            },
        );
        let mid = interp.evaluate(0.5).position;
        assert!(close(mid, Vec2::new(0.0, -1.0)));
    }

    #[test]
    fn test_tiny_arc_degrades_to_line() {
        let interp = CurveInterpolator::new(
            Vec2::ZERO,
            Vec2::X,
            &SegmentCurve::Arc {
                angle: 0.0,
                counter_clockwise: true,
            },
        );
        assert!(interp.is_flat());
    }

    #[test]
    fn test_turning_rate_of_arc_is_angular_speed() {
        let arc = ArcInterpolator::new(Vec2::X, Vec2::Y, FRAC_PI_2, true).unwrap();
        let rate = arc.evaluate(0.3).turning_rate();
        assert!((rate - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_tangent_uses_chord_normal() {
        let interp = CurveInterpolator::new(
            Vec2::ZERO,
            Vec2::new(0.0, 5.0),
            &SegmentCurve::Bezier(vec![Vec2::ZERO]),
        );
        // The first control point coincides with the start, so p_t(0) = 0.
        let normal = interp.normal(&interp.start_point());
        assert!(close(normal, Vec2::new(-1.0, 0.0)));
    }
}
