//! Outline primitives for vector shapes.
//!
//! An outline is an implicitly closed loop of points. Every point carries the
//! [`SegmentCurve`] describing how the outline travels from that point to the
//! next one; the curve of the last point describes the closing segment.

use crate::CurveSample;
use glam::Vec2;
use std::fmt;
use std::sync::Arc;

/// A user-supplied parametric curve for a single outline segment.
///
/// The curve is evaluated over `t` in `[0, 1]`. Its positions at `t = 0` and
/// `t = 1` should coincide with the outline points it connects: the
/// interpolator pins the endpoint positions to the outline points.
pub trait ParametricCurve: fmt::Debug + Send + Sync {
    /// Position and derivatives at `t`.
    fn evaluate(&self, t: f32) -> CurveSample;

    /// True if the curve is a straight segment and needs no subdivision.
    fn is_flat(&self) -> bool {
        false
    }
}

/// A [`ParametricCurve`] backed by a closure.
pub struct FnCurve<F> {
    f: F,
}

impl<F> FnCurve<F>
where
    F: Fn(f32) -> CurveSample + Send + Sync,
{
    /// Wrap a closure returning samples.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnCurve<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCurve")
    }
}

impl<F> ParametricCurve for FnCurve<F>
where
    F: Fn(f32) -> CurveSample + Send + Sync,
{
    fn evaluate(&self, t: f32) -> CurveSample {
        (self.f)(t)
    }
}

/// How an outline travels from one point to the next.
#[derive(Debug, Clone, Default)]
pub enum SegmentCurve {
    /// Straight line.
    #[default]
    Line,
    /// Bezier curve through the given control points. `k` control points give
    /// a curve of degree `k + 1`; zero control points degrade to a line.
    Bezier(Vec<Vec2>),
    /// Circular arc spanning `angle` radians between the two points.
    Arc {
        /// Included angle in radians, in `(0, 2π)`.
        angle: f32,
        /// Direction of travel around the arc's center.
        counter_clockwise: bool,
    },
    /// User-supplied parametric curve.
    Custom(Arc<dyn ParametricCurve>),
}

impl SegmentCurve {
    /// Wrap a closure as a custom segment.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> CurveSample + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(FnCurve::new(f)))
    }

    /// True for plain lines.
    pub fn is_line(&self) -> bool {
        match self {
            SegmentCurve::Line => true,
            SegmentCurve::Bezier(controls) => controls.is_empty(),
            _ => false,
        }
    }

    /// Control points contributing to conservative bounds.
    pub fn control_points(&self) -> &[Vec2] {
        match self {
            SegmentCurve::Bezier(controls) => controls,
            _ => &[],
        }
    }
}

impl PartialEq for SegmentCurve {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SegmentCurve::Line, SegmentCurve::Line) => true,
            (SegmentCurve::Bezier(a), SegmentCurve::Bezier(b)) => a == b,
            (
                SegmentCurve::Arc {
                    angle: a,
                    counter_clockwise: ca,
                },
                SegmentCurve::Arc {
                    angle: b,
                    counter_clockwise: cb,
                },
            ) => a == b && ca == cb,
            (SegmentCurve::Custom(a), SegmentCurve::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// A point of an outline together with the curve leaving it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePoint {
    /// Position of the point.
    pub position: Vec2,
    /// Curve from this point to the next one (wrapping to the first).
    pub curve: SegmentCurve,
}

impl ShapePoint {
    /// A point followed by a straight line.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            curve: SegmentCurve::Line,
        }
    }

    /// A point followed by `curve`.
    pub fn with_curve(position: Vec2, curve: SegmentCurve) -> Self {
        Self { position, curve }
    }
}

/// An implicitly closed loop of points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    points: Vec<ShapePoint>,
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an outline from points.
    pub fn from_points(points: Vec<ShapePoint>) -> Self {
        Self { points }
    }

    /// Create a polygonal outline.
    pub fn polygon(positions: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            points: positions.into_iter().map(ShapePoint::new).collect(),
        }
    }

    /// Points of the outline.
    pub fn points(&self) -> &[ShapePoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the outline has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the point following `index` around the loop.
    pub fn next_index(&self, index: usize) -> usize {
        debug_assert!(index < self.points.len());
        (index + 1) % self.points.len()
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<ShapePoint> {
        &mut self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_index_wraps() {
        let outline = Outline::polygon([Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(outline.next_index(0), 1);
        assert_eq!(outline.next_index(2), 0);
    }

    #[test]
    fn test_bezier_without_controls_is_line() {
        assert!(SegmentCurve::Bezier(Vec::new()).is_line());
        assert!(!SegmentCurve::Bezier(vec![Vec2::ONE]).is_line());
        assert!(
            !SegmentCurve::Arc {
                angle: 1.0,
                counter_clockwise: true
            }
            .is_line()
        );
    }

    #[test]
    fn test_custom_curve_identity_equality() {
        let a = SegmentCurve::custom(|t| CurveSample {
            position: Vec2::new(t, 0.0),
            p_t: Vec2::X,
            p_tt: Vec2::ZERO,
        });
        let b = a.clone();
        assert_eq!(a, b);

        let c = SegmentCurve::custom(|t| CurveSample {
            position: Vec2::new(t, 0.0),
            p_t: Vec2::X,
            p_tt: Vec2::ZERO,
        });
        assert_ne!(a, c);
    }
}
