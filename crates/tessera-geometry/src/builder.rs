//! Fluent construction of shapes.

use crate::{Outline, ParametricCurve, SegmentCurve, Shape, ShapePoint};
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::sync::Arc;

/// Circle approximation constant for cubic Bezier quadrants.
const KAPPA: f32 = 0.552_284_8;

/// Builder for constructing shapes outline by outline.
///
/// Every outline is implicitly closed: the curve set by a `close_*` call (a
/// line by default) runs from the last point back to the first. Segment calls
/// made before any [`move_to`](Self::move_to) start an outline at the origin.
///
/// ```
/// use glam::Vec2;
/// use tessera_geometry::ShapeBuilder;
///
/// let shape = ShapeBuilder::new()
///     .move_to(Vec2::ZERO)
///     .line_to(Vec2::new(10.0, 0.0))
///     .quad_to(Vec2::new(15.0, 5.0), Vec2::new(10.0, 10.0))
///     .build();
/// assert_eq!(shape.outlines()[0].len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ShapeBuilder {
    outlines: Vec<Outline>,
}

impl ShapeBuilder {
    /// Create a new shape builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new outline at a position.
    pub fn move_to(&mut self, to: Vec2) -> &mut Self {
        self.outlines
            .push(Outline::from_points(vec![ShapePoint::new(to)]));
        self
    }

    /// Draw a line to a position.
    pub fn line_to(&mut self, to: Vec2) -> &mut Self {
        self.segment_to(SegmentCurve::Line, to)
    }

    /// Draw a horizontal line to x coordinate.
    pub fn horizontal_line_to(&mut self, x: f32) -> &mut Self {
        let to = Vec2::new(x, self.current_pos().y);
        self.line_to(to)
    }

    /// Draw a vertical line to y coordinate.
    pub fn vertical_line_to(&mut self, y: f32) -> &mut Self {
        let to = Vec2::new(self.current_pos().x, y);
        self.line_to(to)
    }

    /// Draw a quadratic Bezier curve.
    pub fn quad_to(&mut self, control: Vec2, to: Vec2) -> &mut Self {
        self.segment_to(SegmentCurve::Bezier(vec![control]), to)
    }

    /// Draw a cubic Bezier curve.
    pub fn cubic_to(&mut self, control1: Vec2, control2: Vec2, to: Vec2) -> &mut Self {
        self.segment_to(SegmentCurve::Bezier(vec![control1, control2]), to)
    }

    /// Draw a Bezier curve of any degree through `controls`.
    pub fn bezier_to(&mut self, controls: &[Vec2], to: Vec2) -> &mut Self {
        self.segment_to(SegmentCurve::Bezier(controls.to_vec()), to)
    }

    /// Draw a circular arc spanning `angle` radians.
    pub fn arc_to(&mut self, angle: f32, counter_clockwise: bool, to: Vec2) -> &mut Self {
        self.segment_to(
            SegmentCurve::Arc {
                angle,
                counter_clockwise,
            },
            to,
        )
    }

    /// Draw a user-supplied curve.
    pub fn custom_to(&mut self, curve: Arc<dyn ParametricCurve>, to: Vec2) -> &mut Self {
        self.segment_to(SegmentCurve::Custom(curve), to)
    }

    /// Close the current outline with a straight line.
    pub fn close(&mut self) -> &mut Self {
        self.close_with(SegmentCurve::Line)
    }

    /// Close the current outline with a Bezier curve through `controls`.
    pub fn close_bezier(&mut self, controls: &[Vec2]) -> &mut Self {
        self.close_with(SegmentCurve::Bezier(controls.to_vec()))
    }

    /// Close the current outline with a circular arc.
    pub fn close_arc(&mut self, angle: f32, counter_clockwise: bool) -> &mut Self {
        self.close_with(SegmentCurve::Arc {
            angle,
            counter_clockwise,
        })
    }

    /// Close the current outline with a user-supplied curve.
    pub fn close_custom(&mut self, curve: Arc<dyn ParametricCurve>) -> &mut Self {
        self.close_with(SegmentCurve::Custom(curve))
    }

    /// Add a counter-clockwise rectangle.
    pub fn rect(&mut self, position: Vec2, size: Vec2) -> &mut Self {
        self.move_to(position);
        self.line_to(position + Vec2::new(size.x, 0.0));
        self.line_to(position + size);
        self.line_to(position + Vec2::new(0.0, size.y))
    }

    /// Add a counter-clockwise rounded rectangle.
    pub fn rounded_rect(&mut self, position: Vec2, size: Vec2, radius: f32) -> &mut Self {
        let r = radius.min(size.x / 2.0).min(size.y / 2.0);
        if r <= 0.0 {
            return self.rect(position, size);
        }

        self.move_to(position + Vec2::new(r, 0.0));
        self.line_to(position + Vec2::new(size.x - r, 0.0));
        self.arc_to(FRAC_PI_2, true, position + Vec2::new(size.x, r));
        self.line_to(position + Vec2::new(size.x, size.y - r));
        self.arc_to(FRAC_PI_2, true, position + Vec2::new(size.x - r, size.y));
        self.line_to(position + Vec2::new(r, size.y));
        self.arc_to(FRAC_PI_2, true, position + Vec2::new(0.0, size.y - r));
        self.line_to(position + Vec2::new(0.0, r));
        self.close_arc(FRAC_PI_2, true)
    }

    /// Add a counter-clockwise circle made of two half-circle arcs.
    pub fn circle(&mut self, center: Vec2, radius: f32) -> &mut Self {
        self.move_to(center + Vec2::new(radius, 0.0));
        self.arc_to(PI, true, center - Vec2::new(radius, 0.0));
        self.close_arc(PI, true)
    }

    /// Add a counter-clockwise ellipse made of four cubic Bezier quadrants.
    pub fn ellipse(&mut self, center: Vec2, radii: Vec2) -> &mut Self {
        let k = radii * KAPPA;
        let (rx, ry) = (Vec2::new(radii.x, 0.0), Vec2::new(0.0, radii.y));
        let (kx, ky) = (Vec2::new(k.x, 0.0), Vec2::new(0.0, k.y));

        self.move_to(center + rx);
        self.cubic_to(center + rx + ky, center + ry + kx, center + ry);
        self.cubic_to(center + ry - kx, center - rx + ky, center - rx);
        self.cubic_to(center - rx - ky, center - ry - kx, center - ry);
        self.close_bezier(&[center - ry + kx, center + rx - ky])
    }

    /// Add a polygon through `points`.
    pub fn polygon(&mut self, points: &[Vec2]) -> &mut Self {
        let Some((&first, rest)) = points.split_first() else {
            return self;
        };

        self.move_to(first);
        for &point in rest {
            self.line_to(point);
        }
        self
    }

    /// Add a regular polygon; the first vertex sits at angle `rotation`.
    pub fn regular_polygon(
        &mut self,
        center: Vec2,
        radius: f32,
        sides: u32,
        rotation: f32,
    ) -> &mut Self {
        if sides < 3 {
            return self;
        }
        let points: Vec<Vec2> = (0..sides)
            .map(|i| center + Vec2::from_angle(rotation + TAU * i as f32 / sides as f32) * radius)
            .collect();
        self.polygon(&points)
    }

    /// Add a star alternating between outer tips and inner valleys.
    pub fn star(
        &mut self,
        center: Vec2,
        outer_radius: f32,
        inner_radius: f32,
        points: u32,
    ) -> &mut Self {
        if points < 2 {
            return self;
        }
        let step = PI / points as f32;
        let vertices: Vec<Vec2> = (0..points * 2)
            .map(|i| {
                let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
                center + Vec2::from_angle(FRAC_PI_2 + step * i as f32) * radius
            })
            .collect();
        self.polygon(&vertices)
    }

    /// Append an already built outline.
    pub fn outline(&mut self, outline: Outline) -> &mut Self {
        self.outlines.push(outline);
        self
    }

    /// Get the current position.
    pub fn current_pos(&self) -> Vec2 {
        self.outlines
            .last()
            .and_then(|outline| outline.points().last())
            .map_or(Vec2::ZERO, |point| point.position)
    }

    /// Build the shape, leaving the builder empty.
    pub fn build(&mut self) -> Shape {
        Shape::from_outlines(std::mem::take(&mut self.outlines))
    }

    fn current_outline(&mut self) -> &mut Outline {
        if self.outlines.is_empty() {
            self.move_to(Vec2::ZERO);
        }
        let last = self.outlines.len() - 1;
        &mut self.outlines[last]
    }

    fn segment_to(&mut self, curve: SegmentCurve, to: Vec2) -> &mut Self {
        let points = self.current_outline().points_mut();
        if let Some(last) = points.last_mut() {
            last.curve = curve;
        }
        points.push(ShapePoint::new(to));
        self
    }

    fn close_with(&mut self, curve: SegmentCurve) -> &mut Self {
        if let Some(last) = self
            .outlines
            .last_mut()
            .and_then(|outline| outline.points_mut().last_mut())
        {
            last.curve = curve;
        }
        self
    }
}
