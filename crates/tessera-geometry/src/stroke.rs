//! Stroke parameters.
//!
//! Defines how outlines are stroked: radius, caps, joins and miter limit.

use crate::{GeometryError, GeometryResult};
use bitflags::bitflags;

/// Join style at stroke corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinStyle {
    /// Flat corner cut across the outer side.
    #[default]
    Bevel,
    /// Sharp corner, limited by the miter limit.
    Miter,
    /// Rounded corner.
    Round,
}

/// Cap style at the ends of open outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapStyle {
    /// Ends exactly at the endpoint.
    #[default]
    Flat,
    /// Square extending one radius beyond the endpoint.
    Square,
    /// Half circle around the endpoint.
    Round,
}

/// Which parts of the outline receive edge geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrokeCurves {
    /// Only joins and caps are drawn.
    None,
    /// Every edge is drawn.
    #[default]
    Solid,
}

bitflags! {
    /// Selects which join and cap geometries a pre-stroke builds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StrokeGeometryFlags: u8 {
        const SQUARE_CAPS = 1 << 0;
        const ROUNDED_CAPS = 1 << 1;
        const MITER_JOINS = 1 << 2;
        const BEVEL_JOINS = 1 << 3;
        const ROUNDED_JOINS = 1 << 4;
    }
}

impl StrokeGeometryFlags {
    /// Flag for a join style.
    pub fn for_join(style: JoinStyle) -> Self {
        match style {
            JoinStyle::Bevel => Self::BEVEL_JOINS,
            JoinStyle::Miter => Self::MITER_JOINS,
            JoinStyle::Round => Self::ROUNDED_JOINS,
        }
    }

    /// Flag for a cap style. Flat caps have no geometry.
    pub fn for_cap(style: CapStyle) -> Self {
        match style {
            CapStyle::Flat => Self::empty(),
            CapStyle::Square => Self::SQUARE_CAPS,
            CapStyle::Round => Self::ROUNDED_CAPS,
        }
    }
}

/// Parameters for turning an outline into stroke geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokingParameters {
    /// Half the stroke width.
    pub radius: f32,
    /// Join style.
    pub join_style: JoinStyle,
    /// Cap style for open outlines.
    pub cap_style: CapStyle,
    /// Maximum miter extension, in multiples of the radius, along the
    /// incoming direction.
    pub miter_limit: f32,
    /// Whether the closing edge is drawn.
    pub close_outline: bool,
    /// Whether edges are drawn.
    pub stroke_curves: StrokeCurves,
}

impl Default for StrokingParameters {
    fn default() -> Self {
        Self {
            radius: 1.0,
            join_style: JoinStyle::Bevel,
            cap_style: CapStyle::Flat,
            miter_limit: 4.0,
            close_outline: true,
            stroke_curves: StrokeCurves::Solid,
        }
    }
}

impl StrokingParameters {
    /// Parameters for a stroke of the given width.
    pub fn with_width(width: f32) -> Self {
        Self {
            radius: width * 0.5,
            ..Self::default()
        }
    }

    /// Set the radius.
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Set the join style.
    pub fn with_join(mut self, join: JoinStyle) -> Self {
        self.join_style = join;
        self
    }

    /// Set the cap style.
    pub fn with_cap(mut self, cap: CapStyle) -> Self {
        self.cap_style = cap;
        self
    }

    /// Set the miter limit.
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Set whether the closing edge is drawn.
    pub fn with_close_outline(mut self, close: bool) -> Self {
        self.close_outline = close;
        self
    }

    /// Set which edges are drawn.
    pub fn with_stroke_curves(mut self, curves: StrokeCurves) -> Self {
        self.stroke_curves = curves;
        self
    }

    /// Geometry flags needed to draw with these parameters.
    pub fn geometry_flags(&self) -> StrokeGeometryFlags {
        let caps = if self.close_outline {
            StrokeGeometryFlags::empty()
        } else {
            StrokeGeometryFlags::for_cap(self.cap_style)
        };
        caps | StrokeGeometryFlags::for_join(self.join_style)
    }

    /// Check the parameters for use with untrusted input.
    pub fn validated(self) -> GeometryResult<Self> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "radius",
                reason: format!("expected a finite non-negative value, got {}", self.radius),
            });
        }
        if self.miter_limit.is_nan() || self.miter_limit < 0.0 {
            return Err(GeometryError::InvalidParameter {
                name: "miter_limit",
                reason: format!("expected a non-negative value, got {}", self.miter_limit),
            });
        }
        Ok(self)
    }
}
