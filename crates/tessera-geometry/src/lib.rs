//! Tessera Geometry - 2D vector shape geometry pipeline
//!
//! This crate provides:
//! - Outlines of lines, Bezier curves of any degree, circular arcs and
//!   user-supplied parametric curves
//! - Curvature-adaptive tessellation of those outlines
//! - Radius-independent stroke geometry (joins and caps) with miter limits
//!   applied at query time
//! - Winding-aware triangulation, so any fill rule is a choice of triangle
//!   groups instead of a re-triangulation
//! - Fill and stroke mesh assembly into `Pod` vertex formats
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tessera_geometry::*;
//!
//! let mut shape = ShapeBuilder::new()
//!     .circle(Vec2::ZERO, 50.0)
//!     .rect(Vec2::splat(-20.0), Vec2::splat(40.0))
//!     .build();
//!
//! let params = TessellationParams::default();
//! let fill = shape.fill_mesh(&params, &FillRule::OddEven, false);
//! let stroke = shape.stroke_mesh(&params, &StrokingParameters::with_width(2.0));
//! assert!(!fill.is_empty());
//! assert!(!stroke.is_empty());
//! ```

// Core primitives
mod bounds;
mod builder;
mod curve;
mod error;
mod outline;
mod payload;
mod shape;

// Tessellation
mod tessellator;

// Stroking
mod prestroke;
mod stroke;
mod stroke_mesh;

// Filling
mod fill;
mod triangulator;

// Output
mod vertex;

// Re-exports
pub use bounds::*;
pub use builder::*;
pub use curve::*;
pub use error::*;
pub use outline::*;
pub use payload::{PayloadKey, PayloadKind, ShapePayload};
pub use shape::*;

pub use tessellator::*;

pub use prestroke::*;
pub use stroke::*;
pub use stroke_mesh::*;

pub use fill::*;
pub use triangulator::*;

pub use vertex::*;
