//! Error types for shape validation.
//!
//! Payload builders never fail: degeneracies are clamped and self-intersections
//! resolved by construction. Errors only surface when untrusted input is
//! checked at the API boundary.

use std::fmt;

/// Errors reported when validating shapes and parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A point or control point has a NaN or infinite coordinate.
    NonFinitePoint {
        /// Outline containing the point.
        outline: usize,
        /// Index of the point within the outline.
        point: usize,
    },

    /// An arc segment has a NaN or infinite angle.
    NonFiniteArcAngle {
        /// Outline containing the arc.
        outline: usize,
        /// Index of the point the arc starts at.
        point: usize,
    },

    /// A tessellation or stroking parameter is out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NonFinitePoint { outline, point } => write!(
                f,
                "Non-finite coordinate at outline {} point {}",
                outline, point
            ),
            GeometryError::NonFiniteArcAngle { outline, point } => write!(
                f,
                "Non-finite arc angle at outline {} point {}",
                outline, point
            ),
            GeometryError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Result type for geometry validation.
pub type GeometryResult<T> = Result<T, GeometryError>;
