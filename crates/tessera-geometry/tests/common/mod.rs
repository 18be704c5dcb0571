//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use glam::Vec2;
use tessera_geometry::{Outline, Shape, ShapeBuilder};

pub const EPSILON: f32 = 1e-4;

pub fn square(min: Vec2, size: f32) -> Outline {
    Outline::polygon([
        min,
        min + Vec2::new(size, 0.0),
        min + Vec2::splat(size),
        min + Vec2::new(0.0, size),
    ])
}

pub fn clockwise_square(min: Vec2, size: f32) -> Outline {
    Outline::polygon([
        min,
        min + Vec2::new(0.0, size),
        min + Vec2::splat(size),
        min + Vec2::new(size, 0.0),
    ])
}

pub fn unit_square() -> Shape {
    Shape::from_outlines(vec![square(Vec2::ZERO, 1.0)])
}

/// Two counter-clockwise squares overlapping in `[1, 2]²`.
pub fn overlapping_squares() -> Shape {
    Shape::from_outlines(vec![square(Vec2::ZERO, 2.0), square(Vec2::ONE, 2.0)])
}

/// Counter-clockwise `[0, 4]²` with a clockwise hole `[1, 3]²`.
pub fn annulus() -> Shape {
    Shape::from_outlines(vec![
        square(Vec2::ZERO, 4.0),
        clockwise_square(Vec2::ONE, 2.0),
    ])
}

/// Self-crossing bow tie: a clockwise lobe on the right, counter-clockwise on
/// the left.
pub fn bow_tie() -> Shape {
    Shape::from_outlines(vec![Outline::polygon([
        Vec2::ZERO,
        Vec2::splat(2.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(0.0, 2.0),
    ])])
}

/// Two triangular lobes of opposite orientation touching only at `(4, 4)`.
pub fn touching_lobes() -> Shape {
    Shape::from_outlines(vec![Outline::polygon([
        Vec2::new(4.0, 4.0),
        Vec2::new(2.0, 4.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(4.0, 4.0),
        Vec2::new(4.0, 1.0),
        Vec2::new(3.0, 1.0),
    ])])
}

/// Two counter-clockwise squares sharing the edge `x = 2`, traversed in
/// opposite directions.
pub fn adjacent_squares() -> Shape {
    Shape::from_outlines(vec![
        square(Vec2::ZERO, 2.0),
        square(Vec2::new(2.0, 0.0), 2.0),
    ])
}

/// A unit square in the corner of a 2×2 square, overlapping two of its edges.
pub fn cornered_squares() -> Shape {
    Shape::from_outlines(vec![square(Vec2::ZERO, 2.0), square(Vec2::ZERO, 1.0)])
}

pub fn unit_circle() -> Shape {
    ShapeBuilder::new().circle(Vec2::ZERO, 1.0).build()
}

pub fn regular_polygon(sides: u32) -> Shape {
    ShapeBuilder::new()
        .regular_polygon(Vec2::ZERO, 1.0, sides, 0.0)
        .build()
}

pub fn approx_eq(a: Vec2, b: Vec2) -> bool {
    (a - b).abs().max_element() < EPSILON
}
