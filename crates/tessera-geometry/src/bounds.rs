//! Axis-aligned bounding boxes.

use glam::Vec2;

/// An axis-aligned bounding box.
///
/// The default box is empty: its minimum is `+inf` and its maximum `-inf`, so
/// including any point makes it valid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    min: Vec2,
    max: Vec2,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// A box containing nothing.
    pub const EMPTY: Self = Self {
        min: Vec2::INFINITY,
        max: Vec2::NEG_INFINITY,
    };

    /// Create a box from two corners (in any order).
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut bounds = Self::EMPTY;
        for p in points {
            bounds.include(p);
        }
        bounds
    }

    /// Grow the box to contain `p`.
    pub fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True if no point has been included.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Width and height; zero for an empty box.
    pub fn size(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Center point; the origin for an empty box.
    pub fn center(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    /// Box grown by `amount` on every side.
    pub fn inflate(&self, amount: f32) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }

    /// True if `p` lies inside or on the border.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if the two boxes overlap (touching counts).
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.is_empty() || other.is_empty())
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Corners in counter-clockwise order starting at the minimum corner.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}
