//! Planar geometry kernel
//!
//! Pure, stateless operations over immutable geometry values. All predicates
//! take an explicit epsilon tolerance so that nearly-equal floating point
//! quantities are treated as equal, avoiding gap/overlap artifacts.

mod polygon;
mod set;

pub use polygon::Polygon;
pub use set::PolygonSet;

use glam::Vec2;

/// Axis-aligned bounding region in canvas space
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Rect {
    /// Create a rect from explicit corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create a rect with its minimum corner at the origin
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// Width of the rect
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the rect
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Area of the rect
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point of the rect
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Diagonal length, used to scale convergence thresholds
    #[inline]
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).length()
    }

    /// Check whether a point lies inside the rect (boundary inclusive)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Convert the rect into its counter-clockwise boundary polygon
    pub fn to_polygon(&self) -> Polygon {
        Polygon::from_raw(vec![
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ])
    }
}
