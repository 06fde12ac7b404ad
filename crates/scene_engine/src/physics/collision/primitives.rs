//! Primitive collision shapes and intersection algorithms
//!
//! Provides the two world-space primitives the collider family produces:
//! axis-aligned rectangles and circles.

use crate::foundation::math::Vec2;

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Lower-left corner
    pub min: Vec2,
    /// Upper-right corner
    pub max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a rectangle of full `width`/`height` centered on `center`
    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width.abs() * 0.5, height.abs() * 0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Horizontal extent
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Check if this rectangle overlaps another
    ///
    /// Edges that merely touch do not count as overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// Check if a point lies inside (min edges inclusive, max edges exclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Closest point on or inside the rectangle to `point`
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Check if this rectangle overlaps a circle
    ///
    /// True when the circle's center is inside the rectangle or the closest
    /// point on the rectangle is nearer than the radius.
    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        if self.contains_point(circle.center) {
            return true;
        }
        let distance_squared = (circle.center - self.closest_point(circle.center)).magnitude_squared();
        distance_squared < circle.radius * circle.radius
    }
}

/// Circle in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center point
    pub center: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle {
    /// Creates a new circle
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this circle overlaps another
    pub fn intersects(&self, other: &Circle) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared < radius_sum * radius_sum
    }

    /// Check if a point lies strictly inside
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.center).magnitude_squared() < self.radius * self.radius
    }
}
