//! World-space collision shapes
//!
//! Colliders store their geometry in local space and produce a temporary
//! [`WorldShape`] from the owning entity's world transform for each test.
//! Pairwise dispatch is an exhaustive match, so adding a shape variant is a
//! compile error until every pair is handled.

use super::primitives::{Circle, Rect};
use crate::ecs::components::ShapeKind;

/// Temporary world-space shape for collision testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorldShape {
    /// Axis-aligned box
    Rect(Rect),
    /// Circle
    Circle(Circle),
}

impl WorldShape {
    /// Shape family of this world shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rect(_) => ShapeKind::Box,
            Self::Circle(_) => ShapeKind::Circle,
        }
    }

    /// Test intersection with another world-space shape
    ///
    /// Symmetric for every pair: circle-versus-box delegates to the
    /// box-versus-circle test with arguments swapped.
    pub fn intersects(&self, other: &WorldShape) -> bool {
        match (self, other) {
            (Self::Rect(a), Self::Rect(b)) => a.intersects(b),
            (Self::Rect(rect), Self::Circle(circle)) => rect.intersects_circle(circle),
            (Self::Circle(circle), Self::Rect(rect)) => rect.intersects_circle(circle),
            (Self::Circle(a), Self::Circle(b)) => a.intersects(b),
        }
    }

    /// Box form, if this is a box
    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Self::Rect(rect) => Some(rect),
            Self::Circle(_) => None,
        }
    }

    /// Circle form, if this is a circle
    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Self::Circle(circle) => Some(circle),
            Self::Rect(_) => None,
        }
    }
}
