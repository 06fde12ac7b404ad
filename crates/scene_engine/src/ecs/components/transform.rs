//! Transform component
//!
//! Stores an entity's local position, rotation (degrees) and scale. World
//! values are never stored; [`Scene::world_transform`](crate::ecs::Scene::world_transform)
//! composes them through the parent chain on every call.

use serde::{Deserialize, Serialize};

use crate::ecs::Component;
use crate::foundation::math::{direction_from_degrees, normalize_degrees, Vec2};

/// Local-space placement of an entity
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Local position relative to the parent transform
    pub position: Vec2,

    rotation: f32,

    /// Local non-uniform scale
    pub scale: Vec2,

    /// Render ordering key, unused by the core
    pub z_index: i32,
}

impl Component for Transform {
    fn type_name(&self) -> &'static str {
        "Transform"
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            z_index: 0,
        }
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from position only
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create from position coordinates
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_position(Vec2::new(x, y))
    }

    /// Builder pattern: Set rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.set_rotation(degrees);
        self
    }

    /// Builder pattern: Set scale
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Builder pattern: Set z-index
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Local rotation in degrees, always in `[0, 360)`
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the local rotation, normalizing it
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Add to the local rotation
    pub fn rotate(&mut self, degrees: f32) {
        self.set_rotation(self.rotation + degrees);
    }

    /// Set the local position
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    /// Move by an offset in local space
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position += Vec2::new(dx, dy);
    }

    /// Set the local scale
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = Vec2::new(x, y);
    }

    /// Unit vector along the local rotation
    ///
    /// Parent rotation is not applied; compose with
    /// [`Scene::world_rotation`](crate::ecs::Scene::world_rotation) for a
    /// world-space direction.
    pub fn forward(&self) -> Vec2 {
        direction_from_degrees(self.rotation)
    }

    /// Unit vector 90 degrees from [`forward`](Self::forward)
    pub fn right(&self) -> Vec2 {
        direction_from_degrees(self.rotation + 90.0)
    }
}

/// Saved form of a [`Transform`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformData {
    /// Local position `[x, y]`
    pub position: [f32; 2],
    /// Local rotation in degrees
    pub rotation: f32,
    /// Local scale `[x, y]`
    pub scale: [f32; 2],
    /// Render ordering key
    pub z_index: i32,
}

impl Default for TransformData {
    fn default() -> Self {
        Self::from(&Transform::default())
    }
}

impl From<&Transform> for TransformData {
    fn from(transform: &Transform) -> Self {
        Self {
            position: [transform.position.x, transform.position.y],
            rotation: transform.rotation,
            scale: [transform.scale.x, transform.scale.y],
            z_index: transform.z_index,
        }
    }
}

impl From<TransformData> for Transform {
    fn from(data: TransformData) -> Self {
        Self {
            position: Vec2::new(data.position[0], data.position[1]),
            rotation: normalize_degrees(data.rotation),
            scale: Vec2::new(data.scale[0], data.scale[1]),
            z_index: data.z_index,
        }
    }
}
