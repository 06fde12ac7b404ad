//! World-space transform composition
//!
//! World values are recomputed from the parent chain on every call:
//!
//! ```text
//! world_position(e) = rotate(local(e), world_rotation(p)) * world_scale(p) + world_position(p)
//! world_rotation(e) = (local_rotation(e) + world_rotation(p)) mod 360
//! world_scale(e)    = local_scale(e) * world_scale(p)          (component-wise)
//! ```
//!
//! Scale is not rotated. An entity without a [`Transform`] sits at the
//! origin with unit scale; composition stops at a parent that has none.

use super::components::{Collider, ColliderHandle, Transform};
use super::entity::EntityId;
use super::scene::Scene;
use crate::foundation::math::{normalize_degrees, rotate_degrees, Vec2};
use crate::physics::collision::WorldShape;

/// World-space placement of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    /// World position
    pub position: Vec2,
    /// World rotation in degrees, in `[0, 360)`
    pub rotation: f32,
    /// World scale
    pub scale: Vec2,
}

impl WorldTransform {
    /// Origin, no rotation, unit scale
    pub fn identity() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Transform with no parent
    pub fn from_local(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation(),
            scale: transform.scale,
        }
    }

    /// Compose a local transform under this (parent) world transform
    pub fn compose(&self, local: &Transform) -> Self {
        let rotated = rotate_degrees(local.position, self.rotation);
        Self {
            position: rotated.component_mul(&self.scale) + self.position,
            rotation: normalize_degrees(local.rotation() + self.rotation),
            scale: local.scale.component_mul(&self.scale),
        }
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Scene {
    /// First [`Transform`] of an entity
    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.get_entity(id)?.get_component::<Transform>()
    }

    /// First [`Transform`] of an entity, mutably
    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.get_entity_mut(id)?.get_component_mut::<Transform>()
    }

    /// World transform of an entity
    ///
    /// Unknown entities and entities without a transform yield
    /// [`WorldTransform::identity`].
    pub fn world_transform(&self, id: EntityId) -> WorldTransform {
        let Some(local) = self.transform(id) else {
            return WorldTransform::identity();
        };

        let parent = self.get_entity(id).and_then(|entity| entity.parent());
        match parent {
            Some(parent) if self.transform(parent).is_some() => self.world_transform(parent).compose(local),
            _ => WorldTransform::from_local(local),
        }
    }

    /// World position of an entity
    pub fn world_position(&self, id: EntityId) -> Vec2 {
        self.world_transform(id).position
    }

    /// World rotation of an entity in degrees
    pub fn world_rotation(&self, id: EntityId) -> f32 {
        self.world_transform(id).rotation
    }

    /// World scale of an entity
    pub fn world_scale(&self, id: EntityId) -> Vec2 {
        self.world_transform(id).scale
    }

    /// The collider addressed by a handle
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.get_entity(handle.entity)?
            .component(handle.component)?
            .as_collider()
    }

    /// World-space shape of a collider, placed by its entity's world transform
    ///
    /// `None` when the handle does not address a collider.
    pub fn collider_world_shape(&self, handle: ColliderHandle) -> Option<WorldShape> {
        let collider = self.collider(handle)?;
        Some(collider.world_shape(&self.world_transform(handle.entity)))
    }

    /// Whether two colliders overlap right now
    ///
    /// Pure geometry: active and enabled flags are not consulted. `None`
    /// when either handle does not address a collider.
    pub fn colliders_overlap(&self, a: ColliderHandle, b: ColliderHandle) -> Option<bool> {
        let first = self.collider_world_shape(a)?;
        let second = self.collider_world_shape(b)?;
        Some(first.intersects(&second))
    }
}
