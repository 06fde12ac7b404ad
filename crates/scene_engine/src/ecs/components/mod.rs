//! Built-in components
//!
//! The two component families the core itself understands: spatial
//! placement and collision shapes.

pub mod collider;
pub mod transform;

pub use collider::{
    BoxColliderData, CircleColliderData, Collider, ColliderHandle, ColliderShape, CollisionCallback,
    CollisionContact, ShapeKind,
};
pub use transform::{Transform, TransformData};
