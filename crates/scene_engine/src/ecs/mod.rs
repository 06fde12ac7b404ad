//! Entity/component scene graph
//!
//! The [`Scene`] is a flat registry of [`Entity`] values layered over a tree:
//! every entity is registered by id regardless of depth, and parent/child
//! links are id handles. Components are boxed trait objects owned by their
//! entity and driven through the lifecycle passes in [`lifecycle`].

pub mod commands;
pub mod component;
pub mod components;
pub mod entity;
pub mod error;
pub mod hierarchy;
pub mod lifecycle;
pub mod scene;

pub use commands::{Command, Commands};
pub use component::{Component, ComponentContext, ComponentId, ComponentSlot};
pub use entity::{Entity, EntityId};
pub use error::SceneError;
pub use hierarchy::WorldTransform;
pub use scene::Scene;

#[cfg(test)]
mod tests;
