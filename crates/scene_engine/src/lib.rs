//! # Scene Engine
//!
//! Runtime core of a small 2D entity/component game engine.
//!
//! ## Features
//!
//! - **Scene Graph**: Flat entity registry layered over a parent/child tree
//! - **Components**: Polymorphic behavior units with start/update/fixed-update/destroy hooks
//! - **Transforms**: Local position/rotation/scale composed through the parent chain
//! - **Collision**: Box and circle colliders with a closed, exhaustive dispatch table
//! - **Persistence**: JSON scene files with a typed schema per component type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default());
//!
//!     let scene = engine.scene_mut();
//!     let player = scene.create_entity("player");
//!     if let Some(entity) = scene.get_entity_mut(player) {
//!         entity.add_component(Transform::from_xy(10.0, 20.0));
//!         entity.add_component(Collider::circle(5.0));
//!     }
//!
//!     for _ in 0..60 {
//!         engine.frame(1.0 / 60.0);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod physics;
pub mod scene;

mod engine;

pub use engine::{Engine, FrameReport};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig, TimeConfig},
        ecs::{
            components::{Collider, ColliderHandle, ColliderShape, CollisionContact, ShapeKind, Transform},
            Commands, Component, ComponentContext, ComponentId, Entity, EntityId, Scene, SceneError,
        },
        events::{EventHandler, EventSink, EventSystem, EventType, HandlerId, SceneEvent},
        foundation::{
            math::Vec2,
            time::{FrameClock, FrameStep, TimeSource},
        },
        physics::{CollisionReport, CollisionSystem, WorldShape},
        scene::{ComponentRegistry, EntityRecord, SceneRecord},
        Engine, FrameReport,
    };
}
