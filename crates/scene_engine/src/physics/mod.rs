//! Collision detection
//!
//! Narrow-phase shape tests plus the stateful driver that turns overlaps
//! into enter/exit notifications. Physical response is not modelled.

pub mod collision;
pub mod collision_system;

pub use collision::{Circle, Rect, WorldShape};
pub use collision_system::{CollisionPair, CollisionReport, CollisionSystem, LayerFilter};
