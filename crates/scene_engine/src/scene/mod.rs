//! Scene persistence
//!
//! - [`record`] - the JSON document shape
//! - [`registry`] - type name to save/load function mapping
//! - [`persistence`] - `Scene` save, load and instantiate

pub mod persistence;
pub mod record;
pub mod registry;

pub use record::{ComponentRecord, EntityRecord, SceneRecord};
pub use registry::{ComponentRegistry, LoadFn, SaveFn, RESERVED_KEYS};
