//! Scene error types

use super::entity::EntityId;

/// Errors raised by scene editing and persistence
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// No entity with this id is registered
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Component requested by name is not in the component registry
    #[error("Invalid component type: {0}")]
    InvalidComponentType(String),

    /// Saved data names a component type the registry does not know
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    /// Saved fields do not match the component's schema
    #[error("Invalid data for component {type_name}: {source}")]
    InvalidComponentData {
        /// Component type being loaded or saved
        type_name: String,
        /// Underlying decode error
        source: serde_json::Error,
    },

    /// A persistent component has no registered saver
    #[error("Component type {0} is not registered for saving")]
    UnregisteredComponent(String),

    /// An entity id appears twice, or collides with a registered entity
    #[error("Duplicate entity id: {0}")]
    DuplicateEntityId(EntityId),

    /// Reparenting would make an entity its own ancestor
    #[error("Attaching {child} under {parent} would create a cycle")]
    HierarchyCycle {
        /// Requested parent
        parent: EntityId,
        /// Entity being attached
        child: EntityId,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed scene document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
