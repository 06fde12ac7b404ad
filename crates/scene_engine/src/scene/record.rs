//! Scene file records
//!
//! The JSON shape of a saved scene. Records are plain data; turning them into
//! live entities (and back) goes through the [`ComponentRegistry`](super::ComponentRegistry).
//!
//! ```json
//! {
//!   "name": "level_1",
//!   "screen_size": [800, 600],
//!   "background_color": [0, 0, 0],
//!   "entities": [
//!     {
//!       "id": "3f0c…",
//!       "name": "Player",
//!       "active": true,
//!       "position": [0.0, 0.0],
//!       "components": [
//!         { "type": "Transform", "enabled": true, "position": [0.0, 0.0], "rotation": 0.0, "scale": [1.0, 1.0], "z_index": 0 }
//!       ],
//!       "children": []
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ecs::scene::{DEFAULT_BACKGROUND_COLOR, DEFAULT_SCREEN_SIZE};
use crate::ecs::EntityId;

fn default_true() -> bool {
    true
}

fn default_entity_name() -> String {
    "Entity".to_string()
}

fn default_scene_name() -> String {
    "Untitled".to_string()
}

fn default_screen_size() -> (u32, u32) {
    DEFAULT_SCREEN_SIZE
}

fn default_background_color() -> (u8, u8, u8) {
    DEFAULT_BACKGROUND_COLOR
}

/// One saved component: its type tag, enabled flag and type-specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    /// Registered component type name
    #[serde(rename = "type")]
    pub type_name: String,

    /// Enabled flag of the component slot
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Type-specific fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ComponentRecord {
    /// Record with no fields
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            enabled: true,
            fields: Map::new(),
        }
    }
}

/// One saved entity with its components and nested children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity id; a fresh id is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,

    /// Display name
    #[serde(default = "default_entity_name")]
    pub name: String,

    /// Own active flag
    #[serde(default = "default_true")]
    pub active: bool,

    /// Spawn position `[x, y]`
    #[serde(default)]
    pub position: [f32; 2],

    /// Components in insertion order
    #[serde(default)]
    pub components: Vec<ComponentRecord>,

    /// Children in attachment order
    #[serde(default)]
    pub children: Vec<EntityRecord>,
}

impl EntityRecord {
    /// Count this record and every nested child
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(EntityRecord::subtree_len).sum::<usize>()
    }
}

/// A whole saved scene; only root entities appear at the top level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Scene name
    #[serde(default = "default_scene_name")]
    pub name: String,

    /// Logical screen size
    #[serde(default = "default_screen_size")]
    pub screen_size: (u32, u32),

    /// Background color
    #[serde(default = "default_background_color")]
    pub background_color: (u8, u8, u8),

    /// Root entities in creation order
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
}
