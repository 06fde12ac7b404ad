//! Scene save and load
//!
//! Entities are written depth-first with their children nested inside them.
//! Loading validates the whole document before touching the scene: every
//! component is decoded and every id checked first, then the entities are
//! inserted in one pass, so a failed load leaves the scene unchanged.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};

use super::record::{ComponentRecord, EntityRecord, SceneRecord};
use super::registry::ComponentRegistry;
use crate::ecs::{Component, Entity, EntityId, Scene, SceneError};
use crate::foundation::math::Vec2;

/// Entity decoded from a record but not yet registered
struct PendingEntity {
    id: EntityId,
    name: String,
    active: bool,
    position: Vec2,
    components: Vec<(Box<dyn Component>, bool)>,
    children: Vec<PendingEntity>,
}

impl Scene {
    /// Serialize an entity and its subtree
    ///
    /// Non-persistent components are skipped. A persistent component whose
    /// type is not registered fails with [`SceneError::UnregisteredComponent`].
    pub fn serialize_entity(&self, id: EntityId) -> Result<EntityRecord, SceneError> {
        let entity = self.get_entity(id).ok_or(SceneError::EntityNotFound(id))?;

        let mut components = Vec::with_capacity(entity.component_count());
        for slot in entity.slots() {
            let component = slot.component();
            if !component.is_persistent() {
                debug!("Skipping non-persistent component {} on {}", component.type_name(), id);
                continue;
            }
            components.push(self.registry().save_component(component, slot.is_enabled())?);
        }

        let children = entity
            .children()
            .iter()
            .map(|&child| self.serialize_entity(child))
            .collect::<Result<Vec<_>, _>>()?;

        let position = entity.position();
        Ok(EntityRecord {
            id: Some(id),
            name: entity.name().to_string(),
            active: entity.is_active(),
            position: [position.x, position.y],
            components,
            children,
        })
    }

    /// Recreate an entity subtree from a record, as a new root
    ///
    /// Ids in the record are kept; missing ids are generated. Nothing is
    /// registered unless the whole subtree decodes, and an id that is already
    /// registered (or repeated in the record) fails with
    /// [`SceneError::DuplicateEntityId`].
    pub fn instantiate(&mut self, record: &EntityRecord) -> Result<EntityId, SceneError> {
        let mut seen = HashSet::new();
        let pending = self.decode_entity(record, &mut seen)?;
        Ok(self.insert_pending(pending, None))
    }

    /// Snapshot the whole scene
    pub fn to_record(&self) -> Result<SceneRecord, SceneError> {
        let entities = self
            .roots()
            .into_iter()
            .map(|root| self.serialize_entity(root))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SceneRecord {
            name: self.name().to_string(),
            screen_size: self.screen_size(),
            background_color: self.background_color(),
            entities,
        })
    }

    /// Build a scene from a record using the built-in component registry
    pub fn from_record(record: &SceneRecord) -> Result<Scene, SceneError> {
        Self::from_record_with_registry(record, ComponentRegistry::with_builtins())
    }

    /// Build a scene from a record using a custom component registry
    pub fn from_record_with_registry(record: &SceneRecord, registry: ComponentRegistry) -> Result<Scene, SceneError> {
        let mut scene = Scene::with_registry(record.name.clone(), registry);
        scene.set_screen_size(record.screen_size);
        scene.set_background_color(record.background_color);

        let mut seen = HashSet::new();
        let roots = record
            .entities
            .iter()
            .map(|entity| scene.decode_entity(entity, &mut seen))
            .collect::<Result<Vec<_>, _>>()?;
        for root in roots {
            scene.insert_pending(root, None);
        }
        Ok(scene)
    }

    /// Serialize the scene to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self.to_record()?)?)
    }

    /// Parse a scene from JSON using the built-in component registry
    pub fn from_json(json: &str) -> Result<Scene, SceneError> {
        let record: SceneRecord = serde_json::from_str(json)?;
        Self::from_record(&record)
    }

    /// Write the scene to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json)?;
        info!("Saved scene '{}' ({} entities) to {}", self.name(), self.len(), path.display());
        Ok(())
    }

    /// Read a scene from a JSON file using the built-in component registry
    pub fn load(path: impl AsRef<Path>) -> Result<Scene, SceneError> {
        Self::load_with_registry(path, ComponentRegistry::with_builtins())
    }

    /// Read a scene from a JSON file using a custom component registry
    pub fn load_with_registry(path: impl AsRef<Path>, registry: ComponentRegistry) -> Result<Scene, SceneError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let record: SceneRecord = serde_json::from_str(&contents)?;
        let scene = Self::from_record_with_registry(&record, registry)?;
        info!("Loaded scene '{}' ({} entities) from {}", scene.name(), scene.len(), path.display());
        Ok(scene)
    }

    fn decode_entity(&self, record: &EntityRecord, seen: &mut HashSet<EntityId>) -> Result<PendingEntity, SceneError> {
        let id = record.id.unwrap_or_else(EntityId::new);
        if self.contains(id) || !seen.insert(id) {
            return Err(SceneError::DuplicateEntityId(id));
        }

        let components = record
            .components
            .iter()
            .map(|component| self.decode_component(component))
            .collect::<Result<Vec<_>, _>>()?;

        let children = record
            .children
            .iter()
            .map(|child| self.decode_entity(child, seen))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PendingEntity {
            id,
            name: record.name.clone(),
            active: record.active,
            position: Vec2::new(record.position[0], record.position[1]),
            components,
            children,
        })
    }

    fn decode_component(&self, record: &ComponentRecord) -> Result<(Box<dyn Component>, bool), SceneError> {
        let component = self.registry().load_component(record)?;
        Ok((component, record.enabled))
    }

    fn insert_pending(&mut self, pending: PendingEntity, parent: Option<EntityId>) -> EntityId {
        let PendingEntity {
            id,
            name,
            active,
            position,
            components,
            children,
        } = pending;

        let mut entity = Entity::new(id, name, position);
        entity.set_active(active);
        for (component, enabled) in components {
            entity.add_boxed(component, enabled);
        }
        self.insert_entity(entity);

        if let Some(parent) = parent {
            if let Some(parent_entity) = self.get_entity_mut(parent) {
                parent_entity.push_child(id);
            }
            if let Some(entity) = self.get_entity_mut(id) {
                entity.set_parent_link(Some(parent));
            }
        }

        for child in children {
            self.insert_pending(child, Some(id));
        }
        id
    }
}
