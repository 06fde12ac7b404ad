//! Scene registry and queries
//!
//! The scene owns every entity in a map keyed by [`EntityId`] and keeps a
//! creation-order list beside it so iteration, saving and queries are
//! deterministic. Tree edits go through the scene so both sides of every
//! parent/child link stay in agreement.

use std::collections::HashMap;

use log::{debug, trace};

use super::commands::Commands;
use super::component::{Component, ComponentId};
use super::entity::{Entity, EntityId};
use super::error::SceneError;
use crate::foundation::math::Vec2;
use crate::scene::ComponentRegistry;

/// Default logical screen size
pub const DEFAULT_SCREEN_SIZE: (u32, u32) = (800, 600);

/// Default background color
pub const DEFAULT_BACKGROUND_COLOR: (u8, u8, u8) = (0, 0, 0);

/// Flat entity registry layered over a parent/child tree
pub struct Scene {
    name: String,
    entities: HashMap<EntityId, Entity>,
    order: Vec<EntityId>,
    screen_size: (u32, u32),
    background_color: (u8, u8, u8),
    editor_mode: bool,
    registry: ComponentRegistry,
    pub(crate) commands: Commands,
}

impl Scene {
    /// Create an empty scene with the built-in component registry
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, ComponentRegistry::with_builtins())
    }

    /// Create an empty scene using a custom component registry
    pub fn with_registry(name: impl Into<String>, registry: ComponentRegistry) -> Self {
        Self {
            name: name.into(),
            entities: HashMap::new(),
            order: Vec::new(),
            screen_size: DEFAULT_SCREEN_SIZE,
            background_color: DEFAULT_BACKGROUND_COLOR,
            editor_mode: false,
            registry,
            commands: Commands::default(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Logical screen size (rendering metadata)
    pub fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    /// Set the logical screen size
    pub fn set_screen_size(&mut self, screen_size: (u32, u32)) {
        self.screen_size = screen_size;
    }

    /// Background color (rendering metadata)
    pub fn background_color(&self) -> (u8, u8, u8) {
        self.background_color
    }

    /// Set the background color
    pub fn set_background_color(&mut self, color: (u8, u8, u8)) {
        self.background_color = color;
    }

    /// Whether simulation hooks are suspended
    pub fn is_editor_mode(&self) -> bool {
        self.editor_mode
    }

    /// Suspend or resume simulation hooks
    pub fn set_editor_mode(&mut self, editor_mode: bool) {
        self.editor_mode = editor_mode;
    }

    /// Component registry used for by-name creation and persistence
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Mutable component registry, for registering game components
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Deferred edits applied after the next lifecycle pass
    pub fn commands_mut(&mut self) -> &mut Commands {
        &mut self.commands
    }

    /// Create and register a root entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.create_entity_at(name, Vec2::zeros())
    }

    /// Create and register a root entity with a spawn position
    pub fn create_entity_at(&mut self, name: impl Into<String>, position: Vec2) -> EntityId {
        let id = EntityId::new();
        self.insert_entity(Entity::new(id, name, position));
        id
    }

    /// Create an entity directly under `parent`
    pub fn create_child(&mut self, parent: EntityId, name: impl Into<String>) -> Result<EntityId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound(parent));
        }
        let id = self.create_entity(name);
        self.add_child(parent, id)?;
        Ok(id)
    }

    pub(crate) fn insert_entity(&mut self, entity: Entity) {
        let id = entity.id();
        trace!("Registering entity {} ({})", entity.name(), id);
        if self.entities.insert(id, entity).is_none() {
            self.order.push(id);
        }
    }

    /// Deregister an entity without destroying it
    ///
    /// The entity is detached from its parent and its children become roots.
    /// No destroy hooks run; use [`Scene::destroy_entity`] for that.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.detach_from_parent(id);
        let mut entity = self.entities.remove(&id)?;
        self.order.retain(|&other| other != id);

        for child in entity.take_children() {
            if let Some(child) = self.entities.get_mut(&child) {
                child.set_parent_link(None);
            }
        }
        debug!("Removed entity {} ({})", entity.name(), id);
        Some(entity)
    }

    /// Look up an entity
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Look up an entity mutably
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Whether an entity is registered
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of registered entities, at any depth
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of every entity id, in creation order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Registered entities in creation order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Snapshot of root entity ids, in creation order
    pub fn roots(&self) -> Vec<EntityId> {
        self.entities()
            .filter(|entity| entity.is_root())
            .map(Entity::id)
            .collect()
    }

    /// Entities whose name equals `name` exactly
    pub fn find_entities_by_name(&self, name: &str) -> Vec<EntityId> {
        self.entities_where(|entity| entity.name() == name)
    }

    /// Entities matching an arbitrary predicate
    pub fn entities_where(&self, predicate: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        self.entities()
            .filter(|&entity| predicate(entity))
            .map(Entity::id)
            .collect()
    }

    /// Entities carrying at least one component of type `C`
    pub fn find_entities_with_component<C: Component>(&self) -> Vec<EntityId> {
        self.entities_where(Entity::has_component::<C>)
    }

    /// Entities carrying at least one collider of any shape
    pub fn find_entities_with_collider(&self) -> Vec<EntityId> {
        self.entities_where(|entity| !entity.colliders().is_empty())
    }

    /// Construct a registered component type from saved fields and attach it
    ///
    /// Fails with [`SceneError::InvalidComponentType`] when `type_name` is not
    /// registered.
    pub fn add_component_by_name(
        &mut self,
        entity: EntityId,
        type_name: &str,
        fields: serde_json::Value,
    ) -> Result<ComponentId, SceneError> {
        if !self.contains(entity) {
            return Err(SceneError::EntityNotFound(entity));
        }
        let component = self
            .registry
            .construct(type_name, fields)
            .ok_or_else(|| SceneError::InvalidComponentType(type_name.to_string()))?
            .map_err(|source| SceneError::InvalidComponentData {
                type_name: type_name.to_string(),
                source,
            })?;

        let target = self
            .entities
            .get_mut(&entity)
            .ok_or(SceneError::EntityNotFound(entity))?;
        Ok(target.add_boxed(component, true))
    }

    /// Attach `child` under `parent`, detaching it from any previous parent
    ///
    /// The child is appended to the end of `parent`'s child list.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound(parent));
        }
        if !self.contains(child) {
            return Err(SceneError::EntityNotFound(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::HierarchyCycle { parent, child });
        }

        self.detach_from_parent(child);
        if let Some(parent_entity) = self.entities.get_mut(&parent) {
            parent_entity.push_child(child);
        }
        if let Some(child_entity) = self.entities.get_mut(&child) {
            child_entity.set_parent_link(Some(parent));
        }
        trace!("Attached {} under {}", child, parent);
        Ok(())
    }

    /// Detach `child` from `parent`, making it a root
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        let removed = self
            .entities
            .get_mut(&parent)
            .map(|entity| entity.drop_child(child))
            .unwrap_or(false);
        if removed {
            if let Some(child_entity) = self.entities.get_mut(&child) {
                child_entity.set_parent_link(None);
            }
        }
        removed
    }

    /// Move `child` under `parent`, or make it a root when `parent` is `None`
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), SceneError> {
        match parent {
            Some(parent) => self.add_child(parent, child),
            None if self.contains(child) => {
                self.detach_from_parent(child);
                Ok(())
            }
            None => Err(SceneError::EntityNotFound(child)),
        }
    }

    pub(crate) fn detach_from_parent(&mut self, child: EntityId) {
        let parent = self.entities.get(&child).and_then(Entity::parent);
        if let Some(parent) = parent {
            self.remove_child(parent, child);
        }
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut ancestors = Vec::new();
        let mut current = self.entities.get(&id).and_then(Entity::parent);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.entities.get(&parent).and_then(Entity::parent);
        }
        ancestors
    }

    /// Whether `ancestor` appears in the parent chain of `id`
    pub fn is_ancestor(&self, ancestor: EntityId, id: EntityId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Whether the entity and every ancestor are active
    pub fn is_active_in_hierarchy(&self, id: EntityId) -> bool {
        match self.entities.get(&id) {
            Some(entity) if entity.is_active() => self
                .ancestors(id)
                .iter()
                .all(|ancestor| self.entities.get(ancestor).map_or(false, Entity::is_active)),
            _ => false,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("screen_size", &self.screen_size)
            .field("background_color", &self.background_color)
            .field("editor_mode", &self.editor_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, Transform};

    #[test]
    fn test_create_registers_root() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("player");

        assert!(scene.contains(id));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.roots(), vec![id]);
        assert_eq!(scene.get_entity(id).map(Entity::name), Some("player"));
    }

    #[test]
    fn test_reparenting_moves_child() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let c = scene.create_entity("c");

        scene.add_child(a, c).unwrap();
        scene.add_child(b, c).unwrap();

        assert!(scene.get_entity(a).unwrap().children().is_empty());
        assert_eq!(scene.get_entity(b).unwrap().children(), &[c]);
        assert_eq!(scene.get_entity(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut scene = Scene::new("test");
        let root = scene.create_entity("root");
        let child = scene.create_child(root, "child").unwrap();

        assert!(matches!(
            scene.add_child(child, root),
            Err(SceneError::HierarchyCycle { .. })
        ));
        assert!(matches!(
            scene.add_child(root, root),
            Err(SceneError::HierarchyCycle { .. })
        ));
        assert_eq!(scene.get_entity(root).unwrap().parent(), None);
    }

    #[test]
    fn test_remove_child_only_when_linked() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        let child = scene.create_child(a, "child").unwrap();

        assert!(!scene.remove_child(b, child));
        assert!(scene.remove_child(a, child));
        assert!(scene.get_entity(child).unwrap().is_root());
    }

    #[test]
    fn test_remove_entity_orphans_children() {
        let mut scene = Scene::new("test");
        let parent = scene.create_entity("parent");
        let child = scene.create_child(parent, "child").unwrap();

        let removed = scene.remove_entity(parent).unwrap();

        assert!(removed.children().is_empty());
        assert!(!scene.contains(parent));
        assert!(scene.get_entity(child).unwrap().is_root());
    }

    #[test]
    fn test_queries() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("enemy");
        let b = scene.create_entity("enemy");
        let c = scene.create_entity("player");
        scene.get_entity_mut(a).unwrap().add_component(Transform::default());
        scene.get_entity_mut(c).unwrap().add_component(Collider::circle(1.0));

        assert_eq!(scene.find_entities_by_name("enemy"), vec![a, b]);
        assert_eq!(scene.find_entities_with_component::<Transform>(), vec![a]);
        assert_eq!(scene.find_entities_with_collider(), vec![c]);
        assert_eq!(scene.entities_where(|e| e.component_count() == 0), vec![b]);
    }

    #[test]
    fn test_add_component_by_name() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("box");

        scene
            .add_component_by_name(id, "BoxCollider", serde_json::json!({ "width": 4.0 }))
            .unwrap();
        let result = scene.add_component_by_name(id, "Spaceship", serde_json::json!({}));

        assert!(matches!(result, Err(SceneError::InvalidComponentType(name)) if name == "Spaceship"));
        assert_eq!(scene.get_entity(id).unwrap().colliders().len(), 1);
    }

    #[test]
    fn test_active_in_hierarchy() {
        let mut scene = Scene::new("test");
        let root = scene.create_entity("root");
        let child = scene.create_child(root, "child").unwrap();

        assert!(scene.is_active_in_hierarchy(child));
        scene.get_entity_mut(root).unwrap().set_active(false);
        assert!(!scene.is_active_in_hierarchy(child));
        assert!(scene.get_entity(child).unwrap().is_active());
    }
}
