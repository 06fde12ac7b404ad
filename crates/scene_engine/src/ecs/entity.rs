//! Entity (game object) implementation
//!
//! An entity is a named node in the scene tree. It owns an ordered list of
//! components and refers to its parent and children by [`EntityId`]; the
//! [`Scene`](super::Scene) owns every entity and keeps both sides of each
//! parent/child link in agreement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::{Component, ComponentId, ComponentSlot};
use super::components::Collider;
use crate::foundation::math::Vec2;

/// Opaque, globally unique entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing uuid
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying uuid
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Scene-tree node carrying components
pub struct Entity {
    id: EntityId,
    name: String,
    active: bool,
    position: Vec2,
    components: Vec<ComponentSlot>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    next_component_id: u32,
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>, position: Vec2) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            position,
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
            next_component_id: 0,
        }
    }

    /// Entity id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Own active flag (ancestors are not consulted)
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set the own active flag
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Spawn position recorded for the entity
    ///
    /// This is metadata kept for persistence; spatial queries read the
    /// entity's [`Transform`](super::components::Transform) instead.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the spawn position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Parent handle, `None` for roots
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Whether the entity has no parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child handles in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Append a component, returning its id
    ///
    /// The component starts enabled and will receive `start` on the next
    /// start pass that reaches this entity.
    pub fn add_component<C: Component>(&mut self, component: C) -> ComponentId {
        self.add_boxed(Box::new(component), true)
    }

    pub(crate) fn add_boxed(&mut self, component: Box<dyn Component>, enabled: bool) -> ComponentId {
        let id = ComponentId::new(self.next_component_id);
        self.next_component_id += 1;
        self.components.push(ComponentSlot::new(id, component, enabled));
        id
    }

    /// First component of type `C`, in insertion order
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.components
            .iter()
            .find_map(|slot| slot.component().downcast_ref::<C>())
    }

    /// First component of type `C`, mutably
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.components
            .iter_mut()
            .find_map(|slot| slot.component_mut().downcast_mut::<C>())
    }

    /// Every component of type `C`, in insertion order
    pub fn get_components<C: Component>(&self) -> Vec<&C> {
        self.components
            .iter()
            .filter_map(|slot| slot.component().downcast_ref::<C>())
            .collect()
    }

    /// Id of the first component of type `C`
    pub fn component_id<C: Component>(&self) -> Option<ComponentId> {
        self.components
            .iter()
            .find(|slot| slot.component().is::<C>())
            .map(ComponentSlot::id)
    }

    /// Whether any component of type `C` is attached
    pub fn has_component<C: Component>(&self) -> bool {
        self.component_id::<C>().is_some()
    }

    /// Component with the given id
    pub fn component(&self, id: ComponentId) -> Option<&(dyn Component + 'static)> {
        self.slot(id).map(ComponentSlot::component)
    }

    /// Component with the given id, mutably
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut (dyn Component + 'static)> {
        self.slot_mut(id).map(ComponentSlot::component_mut)
    }

    /// Component with the given id, downcast to `C`
    pub fn get_component_by_id<C: Component>(&self, id: ComponentId) -> Option<&C> {
        self.component(id)?.downcast_ref::<C>()
    }

    /// Component with the given id, downcast to `C` mutably
    pub fn get_component_by_id_mut<C: Component>(&mut self, id: ComponentId) -> Option<&mut C> {
        self.component_mut(id)?.downcast_mut::<C>()
    }

    /// Every collider-family component, whatever its shape
    pub fn colliders(&self) -> Vec<(ComponentId, &Collider)> {
        self.components
            .iter()
            .filter_map(|slot| slot.component().as_collider().map(|c| (slot.id(), c)))
            .collect()
    }

    /// Enable or disable per-frame hooks for one component
    ///
    /// Returns `false` if the component is not owned by this entity.
    pub fn set_component_enabled(&mut self, id: ComponentId, enabled: bool) -> bool {
        match self.slot_mut(id) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Enabled flag of one component
    pub fn is_component_enabled(&self, id: ComponentId) -> Option<bool> {
        self.slot(id).map(ComponentSlot::is_enabled)
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component slots in insertion order
    pub fn slots(&self) -> &[ComponentSlot] {
        &self.components
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [ComponentSlot] {
        &mut self.components
    }

    pub(crate) fn slot(&self, id: ComponentId) -> Option<&ComponentSlot> {
        self.components.iter().find(|slot| slot.id == id)
    }

    pub(crate) fn slot_mut(&mut self, id: ComponentId) -> Option<&mut ComponentSlot> {
        self.components.iter_mut().find(|slot| slot.id == id)
    }

    pub(crate) fn take_slot(&mut self, id: ComponentId) -> Option<ComponentSlot> {
        let index = self.components.iter().position(|slot| slot.id == id)?;
        Some(self.components.remove(index))
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: EntityId) {
        self.children.push(child);
    }

    pub(crate) fn take_children(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn drop_child(&mut self, child: EntityId) -> bool {
        let before = self.children.len();
        self.children.retain(|&c| c != child);
        self.children.len() != before
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components: Vec<&str> = self
            .components
            .iter()
            .map(|slot| slot.component().type_name())
            .collect();
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("components", &components)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::Transform;

    #[derive(Debug, PartialEq)]
    struct Score(u32);
    impl Component for Score {}

    fn entity() -> Entity {
        Entity::new(EntityId::new(), "player", Vec2::zeros())
    }

    #[test]
    fn test_get_component_first_match_in_insertion_order() {
        let mut player = entity();
        player.add_component(Score(1));
        player.add_component(Transform::default());
        player.add_component(Score(2));

        assert_eq!(player.get_component::<Score>(), Some(&Score(1)));
        assert_eq!(player.get_components::<Score>(), vec![&Score(1), &Score(2)]);
        assert!(player.has_component::<Transform>());
    }

    #[test]
    fn test_missing_component_is_none() {
        let player = entity();
        assert!(player.get_component::<Transform>().is_none());
        assert!(player.get_components::<Score>().is_empty());
    }

    #[test]
    fn test_colliders_match_every_shape() {
        let mut player = entity();
        let box_id = player.add_component(Collider::rect(10.0, 10.0));
        player.add_component(Score(0));
        let circle_id = player.add_component(Collider::circle(2.0));

        let ids: Vec<ComponentId> = player.colliders().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![box_id, circle_id]);
    }

    #[test]
    fn test_component_enable_flag() {
        let mut player = entity();
        let id = player.add_component(Score(0));

        assert_eq!(player.is_component_enabled(id), Some(true));
        assert!(player.set_component_enabled(id, false));
        assert_eq!(player.is_component_enabled(id), Some(false));
        assert!(!player.set_component_enabled(ComponentId::new(99), true));
    }

    #[test]
    fn test_entity_id_text_round_trip() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<EntityId>().is_err());
    }
}
