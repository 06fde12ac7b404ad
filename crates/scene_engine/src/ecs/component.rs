//! Component trait and the per-entity component slot
//!
//! A component is a polymorphic behavior unit owned by exactly one entity.
//! The owning entity drives its hooks; hooks see the rest of the scene only
//! through a [`ComponentContext`], which lends them the scene while they run.

use std::any::Any;

use super::commands::Commands;
use super::components::{Collider, Transform};
use super::entity::{Entity, EntityId};
use super::hierarchy::WorldTransform;
use super::scene::Scene;
use crate::events::{EventSink, SceneEvent};

/// Identifier of a component, unique within its owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u32);

impl ComponentId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Upcast helper so `dyn Component` can be downcast to its concrete type
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior unit attached to an entity
///
/// Every hook has an empty default, so a component only overrides what it
/// needs. Hooks run single-threaded and must not block.
pub trait Component: AsAny {
    /// Name written to the `type` field of saved scenes
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once, the first start pass that reaches this component while enabled
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called every frame while the component and its entity chain are enabled
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {}

    /// Called every fixed step while the component and its entity chain are enabled
    fn fixed_update(&mut self, _ctx: &mut ComponentContext<'_>, _fixed_delta_time: f32) {}

    /// Called exactly once when the component is removed or its entity destroyed
    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Whether the component is written to saved scenes
    fn is_persistent(&self) -> bool {
        true
    }

    /// Collider view, for the collider family
    fn as_collider(&self) -> Option<&Collider> {
        None
    }

    /// Mutable collider view, for the collider family
    fn as_collider_mut(&mut self) -> Option<&mut Collider> {
        None
    }
}

impl dyn Component {
    /// Downcast to a concrete component type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        AsAny::as_any(self).downcast_ref::<T>()
    }

    /// Mutably downcast to a concrete component type
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        AsAny::as_any_mut(self).downcast_mut::<T>()
    }

    /// Check the concrete type
    pub fn is<T: Component>(&self) -> bool {
        AsAny::as_any(self).is::<T>()
    }
}

/// Strip the module path (and generic arguments) from a type name
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Owned component plus the bookkeeping the entity keeps for it
pub struct ComponentSlot {
    pub(crate) id: ComponentId,
    pub(crate) enabled: bool,
    pub(crate) started: bool,
    pub(crate) component: Box<dyn Component>,
}

impl ComponentSlot {
    pub(crate) fn new(id: ComponentId, component: Box<dyn Component>, enabled: bool) -> Self {
        Self {
            id,
            enabled,
            started: false,
            component,
        }
    }

    /// Component id within the owning entity
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Whether per-frame hooks run for this component
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `start` has already run
    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Borrow the component
    pub fn component(&self) -> &(dyn Component + 'static) {
        self.component.as_ref()
    }

    /// Mutably borrow the component
    pub fn component_mut(&mut self) -> &mut (dyn Component + 'static) {
        self.component.as_mut()
    }

    pub(crate) fn replace_component(&mut self, component: Box<dyn Component>) -> Box<dyn Component> {
        std::mem::replace(&mut self.component, component)
    }
}

impl std::fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("id", &self.id)
            .field("type", &self.component.type_name())
            .field("enabled", &self.enabled)
            .field("started", &self.started)
            .finish()
    }
}

/// Placeholder left in a slot while the slot's component runs a hook
pub(crate) struct Vacant;

impl Component for Vacant {
    fn is_persistent(&self) -> bool {
        false
    }
}

/// What a component hook can reach besides its own state
///
/// The running component is lifted out of its slot for the duration of the
/// hook, so the owning entity and the rest of the scene can be borrowed
/// freely. Lookups on the owning entity do not see the running component;
/// it is reachable as `self`. Structural edits (destroy, reparent, removing
/// components) go through [`commands`](Self::commands) and are applied once
/// the pass finishes.
pub struct ComponentContext<'a> {
    scene: &'a mut Scene,
    entity: EntityId,
    component: ComponentId,
    events: &'a mut dyn EventSink,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        entity: EntityId,
        component: ComponentId,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            scene,
            entity,
            component,
            events,
        }
    }

    /// Entity that owns the running component
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Id of the running component
    pub fn component_id(&self) -> ComponentId {
        self.component
    }

    /// Read access to the whole scene
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// The owning entity
    pub fn owner(&self) -> Option<&Entity> {
        self.scene.get_entity(self.entity)
    }

    /// The owning entity, mutably
    pub fn owner_mut(&mut self) -> Option<&mut Entity> {
        self.scene.get_entity_mut(self.entity)
    }

    /// Another entity of the scene, mutably
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.scene.get_entity_mut(id)
    }

    /// First sibling component of type `C` on the owning entity
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.owner()?.get_component::<C>()
    }

    /// First sibling component of type `C` on the owning entity, mutably
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.owner_mut()?.get_component_mut::<C>()
    }

    /// The owning entity's transform
    pub fn transform(&self) -> Option<&Transform> {
        self.get_component::<Transform>()
    }

    /// The owning entity's transform, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.get_component_mut::<Transform>()
    }

    /// World placement of the owning entity
    pub fn world_transform(&self) -> WorldTransform {
        self.scene.world_transform(self.entity)
    }

    /// Deferred scene edits, applied after the current pass
    pub fn commands(&mut self) -> &mut Commands {
        self.scene.commands_mut()
    }

    /// Forward an event to the frame's event sink
    pub fn emit(&mut self, event: SceneEvent) {
        self.events.emit(event);
    }

    /// Emit a named custom event sourced from the owning entity
    pub fn emit_custom(&mut self, name: impl Into<String>) {
        let source = self.entity;
        self.events.emit(SceneEvent::Custom {
            name: name.into(),
            source,
        });
    }
}
