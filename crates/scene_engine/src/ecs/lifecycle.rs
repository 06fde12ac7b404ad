//! Lifecycle passes: start, update, fixed update and destruction
//!
//! Scene-level passes walk a snapshot of the active roots and recurse into
//! children, so every entity is visited once per pass. An inactive entity
//! stops the walk for both start and update passes: neither its components
//! nor its subtree run. Structural edits requested by hooks are queued as
//! [`Commands`](super::Commands) and applied once the pass has finished.
//!
//! A running hook borrows the scene through its [`ComponentContext`]; its
//! own component is swapped out of the slot for [`Vacant`] until it returns.

use log::{trace, warn};

use super::commands::Command;
use super::component::{ComponentContext, ComponentId, Vacant};
use super::entity::EntityId;
use super::scene::Scene;
use crate::events::{EventSink, SceneEvent};
use crate::foundation::time::TimeSource;

/// Upper bound on command rounds applied after one pass
///
/// Each destroy hook may queue further commands; rounds stop here so a
/// hook that keeps re-queueing work cannot stall the frame.
pub const MAX_COMMAND_ROUNDS: usize = 16;

#[derive(Clone, Copy)]
enum Hook {
    Start,
    Update(f32),
    Fixed(f32),
    Destroy,
}

impl Scene {
    /// Run `start` on every enabled component not yet started
    ///
    /// Skipped entirely in editor mode.
    pub fn start(&mut self, events: &mut dyn EventSink) {
        if self.is_editor_mode() {
            return;
        }
        for root in self.active_roots() {
            self.walk(root, Hook::Start, events);
        }
        self.apply_commands(events);
    }

    /// Run `update` across every active subtree
    ///
    /// Skipped entirely in editor mode.
    pub fn update(&mut self, delta_time: f32, events: &mut dyn EventSink) {
        if self.is_editor_mode() {
            return;
        }
        self.walk_roots(Hook::Update(delta_time), events);
    }

    /// Run `fixed_update` across every active subtree
    ///
    /// Skipped entirely in editor mode.
    pub fn fixed_update(&mut self, fixed_delta_time: f32, events: &mut dyn EventSink) {
        if self.is_editor_mode() {
            return;
        }
        self.walk_roots(Hook::Fixed(fixed_delta_time), events);
    }

    /// [`update`](Self::update) with the variable delta read from `time`
    pub fn update_with(&mut self, time: &dyn TimeSource, events: &mut dyn EventSink) {
        self.update(time.delta_time(), events);
    }

    /// [`fixed_update`](Self::fixed_update) with the step length read from `time`
    pub fn fixed_update_with(&mut self, time: &dyn TimeSource, events: &mut dyn EventSink) {
        self.fixed_update(time.fixed_delta_time(), events);
    }

    /// Run the start pass for one entity and its subtree
    pub fn start_entity(&mut self, id: EntityId, events: &mut dyn EventSink) {
        self.walk(id, Hook::Start, events);
        self.apply_commands(events);
    }

    /// Run `update` for one entity and its subtree
    pub fn update_entity(&mut self, id: EntityId, delta_time: f32, events: &mut dyn EventSink) {
        self.walk(id, Hook::Update(delta_time), events);
        self.apply_commands(events);
    }

    /// Run `fixed_update` for one entity and its subtree
    pub fn fixed_update_entity(&mut self, id: EntityId, fixed_delta_time: f32, events: &mut dyn EventSink) {
        self.walk(id, Hook::Fixed(fixed_delta_time), events);
        self.apply_commands(events);
    }

    /// Destroy an entity and its subtree
    ///
    /// Children are destroyed first (over a snapshot of the child list), then
    /// every component of the entity receives `on_destroy` whether enabled or
    /// not, then the entity is detached from its parent and deregistered.
    /// Returns `false` if the entity is not registered.
    pub fn destroy_entity(&mut self, id: EntityId, events: &mut dyn EventSink) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.destroy_recursive(id, events);
        self.apply_commands(events);
        true
    }

    /// Run a component's `on_destroy` hook, then remove it
    ///
    /// Returns `false` if the entity does not own the component.
    pub fn remove_component(&mut self, entity: EntityId, component: ComponentId, events: &mut dyn EventSink) -> bool {
        let removed = self.remove_component_inner(entity, component, events);
        self.apply_commands(events);
        removed
    }

    /// Apply queued commands until none remain or [`MAX_COMMAND_ROUNDS`] is hit
    pub fn apply_commands(&mut self, events: &mut dyn EventSink) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            let pending = self.commands.take_all();
            if pending.is_empty() {
                return;
            }
            for command in pending {
                self.apply_command(command, events);
            }
        }
        if !self.commands.is_empty() {
            warn!(
                "Dropping {} scene commands still queued after {} rounds",
                self.commands.len(),
                MAX_COMMAND_ROUNDS
            );
            self.commands.clear();
        }
    }

    fn active_roots(&self) -> Vec<EntityId> {
        self.roots()
            .into_iter()
            .filter(|&id| self.get_entity(id).map_or(false, |entity| entity.is_active()))
            .collect()
    }

    fn walk_roots(&mut self, hook: Hook, events: &mut dyn EventSink) {
        for root in self.active_roots() {
            self.walk(root, hook, events);
        }
        self.apply_commands(events);
    }

    fn walk(&mut self, id: EntityId, hook: Hook, events: &mut dyn EventSink) {
        let slots: Vec<ComponentId> = match self.get_entity(id) {
            Some(entity) if entity.is_active() => entity.slots().iter().map(|slot| slot.id()).collect(),
            _ => return,
        };
        for component in slots {
            self.run_hook(id, component, hook, events);
        }

        let children = self
            .get_entity(id)
            .map(|entity| entity.children().to_vec())
            .unwrap_or_default();
        for child in children {
            self.walk(child, hook, events);
        }
    }

    /// Run one hook with the component lifted out of its slot
    ///
    /// Returns `false` when the slot is missing or gated off (disabled, or
    /// already started for a start hook).
    fn run_hook(&mut self, entity: EntityId, component: ComponentId, hook: Hook, events: &mut dyn EventSink) -> bool {
        let Some(slot) = self.get_entity_mut(entity).and_then(|owner| owner.slot_mut(component)) else {
            return false;
        };
        match hook {
            Hook::Start if !slot.enabled || slot.started => return false,
            Hook::Start => slot.started = true,
            Hook::Update(_) | Hook::Fixed(_) if !slot.enabled => return false,
            _ => {}
        }
        let mut running = slot.replace_component(Box::new(Vacant));

        {
            let mut ctx = ComponentContext::new(self, entity, component, events);
            match hook {
                Hook::Start => running.start(&mut ctx),
                Hook::Update(delta_time) => running.update(&mut ctx, delta_time),
                Hook::Fixed(fixed_delta_time) => running.fixed_update(&mut ctx, fixed_delta_time),
                Hook::Destroy => running.on_destroy(&mut ctx),
            }
        }

        match self.get_entity_mut(entity).and_then(|owner| owner.slot_mut(component)) {
            Some(slot) => {
                slot.replace_component(running);
            }
            None => warn!("Component {:?} of {} lost its slot during a hook", component, entity),
        }
        true
    }

    fn destroy_recursive(&mut self, id: EntityId, events: &mut dyn EventSink) {
        let Some(children) = self.get_entity(id).map(|entity| entity.children().to_vec()) else {
            return;
        };
        for child in children {
            self.destroy_recursive(child, events);
        }

        let slots: Vec<ComponentId> = self
            .get_entity(id)
            .map(|entity| entity.slots().iter().map(|slot| slot.id()).collect())
            .unwrap_or_default();
        for component in slots {
            self.run_hook(id, component, Hook::Destroy, events);
        }
        self.detach_from_parent(id);
        self.remove_entity(id);
        trace!("Destroyed entity {}", id);
        events.emit(SceneEvent::EntityDestroyed(id));
    }

    fn remove_component_inner(&mut self, entity: EntityId, component: ComponentId, events: &mut dyn EventSink) -> bool {
        if !self.run_hook(entity, component, Hook::Destroy, events) {
            return false;
        }
        self.get_entity_mut(entity)
            .and_then(|owner| owner.take_slot(component))
            .is_some()
    }

    fn apply_command(&mut self, command: Command, events: &mut dyn EventSink) {
        match command {
            Command::Destroy(id) => {
                if self.contains(id) {
                    self.destroy_recursive(id, events);
                } else {
                    trace!("Ignoring destroy of unknown entity {}", id);
                }
            }
            Command::SetActive { entity, active } => match self.get_entity_mut(entity) {
                Some(target) => target.set_active(active),
                None => warn!("Cannot set active flag on unknown entity {}", entity),
            },
            Command::SetParent { child, parent } => {
                if let Err(err) = self.set_parent(child, parent) {
                    warn!("Deferred reparent of {} failed: {}", child, err);
                }
            }
            Command::RemoveComponent { entity, component } => {
                if !self.remove_component_inner(entity, component, events) {
                    trace!("Ignoring removal of missing component {:?} on {}", component, entity);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Collider, Transform};
    use crate::ecs::Component;
    use crate::foundation::math::Vec2;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Tracer {
        label: &'static str,
        log: Log,
    }

    impl Component for Tracer {
        fn start(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log.borrow_mut().push(format!("start:{}", self.label));
        }

        fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            self.log.borrow_mut().push(format!("update:{}", self.label));
        }

        fn fixed_update(&mut self, _ctx: &mut ComponentContext<'_>, _fixed_delta_time: f32) {
            self.log.borrow_mut().push(format!("fixed:{}", self.label));
        }

        fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
            self.log.borrow_mut().push(format!("destroy:{}", self.label));
        }
    }

    fn trace_hooks(scene: &mut Scene, id: EntityId, label: &'static str, log: &Log) -> ComponentId {
        scene.get_entity_mut(id).unwrap().add_component(Tracer {
            label,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn test_start_runs_once() {
        let mut scene = Scene::new("test");
        let log = Log::default();
        let id = scene.create_entity("a");
        trace_hooks(&mut scene, id, "a", &log);

        scene.start(&mut ());
        scene.start(&mut ());

        assert_eq!(*log.borrow(), vec!["start:a"]);
    }

    #[test]
    fn test_children_visited_once_per_pass() {
        let mut scene = Scene::new("test");
        let log = Log::default();
        let parent = scene.create_entity("parent");
        let child = scene.create_child(parent, "child").unwrap();
        trace_hooks(&mut scene, parent, "parent", &log);
        trace_hooks(&mut scene, child, "child", &log);

        scene.update(0.016, &mut ());
        scene.fixed_update(0.02, &mut ());

        assert_eq!(
            *log.borrow(),
            vec!["update:parent", "update:child", "fixed:parent", "fixed:child"]
        );
    }

    #[test]
    fn test_disabled_component_skips_hooks_but_not_destroy() {
        let mut scene = Scene::new("test");
        let log = Log::default();
        let id = scene.create_entity("a");
        let component = trace_hooks(&mut scene, id, "a", &log);
        scene.get_entity_mut(id).unwrap().set_component_enabled(component, false);

        scene.start(&mut ());
        scene.update(0.016, &mut ());
        scene.destroy_entity(id, &mut ());

        assert_eq!(*log.borrow(), vec!["destroy:a"]);
    }

    #[test]
    fn test_editor_mode_suspends_passes() {
        let mut scene = Scene::new("test");
        let log = Log::default();
        let id = scene.create_entity("a");
        trace_hooks(&mut scene, id, "a", &log);
        scene.set_editor_mode(true);

        scene.start(&mut ());
        scene.update(0.016, &mut ());
        scene.fixed_update(0.02, &mut ());
        assert!(log.borrow().is_empty());

        scene.set_editor_mode(false);
        scene.start(&mut ());
        assert_eq!(*log.borrow(), vec!["start:a"]);
    }

    #[test]
    fn test_remove_component_runs_destroy_hook() {
        let mut scene = Scene::new("test");
        let log = Log::default();
        let id = scene.create_entity("a");
        let component = trace_hooks(&mut scene, id, "a", &log);

        assert!(scene.remove_component(id, component, &mut ()));
        assert!(!scene.remove_component(id, component, &mut ()));
        assert_eq!(*log.borrow(), vec!["destroy:a"]);
        assert_eq!(scene.get_entity(id).unwrap().component_count(), 0);
    }

    struct SelfDestruct;

    impl Component for SelfDestruct {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            let entity = ctx.entity();
            ctx.commands().destroy(entity);
        }
    }

    #[test]
    fn test_hooks_can_destroy_their_entity() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("doomed");
        scene.get_entity_mut(id).unwrap().add_component(SelfDestruct);
        let mut events: Vec<SceneEvent> = Vec::new();

        scene.update(0.016, &mut events);

        assert!(!scene.contains(id));
        assert_eq!(events, vec![SceneEvent::EntityDestroyed(id)]);
    }

    struct Deactivate;

    impl Component for Deactivate {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            let entity = ctx.entity();
            ctx.commands().set_active(entity, false);
        }
    }

    #[test]
    fn test_deferred_commands_apply_after_pass() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("a");
        scene.get_entity_mut(id).unwrap().add_component(Deactivate);

        scene.update(0.016, &mut ());
        assert!(!scene.get_entity(id).unwrap().is_active());
        assert!(scene.commands_mut().is_empty());
    }

    struct Drift {
        velocity: Vec2,
    }

    impl Component for Drift {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
            let step = self.velocity * delta_time;
            if let Some(transform) = ctx.transform_mut() {
                transform.translate(step.x, step.y);
            }
        }
    }

    #[test]
    fn test_update_moves_own_transform() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("mover");
        {
            let entity = scene.get_entity_mut(id).unwrap();
            entity.add_component(Transform::from_xy(1.0, 1.0));
            entity.add_component(Drift {
                velocity: Vec2::new(10.0, -4.0),
            });
        }

        scene.update(0.5, &mut ());
        scene.update(0.5, &mut ());

        assert_relative_eq!(scene.world_position(id), Vec2::new(11.0, -3.0));
        assert!(scene.get_entity(id).unwrap().get_component::<Drift>().is_some());
    }

    struct Sensor {
        seen_radius: Option<f32>,
        sees_itself: bool,
        target: Option<EntityId>,
        target_x: Option<f32>,
    }

    impl Component for Sensor {
        fn start(&mut self, ctx: &mut ComponentContext<'_>) {
            self.seen_radius = ctx
                .get_component::<Collider>()
                .and_then(Collider::circle_data)
                .map(|data| data.radius);
            self.sees_itself = ctx.get_component::<Sensor>().is_some();
            self.target = ctx.scene().find_entities_by_name("target").first().copied();
            self.target_x = self.target.map(|target| ctx.scene().world_position(target).x);
            if let Some(target) = self.target {
                if let Some(entity) = ctx.get_entity_mut(target) {
                    entity.set_name("spotted");
                }
            }
        }
    }

    #[test]
    fn test_hooks_reach_siblings_and_scene() {
        let mut scene = Scene::new("test");
        let target = scene.create_entity("target");
        scene
            .get_entity_mut(target)
            .unwrap()
            .add_component(Transform::from_xy(7.0, 0.0));
        let id = scene.create_entity("watcher");
        {
            let entity = scene.get_entity_mut(id).unwrap();
            entity.add_component(Collider::circle(4.0));
            entity.add_component(Sensor {
                seen_radius: None,
                sees_itself: true,
                target: None,
                target_x: None,
            });
        }

        scene.start(&mut ());

        let sensor = scene.get_entity(id).unwrap().get_component::<Sensor>().unwrap();
        assert_eq!(sensor.seen_radius, Some(4.0));
        assert!(!sensor.sees_itself);
        assert_eq!(sensor.target, Some(target));
        assert_eq!(sensor.target_x, Some(7.0));
        assert_eq!(scene.get_entity(target).unwrap().name(), "spotted");
    }

    struct Toggler;

    impl Component for Toggler {
        fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
            let own = ctx.component_id();
            if let Some(owner) = ctx.owner_mut() {
                owner.set_component_enabled(own, false);
            }
        }
    }

    #[test]
    fn test_hook_can_disable_itself() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("a");
        let component = scene.get_entity_mut(id).unwrap().add_component(Toggler);

        scene.update(0.016, &mut ());

        let entity = scene.get_entity(id).unwrap();
        assert_eq!(entity.is_component_enabled(component), Some(false));
        assert!(entity.get_component::<Toggler>().is_some());
    }

    struct Clocked {
        delta: f32,
    }

    impl TimeSource for Clocked {
        fn delta_time(&self) -> f32 {
            self.delta
        }

        fn fixed_delta_time(&self) -> f32 {
            self.delta * 2.0
        }
    }

    #[test]
    fn test_passes_read_deltas_from_time_source() {
        let mut scene = Scene::new("test");
        let id = scene.create_entity("mover");
        {
            let entity = scene.get_entity_mut(id).unwrap();
            entity.add_component(Transform::identity());
            entity.add_component(Drift {
                velocity: Vec2::new(1.0, 0.0),
            });
        }

        scene.update_with(&Clocked { delta: 0.25 }, &mut ());
        scene.fixed_update_with(&Clocked { delta: 0.25 }, &mut ());

        assert_relative_eq!(scene.world_position(id).x, 0.25);
    }
}
