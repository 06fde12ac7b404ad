//! Integration tests for entity lifecycle across a whole scene
//!
//! Covers destruction order, active gating of subtrees and reparenting.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ecs::{Component, ComponentContext, EntityId, Scene};
use crate::events::SceneEvent;

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    label: String,
    log: Log,
}

impl Component for Recorder {
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.log.borrow_mut().push(format!("start:{}", self.label));
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _delta_time: f32) {
        self.log.borrow_mut().push(format!("update:{}", self.label));
    }

    fn on_destroy(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.log.borrow_mut().push(format!("destroy:{}", self.label));
    }
}

fn recorded(scene: &mut Scene, parent: Option<EntityId>, label: &str, log: &Log) -> EntityId {
    let id = match parent {
        Some(parent) => scene.create_child(parent, label).unwrap(),
        None => scene.create_entity(label),
    };
    scene.get_entity_mut(id).unwrap().add_component(Recorder {
        label: label.to_string(),
        log: Rc::clone(log),
    });
    id
}

#[test]
fn test_destroy_runs_children_first_then_deregisters() {
    let mut scene = Scene::new("lifecycle");
    let log = Log::default();
    let grandparent = scene.create_entity("grandparent");
    let parent = recorded(&mut scene, Some(grandparent), "parent", &log);
    let first = recorded(&mut scene, Some(parent), "first", &log);
    let second = recorded(&mut scene, Some(parent), "second", &log);
    let mut events: Vec<SceneEvent> = Vec::new();

    assert!(scene.destroy_entity(parent, &mut events));

    assert_eq!(*log.borrow(), vec!["destroy:first", "destroy:second", "destroy:parent"]);
    assert_eq!(
        events,
        vec![
            SceneEvent::EntityDestroyed(first),
            SceneEvent::EntityDestroyed(second),
            SceneEvent::EntityDestroyed(parent),
        ]
    );
    for id in [parent, first, second] {
        assert!(!scene.contains(id));
    }
    assert!(scene.get_entity(grandparent).unwrap().children().is_empty());
    assert_eq!(scene.len(), 1);
    assert!(!scene.destroy_entity(parent, &mut events));
}

#[test]
fn test_inactive_entity_freezes_its_subtree() {
    let mut scene = Scene::new("lifecycle");
    let log = Log::default();
    let parent = scene.create_entity("parent");
    let child = recorded(&mut scene, Some(parent), "child", &log);
    scene.get_entity_mut(parent).unwrap().set_active(false);

    scene.start_entity(parent, &mut ());
    scene.update_entity(parent, 0.016, &mut ());
    scene.start(&mut ());
    scene.update(0.016, &mut ());
    assert!(log.borrow().is_empty());
    assert!(scene.get_entity(child).unwrap().is_active());

    scene.get_entity_mut(parent).unwrap().set_active(true);
    scene.start(&mut ());
    scene.update(0.016, &mut ());
    assert_eq!(*log.borrow(), vec!["start:child", "update:child"]);
}

#[test]
fn test_reparent_keeps_links_consistent() {
    let mut scene = Scene::new("lifecycle");
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    let c = scene.create_child(a, "c").unwrap();

    scene.add_child(b, c).unwrap();

    assert!(!scene.get_entity(a).unwrap().children().contains(&c));
    assert_eq!(scene.get_entity(b).unwrap().children(), &[c]);
    assert_eq!(scene.get_entity(c).unwrap().parent(), Some(b));
    assert_eq!(scene.roots(), vec![a, b]);

    scene.set_parent(c, None).unwrap();
    assert!(scene.get_entity(b).unwrap().children().is_empty());
    assert_eq!(scene.roots(), vec![a, b, c]);
}

struct Spawner {
    target: EntityId,
}

impl Component for Spawner {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, _delta_time: f32) {
        let entity = ctx.entity();
        ctx.commands().set_parent(self.target, Some(entity));
    }
}

#[test]
fn test_deferred_reparent_from_a_hook() {
    let mut scene = Scene::new("lifecycle");
    let log = Log::default();
    let holder = scene.create_entity("holder");
    let loose = recorded(&mut scene, None, "loose", &log);
    scene
        .get_entity_mut(holder)
        .unwrap()
        .add_component(Spawner { target: loose });

    scene.update(0.016, &mut ());
    assert_eq!(scene.get_entity(loose).unwrap().parent(), Some(holder));
    assert_eq!(*log.borrow(), vec!["update:loose"]);

    // now a child of holder: visited once, through the hierarchy
    scene.update(0.016, &mut ());
    assert_eq!(*log.borrow(), vec!["update:loose", "update:loose"]);
}
