//! Integration tests for colliders placed through the transform hierarchy

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;

use crate::ecs::components::{Collider, ColliderHandle, Transform};
use crate::ecs::{EntityId, Scene};
use crate::foundation::math::Vec2;
use crate::physics::CollisionSystem;

fn body(scene: &mut Scene, parent: Option<EntityId>, transform: Transform, collider: Option<Collider>) -> EntityId {
    let id = scene.create_entity("body");
    let entity = scene.get_entity_mut(id).unwrap();
    entity.add_component(transform);
    if let Some(collider) = collider {
        entity.add_component(collider);
    }
    if let Some(parent) = parent {
        scene.add_child(parent, id).unwrap();
    }
    id
}

fn handle(scene: &Scene, id: EntityId) -> ColliderHandle {
    let (component, _) = scene.get_entity(id).unwrap().colliders()[0];
    ColliderHandle::new(id, component)
}

fn colliding(scene: &Scene, a: EntityId, b: EntityId) -> bool {
    scene.colliders_overlap(handle(scene, a), handle(scene, b)).unwrap()
}

#[test]
fn test_circle_distances() {
    let mut scene = Scene::new("collision");
    let a = body(&mut scene, None, Transform::from_xy(0.0, 0.0), Some(Collider::circle(5.0)));
    let b = body(&mut scene, None, Transform::from_xy(9.0, 0.0), Some(Collider::circle(5.0)));

    assert!(colliding(&scene, a, b));

    scene.transform_mut(b).unwrap().set_position(11.0, 0.0);
    assert!(!colliding(&scene, a, b));
}

#[test]
fn test_box_and_circle_symmetry() {
    let mut scene = Scene::new("collision");
    let rect = body(&mut scene, None, Transform::identity(), Some(Collider::rect(10.0, 10.0)));
    let circle = body(&mut scene, None, Transform::from_xy(20.0, 0.0), Some(Collider::circle(1.0)));

    assert!(!colliding(&scene, rect, circle));
    assert!(!colliding(&scene, circle, rect));

    scene.transform_mut(circle).unwrap().set_position(4.0, 0.0);
    assert!(colliding(&scene, rect, circle));
    assert!(colliding(&scene, circle, rect));
}

#[test]
fn test_child_collider_follows_parent() {
    let mut scene = Scene::new("collision");
    let ship = body(
        &mut scene,
        None,
        Transform::from_xy(100.0, 0.0).with_scale(Vec2::new(2.0, 2.0)),
        None,
    );
    let shield = body(&mut scene, Some(ship), Transform::from_xy(5.0, 0.0), Some(Collider::circle(3.0)));
    let rock = body(&mut scene, None, Transform::from_xy(120.0, 0.0), Some(Collider::circle(5.0)));

    // shield center (110, 0), radius 6: gap to rock is 10 < 11
    assert_relative_eq!(scene.world_position(shield), Vec2::new(110.0, 0.0));
    assert!(colliding(&scene, shield, rock));

    scene.transform_mut(ship).unwrap().set_scale(1.0, 1.0);
    // shield center (105, 0), radius 3: gap 15 > 8
    assert!(!colliding(&scene, shield, rock));
}

#[test]
fn test_missing_transform_sits_at_origin() {
    let mut scene = Scene::new("collision");
    let bare = scene.create_entity("bare");
    scene
        .get_entity_mut(bare)
        .unwrap()
        .add_component(Collider::circle(1.0));
    let neighbour = body(&mut scene, None, Transform::from_xy(1.5, 0.0), Some(Collider::circle(1.0)));

    assert!(colliding(&scene, bare, neighbour));
}

#[test]
fn test_driver_fires_enter_once_while_moving() {
    let mut scene = Scene::new("collision");
    let mut system = CollisionSystem::new();
    let enters = Rc::new(RefCell::new(0));
    let exits = Rc::new(RefCell::new(0));

    let mut wall = Collider::rect(10.0, 100.0);
    let enter_count = Rc::clone(&enters);
    wall.add_collision_enter_callback(move |_| *enter_count.borrow_mut() += 1);
    let exit_count = Rc::clone(&exits);
    wall.add_collision_exit_callback(move |_| *exit_count.borrow_mut() += 1);
    body(&mut scene, None, Transform::identity(), Some(wall));
    let ball = body(&mut scene, None, Transform::from_xy(-20.0, 0.0), Some(Collider::circle(2.0)));

    for _ in 0..40 {
        scene.transform_mut(ball).unwrap().translate(1.0, 0.0);
        system.step(&mut scene, &mut ());
    }

    assert_eq!(*enters.borrow(), 1);
    assert_eq!(*exits.borrow(), 1);
}
