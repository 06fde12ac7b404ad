//! Collider components
//!
//! One component type covers the whole collider family; the concrete shape
//! (box or circle) is a variant of [`ColliderShape`]. World geometry is
//! derived from the owning entity's world transform at query time and never
//! cached between frames.
//!
//! Colliders only store callbacks and their overlap record. The
//! [`CollisionSystem`](crate::physics::CollisionSystem) diffs overlaps between
//! steps and invokes the enter/exit hooks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ecs::{Component, ComponentId, EntityId, WorldTransform};
use crate::foundation::math::Vec2;
use crate::physics::collision::{Circle, Rect, WorldShape};

/// Default full width and height of a box collider
pub const DEFAULT_BOX_SIZE: f32 = 100.0;

/// Default radius of a circle collider
pub const DEFAULT_CIRCLE_RADIUS: f32 = 50.0;

/// Addresses one collider component in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle {
    /// Owning entity
    pub entity: EntityId,
    /// Collider component within that entity
    pub component: ComponentId,
}

impl ColliderHandle {
    /// Creates a handle
    pub fn new(entity: EntityId, component: ComponentId) -> Self {
        Self { entity, component }
    }
}

/// Shape family tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Axis-aligned box
    Box,
    /// Circle
    Circle,
}

/// Local-space collider geometry
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    /// Axis-aligned box, full `width`/`height` centered on the offset point
    Box {
        /// Full width before scaling
        width: f32,
        /// Full height before scaling
        height: f32,
        /// Offset from the entity's world position
        offset: Vec2,
    },
    /// Circle centered on the offset point
    Circle {
        /// Radius before scaling
        radius: f32,
        /// Offset from the entity's world position
        offset: Vec2,
    },
}

impl ColliderShape {
    /// Shape family tag
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Box { .. } => ShapeKind::Box,
            Self::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Local offset
    pub fn offset(&self) -> Vec2 {
        match self {
            Self::Box { offset, .. } | Self::Circle { offset, .. } => *offset,
        }
    }
}

/// What a collision callback learns about the other collider
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionContact {
    /// The collider whose callback is running
    pub this: ColliderHandle,
    /// The collider it started or stopped overlapping
    pub other: ColliderHandle,
    /// World shape of the other collider at detection time
    pub other_shape: WorldShape,
    /// Whether the other collider is a trigger
    pub other_is_trigger: bool,
    /// Layer tag of the other collider
    pub other_layer: i32,
}

/// Enter/exit callback
pub type CollisionCallback = Box<dyn FnMut(&CollisionContact)>;

/// Collision shape component with enter/exit callbacks
pub struct Collider {
    /// Only notify, no physical response
    pub is_trigger: bool,

    /// Advisory filtering tag; the core does not filter on it
    pub layer: i32,

    /// Local geometry
    pub shape: ColliderShape,

    enter_callbacks: Vec<CollisionCallback>,
    exit_callbacks: Vec<CollisionCallback>,
    current_collisions: Vec<ColliderHandle>,
}

impl Collider {
    /// Create a new collider with default settings
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            is_trigger: false,
            layer: 0,
            shape,
            enter_callbacks: Vec::new(),
            exit_callbacks: Vec::new(),
            current_collisions: Vec::new(),
        }
    }

    /// Box collider with full `width` and `height`
    pub fn rect(width: f32, height: f32) -> Self {
        Self::new(ColliderShape::Box {
            width,
            height,
            offset: Vec2::zeros(),
        })
    }

    /// Circle collider
    pub fn circle(radius: f32) -> Self {
        Self::new(ColliderShape::Circle {
            radius,
            offset: Vec2::zeros(),
        })
    }

    /// Builder pattern: Set local offset
    pub fn with_offset(mut self, new_offset: Vec2) -> Self {
        match &mut self.shape {
            ColliderShape::Box { offset, .. } | ColliderShape::Circle { offset, .. } => {
                *offset = new_offset;
            }
        }
        self
    }

    /// Builder pattern: Set layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Mark this as a trigger volume
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Shape family of this collider
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// World-space geometry for the given world transform
    ///
    /// Boxes stay axis-aligned whatever the rotation. Scale multiplies the
    /// box extents per axis; a circle's radius uses the mean of both axes.
    pub fn world_shape(&self, world: &WorldTransform) -> WorldShape {
        let center = world.position + self.shape.offset();
        match &self.shape {
            ColliderShape::Box { width, height, .. } => WorldShape::Rect(Rect::from_center(
                center,
                width * world.scale.x,
                height * world.scale.y,
            )),
            ColliderShape::Circle { radius, .. } => {
                let mean_scale = (world.scale.x.abs() + world.scale.y.abs()) * 0.5;
                WorldShape::Circle(Circle::new(center, radius * mean_scale))
            }
        }
    }

    /// Test overlap with another collider, given both world transforms
    ///
    /// [`Scene::colliders_overlap`](crate::ecs::Scene::colliders_overlap)
    /// looks the transforms up from collider handles instead.
    pub fn is_colliding_with(
        &self,
        own_world: &WorldTransform,
        other: &Collider,
        other_world: &WorldTransform,
    ) -> bool {
        self.world_shape(own_world)
            .intersects(&other.world_shape(other_world))
    }

    /// Register a callback for the first step an overlap is detected
    pub fn add_collision_enter_callback(&mut self, callback: impl FnMut(&CollisionContact) + 'static) {
        self.enter_callbacks.push(Box::new(callback));
    }

    /// Register a callback for the first step an overlap stops
    pub fn add_collision_exit_callback(&mut self, callback: impl FnMut(&CollisionContact) + 'static) {
        self.exit_callbacks.push(Box::new(callback));
    }

    /// Invoke every enter callback
    pub fn on_collision_enter(&mut self, contact: &CollisionContact) {
        for callback in &mut self.enter_callbacks {
            callback(contact);
        }
    }

    /// Invoke every exit callback
    pub fn on_collision_exit(&mut self, contact: &CollisionContact) {
        for callback in &mut self.exit_callbacks {
            callback(contact);
        }
    }

    /// Colliders overlapping this one as of the last collision step
    pub fn current_collisions(&self) -> &[ColliderHandle] {
        &self.current_collisions
    }

    /// Whether the last collision step saw an overlap with `other`
    pub fn is_touching(&self, other: ColliderHandle) -> bool {
        self.current_collisions.contains(&other)
    }

    pub(crate) fn set_current_collisions(&mut self, collisions: Vec<ColliderHandle>) {
        self.current_collisions = collisions;
    }

    /// Saved form, for box colliders
    pub fn box_data(&self) -> Option<BoxColliderData> {
        match &self.shape {
            ColliderShape::Box { width, height, offset } => Some(BoxColliderData {
                is_trigger: self.is_trigger,
                layer: self.layer,
                width: *width,
                height: *height,
                offset: [offset.x, offset.y],
            }),
            ColliderShape::Circle { .. } => None,
        }
    }

    /// Saved form, for circle colliders
    pub fn circle_data(&self) -> Option<CircleColliderData> {
        match &self.shape {
            ColliderShape::Circle { radius, offset } => Some(CircleColliderData {
                is_trigger: self.is_trigger,
                layer: self.layer,
                radius: *radius,
                offset: [offset.x, offset.y],
            }),
            ColliderShape::Box { .. } => None,
        }
    }
}

impl Component for Collider {
    fn type_name(&self) -> &'static str {
        match self.shape.kind() {
            ShapeKind::Box => "BoxCollider",
            ShapeKind::Circle => "CircleCollider",
        }
    }

    fn as_collider(&self) -> Option<&Collider> {
        Some(self)
    }

    fn as_collider_mut(&mut self) -> Option<&mut Collider> {
        Some(self)
    }
}

impl fmt::Debug for Collider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collider")
            .field("is_trigger", &self.is_trigger)
            .field("layer", &self.layer)
            .field("shape", &self.shape)
            .field("enter_callbacks", &self.enter_callbacks.len())
            .field("exit_callbacks", &self.exit_callbacks.len())
            .field("current_collisions", &self.current_collisions)
            .finish()
    }
}

/// Saved form of a box collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxColliderData {
    /// Trigger flag
    pub is_trigger: bool,
    /// Layer tag
    pub layer: i32,
    /// Full width
    pub width: f32,
    /// Full height
    pub height: f32,
    /// Local offset `[x, y]`
    pub offset: [f32; 2],
}

impl Default for BoxColliderData {
    fn default() -> Self {
        Self {
            is_trigger: false,
            layer: 0,
            width: DEFAULT_BOX_SIZE,
            height: DEFAULT_BOX_SIZE,
            offset: [0.0, 0.0],
        }
    }
}

impl From<BoxColliderData> for Collider {
    fn from(data: BoxColliderData) -> Self {
        let mut collider = Collider::rect(data.width, data.height)
            .with_offset(Vec2::new(data.offset[0], data.offset[1]))
            .with_layer(data.layer);
        collider.is_trigger = data.is_trigger;
        collider
    }
}

/// Saved form of a circle collider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleColliderData {
    /// Trigger flag
    pub is_trigger: bool,
    /// Layer tag
    pub layer: i32,
    /// Radius
    pub radius: f32,
    /// Local offset `[x, y]`
    pub offset: [f32; 2],
}

impl Default for CircleColliderData {
    fn default() -> Self {
        Self {
            is_trigger: false,
            layer: 0,
            radius: DEFAULT_CIRCLE_RADIUS,
            offset: [0.0, 0.0],
        }
    }
}

impl From<CircleColliderData> for Collider {
    fn from(data: CircleColliderData) -> Self {
        let mut collider = Collider::circle(data.radius)
            .with_offset(Vec2::new(data.offset[0], data.offset[1]))
            .with_layer(data.layer);
        collider.is_trigger = data.is_trigger;
        collider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn at(x: f32, y: f32) -> WorldTransform {
        WorldTransform {
            position: Vec2::new(x, y),
            ..WorldTransform::identity()
        }
    }

    #[test]
    fn test_world_box_is_scaled_and_offset() {
        let collider = Collider::rect(10.0, 4.0).with_offset(Vec2::new(1.0, 0.0));
        let world = WorldTransform {
            position: Vec2::new(5.0, 5.0),
            rotation: 45.0,
            scale: Vec2::new(2.0, 1.0),
        };

        let rect = *collider.world_shape(&world).as_rect().unwrap();
        assert_relative_eq!(rect.min, Vec2::new(-4.0, 3.0));
        assert_relative_eq!(rect.max, Vec2::new(16.0, 7.0));
    }

    #[test]
    fn test_world_circle_uses_mean_scale() {
        let collider = Collider::circle(10.0);
        let world = WorldTransform {
            scale: Vec2::new(1.0, 3.0),
            ..WorldTransform::identity()
        };

        let circle = *collider.world_shape(&world).as_circle().unwrap();
        assert_relative_eq!(circle.radius, 20.0);
    }

    #[test]
    fn test_circle_pairs() {
        let a = Collider::circle(5.0);
        let b = Collider::circle(5.0);

        assert!(a.is_colliding_with(&at(0.0, 0.0), &b, &at(9.0, 0.0)));
        assert!(!a.is_colliding_with(&at(0.0, 0.0), &b, &at(11.0, 0.0)));
    }

    #[test]
    fn test_box_circle_pairs_both_orders() {
        let rect = Collider::rect(10.0, 10.0);
        let circle = Collider::circle(1.0);
        let origin = at(0.0, 0.0);

        for (position, expected) in [(at(20.0, 0.0), false), (at(4.0, 0.0), true)] {
            assert_eq!(rect.is_colliding_with(&origin, &circle, &position), expected);
            assert_eq!(circle.is_colliding_with(&position, &rect, &origin), expected);
        }
    }

    #[test]
    fn test_callbacks_receive_contact() {
        let mut collider = Collider::circle(1.0);
        let entered = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&entered);
        collider.add_collision_enter_callback(move |contact| log.borrow_mut().push(contact.other));

        let this = ColliderHandle::new(EntityId::new(), ComponentId::new(0));
        let other = ColliderHandle::new(EntityId::new(), ComponentId::new(1));
        collider.on_collision_enter(&CollisionContact {
            this,
            other,
            other_shape: WorldShape::Circle(Circle::new(Vec2::zeros(), 1.0)),
            other_is_trigger: false,
            other_layer: 0,
        });
        collider.on_collision_exit(&CollisionContact {
            this,
            other,
            other_shape: WorldShape::Circle(Circle::new(Vec2::zeros(), 1.0)),
            other_is_trigger: false,
            other_layer: 0,
        });

        assert_eq!(*entered.borrow(), vec![other]);
    }

    #[test]
    fn test_type_names_follow_shape() {
        assert_eq!(Collider::rect(1.0, 1.0).type_name(), "BoxCollider");
        assert_eq!(Collider::circle(1.0).type_name(), "CircleCollider");
    }

    #[test]
    fn test_saved_form_defaults() {
        let data: BoxColliderData = serde_json::from_str("{\"width\": 20.0}").unwrap();
        assert_eq!(data.height, DEFAULT_BOX_SIZE);

        let collider = Collider::from(data);
        assert_eq!(collider.box_data().map(|d| d.width), Some(20.0));
        assert!(collider.circle_data().is_none());

        let circle: CircleColliderData = serde_json::from_str("{}").unwrap();
        assert_eq!(circle.radius, DEFAULT_CIRCLE_RADIUS);
    }
}
