//! Event system for notifying listeners outside the scene core
//!
//! Key principles:
//! - Components and the collision driver emit through an [`EventSink`]
//! - Handler returns bool (true = consumed, stops forwarding)
//! - Registration system (only notify interested handlers)
//! - Queued delivery: events gathered during a frame are dispatched at its end

use std::collections::HashMap;

use crate::ecs::components::ColliderHandle;
use crate::ecs::EntityId;

/// Event type identification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Two colliders started overlapping
    CollisionEnter,
    /// Two colliders stopped overlapping
    CollisionExit,
    /// An entity was destroyed
    EntityDestroyed,
    /// Game-defined event raised by a component
    Custom,
}

/// Structured event raised by the scene core
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// First step in which `a` and `b` overlap
    CollisionEnter {
        /// Collider with the lower handle
        a: ColliderHandle,
        /// Collider with the higher handle
        b: ColliderHandle,
    },
    /// First step in which `a` and `b` no longer overlap
    CollisionExit {
        /// Collider with the lower handle
        a: ColliderHandle,
        /// Collider with the higher handle
        b: ColliderHandle,
    },
    /// Entity removed from the scene by `destroy_entity`
    EntityDestroyed(EntityId),
    /// Named event emitted by a component
    Custom {
        /// Event name chosen by the emitter
        name: String,
        /// Entity whose component emitted the event
        source: EntityId,
    },
}

impl SceneEvent {
    /// Type tag used for handler registration
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CollisionEnter { .. } => EventType::CollisionEnter,
            Self::CollisionExit { .. } => EventType::CollisionExit,
            Self::EntityDestroyed(_) => EventType::EntityDestroyed,
            Self::Custom { .. } => EventType::Custom,
        }
    }
}

/// Destination for events raised during a frame
pub trait EventSink {
    /// Accept one event
    fn emit(&mut self, event: SceneEvent);
}

/// Discards every event
impl EventSink for () {
    fn emit(&mut self, _event: SceneEvent) {}
}

impl EventSink for Vec<SceneEvent> {
    fn emit(&mut self, event: SceneEvent) {
        self.push(event);
    }
}

/// Event handler trait
/// Returns true if event was consumed (stops forwarding)
/// Returns false to allow forwarding to other handlers
pub trait EventHandler {
    /// Handle an event, return true if consumed
    fn on_event(&mut self, event: &SceneEvent) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&SceneEvent) -> bool,
{
    fn on_event(&mut self, event: &SceneEvent) -> bool {
        self(event)
    }
}

/// Handle returned by handler registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

type HandlerList = Vec<(HandlerId, Box<dyn EventHandler>)>;

/// Event system with registration and queuing
/// Follows chain of responsibility pattern
///
/// Custom events reach handlers registered for their name first, then the
/// handlers registered for [`EventType::Custom`].
#[derive(Default)]
pub struct EventSystem {
    queue: Vec<SceneEvent>,
    handlers: HashMap<EventType, HandlerList>,
    custom_handlers: HashMap<String, HandlerList>,
    next_handler: u64,
}

impl EventSystem {
    /// Create a new empty event system
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific event type
    /// Only handlers registered for this type will be notified
    pub fn register_handler(&mut self, event_type: EventType, handler: Box<dyn EventHandler>) -> HandlerId {
        let id = self.next_id();
        self.handlers.entry(event_type).or_default().push((id, handler));
        id
    }

    /// Register a handler for custom events with the given name only
    pub fn register_custom_handler(&mut self, name: impl Into<String>, handler: Box<dyn EventHandler>) -> HandlerId {
        let id = self.next_id();
        self.custom_handlers.entry(name.into()).or_default().push((id, handler));
        id
    }

    /// Unregister one handler
    ///
    /// Returns `false` if the id is unknown or was already removed.
    pub fn remove_handler(&mut self, id: HandlerId) -> bool {
        self.handlers
            .values_mut()
            .chain(self.custom_handlers.values_mut())
            .any(|list| {
                let before = list.len();
                list.retain(|(handler_id, _)| *handler_id != id);
                list.len() != before
            })
    }

    /// Unregister every handler of one event type
    ///
    /// For [`EventType::Custom`] this includes the handlers registered by name.
    pub fn clear_handlers(&mut self, event_type: EventType) {
        self.handlers.remove(&event_type);
        if event_type == EventType::Custom {
            self.custom_handlers.clear();
        }
    }

    /// Unregister every handler for one custom event name
    pub fn clear_custom_handlers(&mut self, name: &str) {
        self.custom_handlers.remove(name);
    }

    /// Unregister every handler
    pub fn clear_all_handlers(&mut self) {
        self.handlers.clear();
        self.custom_handlers.clear();
    }

    /// Number of handlers that would see an event of this type
    pub fn handler_count(&self, event_type: EventType) -> usize {
        let typed = self.handlers.get(&event_type).map_or(0, Vec::len);
        if event_type == EventType::Custom {
            typed + self.custom_handlers.values().map(Vec::len).sum::<usize>()
        } else {
            typed
        }
    }

    /// Number of events waiting for dispatch
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver every queued event to its handlers, in emission order
    ///
    /// Returns the number of events delivered.
    pub fn dispatch(&mut self) -> usize {
        let events = std::mem::take(&mut self.queue);
        for event in &events {
            if let SceneEvent::Custom { name, .. } = event {
                if let Some(handlers) = self.custom_handlers.get_mut(name) {
                    if notify(handlers, event) {
                        continue;
                    }
                }
            }
            if let Some(handlers) = self.handlers.get_mut(&event.event_type()) {
                notify(handlers, event);
            }
        }
        events.len()
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn next_id(&mut self) -> HandlerId {
        let id = HandlerId(self.next_handler);
        self.next_handler += 1;
        id
    }
}

/// Run handlers in registration order; true once one consumes the event
fn notify(handlers: &mut HandlerList, event: &SceneEvent) -> bool {
    handlers.iter_mut().any(|(_, handler)| handler.on_event(event))
}

impl EventSink for EventSystem {
    fn emit(&mut self, event: SceneEvent) {
        self.queue.push(event);
    }
}
