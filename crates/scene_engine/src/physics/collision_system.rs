//! Collision driver
//!
//! Gathers every enabled collider on an active entity, tests all pairs, and
//! diffs the overlapping set against the previous step. New pairs invoke the
//! enter callbacks of both colliders, vanished pairs the exit callbacks, and
//! each collider's `current_collisions` record is refreshed.
//!
//! There is no broad phase: the pair test is O(n²) over the gathered colliders.

use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::ecs::components::{Collider, ColliderHandle, CollisionContact};
use crate::ecs::Scene;
use crate::events::{EventSink, SceneEvent};
use crate::physics::collision::WorldShape;

/// Two overlapping colliders (always stores the smaller handle first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollisionPair {
    /// Smaller handle
    pub a: ColliderHandle,
    /// Larger handle
    pub b: ColliderHandle,
}

impl CollisionPair {
    /// Create a new collision pair in canonical order
    pub fn new(first: ColliderHandle, second: ColliderHandle) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// The member of the pair that is not `handle`
    pub fn other(&self, handle: ColliderHandle) -> ColliderHandle {
        if self.a == handle {
            self.b
        } else {
            self.a
        }
    }
}

/// Pair changes produced by one collision step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Pairs that started overlapping this step, sorted
    pub entered: Vec<CollisionPair>,
    /// Pairs that stopped overlapping this step, sorted
    pub exited: Vec<CollisionPair>,
}

impl CollisionReport {
    /// Whether nothing changed
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

/// Decides whether two layers may collide
pub type LayerFilter = Box<dyn Fn(i32, i32) -> bool>;

#[derive(Debug, Clone, Copy)]
struct ColliderSample {
    shape: WorldShape,
    is_trigger: bool,
    layer: i32,
}

/// Stateful overlap tracker driving collider enter/exit callbacks
#[derive(Default)]
pub struct CollisionSystem {
    current_pairs: BTreeSet<CollisionPair>,
    previous_pairs: BTreeSet<CollisionPair>,
    samples: HashMap<ColliderHandle, ColliderSample>,
    layer_filter: Option<LayerFilter>,
}

impl CollisionSystem {
    /// Create a tracker with no layer filtering
    pub fn new() -> Self {
        Self::default()
    }

    /// Only test pairs for which `filter(layer_a, layer_b)` returns true
    pub fn with_layer_filter(mut self, filter: impl Fn(i32, i32) -> bool + 'static) -> Self {
        self.layer_filter = Some(Box::new(filter));
        self
    }

    /// Replace or remove the layer filter
    pub fn set_layer_filter(&mut self, filter: Option<LayerFilter>) {
        self.layer_filter = filter;
    }

    /// Pairs overlapping as of the last step
    pub fn current_pairs(&self) -> impl Iterator<Item = &CollisionPair> {
        self.current_pairs.iter()
    }

    /// Whether two colliders overlapped in the last step
    pub fn is_overlapping(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.current_pairs.contains(&CollisionPair::new(a, b))
    }

    /// Forget all tracked overlaps without firing exit callbacks
    pub fn reset(&mut self) {
        self.current_pairs.clear();
        self.previous_pairs.clear();
        self.samples.clear();
    }

    /// Run one detection step against the scene
    pub fn step(&mut self, scene: &mut Scene, events: &mut dyn EventSink) -> CollisionReport {
        let previous_samples = std::mem::replace(&mut self.samples, Self::gather(scene));
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
        self.current_pairs.clear();

        let handles: Vec<ColliderHandle> = {
            let mut handles: Vec<ColliderHandle> = self.samples.keys().copied().collect();
            handles.sort_unstable();
            handles
        };
        for (i, &first) in handles.iter().enumerate() {
            for &second in &handles[i + 1..] {
                if first.entity == second.entity {
                    continue;
                }
                let (Some(a), Some(b)) = (self.samples.get(&first), self.samples.get(&second)) else {
                    continue;
                };
                if let Some(filter) = &self.layer_filter {
                    if !filter(a.layer, b.layer) {
                        continue;
                    }
                }
                if a.shape.intersects(&b.shape) {
                    self.current_pairs.insert(CollisionPair::new(first, second));
                }
            }
        }

        let report = CollisionReport {
            entered: self.current_pairs.difference(&self.previous_pairs).copied().collect(),
            exited: self.previous_pairs.difference(&self.current_pairs).copied().collect(),
        };

        // colliders that dropped out since the last step lose their records too
        self.refresh_overlap_records(scene, handles.iter().chain(previous_samples.keys()));

        for pair in &report.entered {
            debug!("Collision enter: {:?} <-> {:?}", pair.a, pair.b);
            self.notify(scene, pair, &previous_samples, true);
            events.emit(SceneEvent::CollisionEnter { a: pair.a, b: pair.b });
        }
        for pair in &report.exited {
            debug!("Collision exit: {:?} <-> {:?}", pair.a, pair.b);
            self.notify(scene, pair, &previous_samples, false);
            events.emit(SceneEvent::CollisionExit { a: pair.a, b: pair.b });
        }

        report
    }

    fn gather(scene: &Scene) -> HashMap<ColliderHandle, ColliderSample> {
        let mut samples = HashMap::new();
        for id in scene.entity_ids() {
            if !scene.is_active_in_hierarchy(id) {
                continue;
            }
            let Some(entity) = scene.get_entity(id) else {
                continue;
            };
            for slot in entity.slots() {
                if !slot.is_enabled() {
                    continue;
                }
                let Some(collider) = slot.component().as_collider() else {
                    continue;
                };
                let handle = ColliderHandle::new(id, slot.id());
                if let Some(shape) = scene.collider_world_shape(handle) {
                    samples.insert(
                        handle,
                        ColliderSample {
                            shape,
                            is_trigger: collider.is_trigger,
                            layer: collider.layer,
                        },
                    );
                }
            }
        }
        samples
    }

    fn refresh_overlap_records<'a>(&self, scene: &mut Scene, handles: impl Iterator<Item = &'a ColliderHandle>) {
        let mut overlaps: HashMap<ColliderHandle, Vec<ColliderHandle>> = HashMap::new();
        for pair in &self.current_pairs {
            overlaps.entry(pair.a).or_default().push(pair.b);
            overlaps.entry(pair.b).or_default().push(pair.a);
        }
        for &handle in handles {
            if let Some(collider) = collider_mut(scene, handle) {
                let mut current = overlaps.get(&handle).cloned().unwrap_or_default();
                current.sort_unstable();
                collider.set_current_collisions(current);
            }
        }
    }

    fn notify(
        &self,
        scene: &mut Scene,
        pair: &CollisionPair,
        previous_samples: &HashMap<ColliderHandle, ColliderSample>,
        entered: bool,
    ) {
        for (this, other) in [(pair.a, pair.b), (pair.b, pair.a)] {
            // a collider that vanished since the last step keeps its last known shape
            let Some(sample) = self.samples.get(&other).or_else(|| previous_samples.get(&other)) else {
                continue;
            };
            let contact = CollisionContact {
                this,
                other,
                other_shape: sample.shape,
                other_is_trigger: sample.is_trigger,
                other_layer: sample.layer,
            };
            if let Some(collider) = collider_mut(scene, this) {
                if entered {
                    collider.on_collision_enter(&contact);
                } else {
                    collider.on_collision_exit(&contact);
                }
            }
        }
    }
}

fn collider_mut(scene: &mut Scene, handle: ColliderHandle) -> Option<&mut Collider> {
    scene
        .get_entity_mut(handle.entity)?
        .component_mut(handle.component)?
        .as_collider_mut()
}

impl std::fmt::Debug for CollisionSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionSystem")
            .field("current_pairs", &self.current_pairs)
            .field("tracked_colliders", &self.samples.len())
            .field("layer_filter", &self.layer_filter.is_some())
            .finish()
    }
}
