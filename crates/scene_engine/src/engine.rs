//! Core engine implementation
//!
//! The engine owns the active scene and the collaborators the scene core
//! consumes: a frame clock, the collision driver, and the event queue. One
//! call to [`Engine::frame`] runs a full frame:
//!
//! 1. start pass (components added since the last frame start here)
//! 2. `fixed_steps` × (fixed update, collision step)
//! 3. variable update
//! 4. event dispatch

use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use crate::config::EngineConfig;
use crate::ecs::{Scene, SceneError};
use crate::events::EventSystem;
use crate::foundation::time::{FrameClock, FrameStep};
use crate::physics::CollisionSystem;

/// Summary of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// Scaled delta handed to `update`
    pub delta_time: f32,
    /// Fixed steps run this frame
    pub fixed_steps: u32,
    /// Collision pairs that started overlapping
    pub collisions_entered: usize,
    /// Collision pairs that stopped overlapping
    pub collisions_exited: usize,
    /// Events delivered to handlers
    pub events_dispatched: usize,
}

/// Main engine struct
///
/// The engine coordinates the scene and its collaborators and runs frames.
pub struct Engine {
    config: EngineConfig,
    scene: Scene,
    clock: FrameClock,
    collisions: CollisionSystem,
    events: EventSystem,
}

impl Engine {
    /// Create a new engine with an empty scene
    pub fn new(config: EngineConfig) -> Self {
        let mut scene = Scene::new("Main");
        scene.set_screen_size(config.screen_size);
        scene.set_background_color(config.background_color);
        scene.set_editor_mode(config.editor_mode);
        Self::with_scene(config, scene)
    }

    /// Create an engine around an existing scene
    pub fn with_scene(config: EngineConfig, scene: Scene) -> Self {
        info!("Initializing engine '{}'", config.title);
        Self {
            clock: FrameClock::new(&config.time),
            collisions: CollisionSystem::new(),
            events: EventSystem::new(),
            scene,
            config,
        }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active scene
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Active scene, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Swap in a new scene, returning the old one
    ///
    /// Tracked collision pairs are dropped without exit callbacks, and events
    /// still queued for the old scene are discarded.
    pub fn replace_scene(&mut self, scene: Scene) -> Scene {
        self.collisions.reset();
        self.events.clear();
        std::mem::replace(&mut self.scene, scene)
    }

    /// Frame clock
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Frame clock, mutably (time scale, fixed step)
    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Collision driver, mutably (layer filter)
    pub fn collisions_mut(&mut self) -> &mut CollisionSystem {
        &mut self.collisions
    }

    /// Event queue, mutably (handler registration)
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Run one frame with an explicit raw frame duration in seconds
    pub fn frame(&mut self, raw_delta: f32) -> FrameReport {
        let step = self.clock.advance(raw_delta);
        self.run_step(step)
    }

    /// Run one frame timed by the wall clock
    pub fn tick(&mut self) -> FrameReport {
        let step = self.clock.tick();
        self.run_step(step)
    }

    fn run_step(&mut self, step: FrameStep) -> FrameReport {
        let mut report = FrameReport {
            delta_time: step.delta_time,
            fixed_steps: step.fixed_steps,
            ..FrameReport::default()
        };

        if !self.scene.is_editor_mode() {
            self.scene.start(&mut self.events);
            for _ in 0..step.fixed_steps {
                self.scene.fixed_update_with(&self.clock, &mut self.events);
                let collisions = self.collisions.step(&mut self.scene, &mut self.events);
                report.collisions_entered += collisions.entered.len();
                report.collisions_exited += collisions.exited.len();
            }
            self.scene.update_with(&self.clock, &mut self.events);
        }

        report.events_dispatched = self.events.dispatch();
        report
    }

    /// Save the active scene as `<scenes_path>/<name>.json`
    pub fn save_scene(&self, name: &str) -> Result<PathBuf, SceneError> {
        let path = self.scene_path(name);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.scene.save(&path)?;
        Ok(path)
    }

    /// Replace the active scene with `<scenes_path>/<name>.json`
    ///
    /// Components registered on the current scene's registry stay available.
    /// On failure the active scene is left untouched.
    pub fn load_scene(&mut self, name: &str) -> Result<(), SceneError> {
        let path = self.scene_path(name);
        let registry = self.scene.registry().clone();
        let mut scene = Scene::load_with_registry(&path, registry)?;
        scene.set_editor_mode(self.scene.is_editor_mode());
        self.replace_scene(scene);
        debug!("Active scene is now '{}'", self.scene.name());
        Ok(())
    }

    fn scene_path(&self, name: &str) -> PathBuf {
        PathBuf::from(&self.config.scenes_path).join(format!("{name}.json"))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
