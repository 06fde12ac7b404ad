//! Collision demo application
//!
//! Runs a headless scene: a ball that moves itself across a wall, a shield
//! that rides along as a child of the ball, and a timed beacon that destroys
//! itself.
//! Overlap changes are logged from collider callbacks and event handlers,
//! and the final scene is written out as JSON.

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

/// Demo errors
#[derive(Debug, thiserror::Error)]
enum DemoError {
    /// Scene failure
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Missing entity
    #[error("entity {0} disappeared")]
    MissingEntity(EntityId),
}

/// Destroys its entity once `remaining` seconds of fixed time have passed
struct Lifetime {
    remaining: f32,
}

impl Component for Lifetime {
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {
        log::info!("Beacon {} will live for {:.2}s", ctx.entity(), self.remaining);
    }

    fn fixed_update(&mut self, ctx: &mut ComponentContext<'_>, fixed_delta_time: f32) {
        self.remaining -= fixed_delta_time;
        if self.remaining <= 0.0 {
            ctx.emit_custom(BEACON_EXPIRED);
            let entity = ctx.entity();
            ctx.commands().destroy(entity);
        }
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

/// Moves its entity's transform at a constant velocity every fixed step
struct Velocity {
    value: Vec2,
}

impl Component for Velocity {
    fn fixed_update(&mut self, ctx: &mut ComponentContext<'_>, fixed_delta_time: f32) {
        let step = self.value * fixed_delta_time;
        if let Some(transform) = ctx.transform_mut() {
            transform.translate(step.x, step.y);
        }
    }

    fn is_persistent(&self) -> bool {
        false
    }
}

const FRAMES: u32 = 120;
const FRAME_TIME: f32 = 1.0 / 60.0;
const BALL_SPEED: f32 = 150.0;
const BEACON_EXPIRED: &str = "beacon expired";

fn build_scene(engine: &mut Engine) -> Result<EntityId, DemoError> {
    let scene = engine.scene_mut();

    let wall = scene.create_entity("Wall");
    let wall_entity = scene.get_entity_mut(wall).ok_or(DemoError::MissingEntity(wall))?;
    wall_entity.add_component(Transform::from_xy(200.0, 0.0));
    let mut wall_collider = Collider::rect(20.0, 200.0);
    wall_collider.add_collision_enter_callback(|contact| {
        log::info!("Wall hit by {}", contact.other.entity);
    });
    wall_collider.add_collision_exit_callback(|contact| {
        log::info!("Wall cleared by {}", contact.other.entity);
    });
    wall_entity.add_component(wall_collider);

    let ball = scene.create_entity("Ball");
    let ball_entity = scene.get_entity_mut(ball).ok_or(DemoError::MissingEntity(ball))?;
    ball_entity.add_component(Transform::from_xy(0.0, 0.0));
    ball_entity.add_component(Collider::circle(10.0).with_layer(1));
    ball_entity.add_component(Velocity {
        value: Vec2::new(BALL_SPEED, 0.0),
    });

    let shield = scene.create_child(ball, "Shield")?;
    let shield_entity = scene.get_entity_mut(shield).ok_or(DemoError::MissingEntity(shield))?;
    shield_entity.add_component(Transform::from_xy(25.0, 0.0));
    shield_entity.add_component(Collider::circle(5.0).as_trigger().with_layer(2));

    let beacon = scene.create_entity("Beacon");
    let beacon_entity = scene.get_entity_mut(beacon).ok_or(DemoError::MissingEntity(beacon))?;
    beacon_entity.add_component(Transform::from_xy(0.0, 150.0));
    beacon_entity.add_component(Lifetime { remaining: 0.5 });

    Ok(ball)
}

fn register_handlers(engine: &mut Engine) {
    let events = engine.events_mut();
    events.register_handler(
        EventType::CollisionEnter,
        Box::new(|event: &SceneEvent| {
            if let SceneEvent::CollisionEnter { a, b } = event {
                log::debug!("enter {} <-> {}", a.entity, b.entity);
            }
            false
        }),
    );
    events.register_handler(
        EventType::EntityDestroyed,
        Box::new(|event: &SceneEvent| {
            if let SceneEvent::EntityDestroyed(id) = event {
                log::info!("Destroyed {}", id);
            }
            false
        }),
    );
    events.register_custom_handler(
        BEACON_EXPIRED,
        Box::new(|event: &SceneEvent| {
            if let SceneEvent::Custom { source, .. } = event {
                log::info!("Beacon {} expired", source);
            }
            true
        }),
    );
}

fn main() -> Result<(), DemoError> {
    logging::init_with_level("info");

    let mut config = EngineConfig::default();
    config.title = "Collision Demo".to_string();
    config.scenes_path = std::env::temp_dir()
        .join("scene_engine_demo")
        .to_string_lossy()
        .into_owned();

    let mut engine = Engine::new(config);
    let ball = build_scene(&mut engine)?;
    register_handlers(&mut engine);

    let mut entered = 0;
    let mut exited = 0;
    for _ in 0..FRAMES {
        let report = engine.frame(FRAME_TIME);
        entered += report.collisions_entered;
        exited += report.collisions_exited;
    }

    log::info!(
        "Ran {} frames: {} collisions entered, {} exited, ball at {:?}",
        engine.clock().frame_count(),
        entered,
        exited,
        engine.scene().world_position(ball)
    );

    let path = engine.save_scene("collision_demo")?;
    log::info!("Scene written to {}", path.display());
    Ok(())
}
