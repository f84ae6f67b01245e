//! Headless прогон контроллера
//!
//! Owner игрок + реплика, скриптованный input:
//! ходьба → бег до истощения → прыжок → стоим.
//!
//! Usage: player_controller [config/player.ron]
//!
//! `PLAYER_LOG_LEVEL=info|warning|error` отключает debug логи.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::Velocity;
use player_controller::locomotion::horizontal_speed;
use player_controller::logger::{set_log_level, LogLevel};
use player_controller::*;

const FRAME_HZ: u32 = 60;
const TOTAL_FRAMES: u32 = FRAME_HZ * 10;

/// Скриптованный input по номеру frame
fn scripted_input(frame: u32) -> InputSnapshot {
    let seconds = frame as f32 / FRAME_HZ as f32;

    match seconds {
        s if s < 1.0 => InputSnapshot {
            movement: Vec2::Y,
            mouse_delta: Vec2::new(0.5, 0.0),
            ..default()
        },
        s if s < 5.5 => InputSnapshot {
            movement: Vec2::Y,
            run_held: true,
            ..default()
        },
        _ => InputSnapshot {
            jump_pressed: frame == (FRAME_HZ as f32 * 5.5) as u32,
            ..default()
        },
    }
}

fn main() -> Result<(), ConfigError> {
    if let Some(level) = std::env::var("PLAYER_LOG_LEVEL")
        .ok()
        .as_deref()
        .and_then(LogLevel::parse)
    {
        set_log_level(level);
    }

    let config = match std::env::args().nth(1) {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };

    let mut app = create_headless_app();
    app.add_plugins((PlayerControllerPlugin, HeadlessPhysicsPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / FRAME_HZ as f64,
        )));

    let camera = app
        .world_mut()
        .spawn((MainCamera, PlayerCamera::default(), Transform::default()))
        .id();

    let (owner, replica) = {
        let mut commands = app.world_mut().commands();
        let owner = spawn_headless_player(&mut commands, Vec3::ZERO, config, None);
        let replica = spawn_headless_player(&mut commands, Vec3::new(3.0, 0.0, 0.0), config, None);
        (owner, replica)
    };
    app.world_mut().flush();

    app.world_mut().send_event(NetworkSpawned {
        entity: owner,
        is_local_owner: true,
    });
    app.world_mut().send_event(NetworkSpawned {
        entity: replica,
        is_local_owner: false,
    });

    log_info(&format!(
        "Starting headless controller run: owner {:?}, replica {:?}, camera {:?}",
        owner, replica, camera
    ));

    for frame in 0..TOTAL_FRAMES {
        if let Some(mut input) = app.world_mut().get_mut::<InputSnapshot>(owner) {
            *input = scripted_input(frame);
        }

        app.update();

        if frame % (FRAME_HZ / 2) == 0 {
            let world = app.world();
            let (Some(transform), Some(state), Some(velocity)) = (
                world.get::<Transform>(owner),
                world.get::<ControllerState>(owner),
                world.get::<Velocity>(owner),
            ) else {
                continue;
            };

            log_info(&format!(
                "Frame {}: pos {:.2?} speed {:.2} vy {:.2} state {:?} stamina {:.0}% can_run {}",
                frame,
                transform.translation,
                horizontal_speed(velocity),
                velocity.linvel.y,
                state.run_state,
                state.stamina.remaining_fraction(&config) * 100.0,
                state.stamina.can_run
            ));
        }
    }

    log_info("Headless controller run complete");
    Ok(())
}
