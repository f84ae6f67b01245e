//! Locomotion: desired velocity → clamped velocity change, jump impulse
//!
//! Архитектура:
//! - Variable-rate frame пишет `DesiredSpeed` (одна запись на frame)
//! - Fixed-rate step читает его и добавляет velocity change к rapier `Velocity`
//! - Jump идёт отдельным путём: `JumpIntent` event → `ExternalImpulse`
//!
//! Velocity change не зависит от массы (пишем прямо в linvel),
//! jump — настоящий импульс (зависит от массы тела).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, Velocity};

use crate::config::ControllerConfig;

/// Желаемое движение, общее для frame и physics step
///
/// - `axis`: нормализованный input (x = strafe, y = forward)
/// - `speed`: выбранная скорость (walk или run) на этот frame
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DesiredSpeed {
    pub axis: Vec2,
    pub speed: f32,
}

/// Event: намерение прыгнуть (Space key-down)
///
/// Ground check и cooldown нет — прыжок работает и в воздухе.
#[derive(Event, Debug, Clone, Copy)]
pub struct JumpIntent {
    pub entity: Entity,
}

/// Желаемая world velocity: input поворачивается в facing тела
pub fn desired_velocity(axis: Vec2, speed: f32, body_rotation: Quat) -> Vec3 {
    body_rotation * Vec3::new(axis.x, 0.0, axis.y) * speed
}

/// Velocity change для одного physics step
///
/// delta = desired − current (только горизонталь), каждая ось
/// независимо ограничена ±max_change, Y всегда 0.
pub fn velocity_change(desired: Vec3, current: Vec3, max_change: f32) -> Vec3 {
    let limit = max_change.abs();
    let delta = desired - current;

    Vec3::new(
        delta.x.clamp(-limit, limit),
        0.0,
        delta.z.clamp(-limit, limit),
    )
}

/// Система: JumpIntent → ExternalImpulse вверх
///
/// Импульс накапливается (два intent за frame = двойной импульс),
/// physics backend сбрасывает его после step.
pub fn apply_jump_impulse(
    mut jump_events: EventReader<JumpIntent>,
    mut bodies: Query<(&ControllerConfig, Option<&mut ExternalImpulse>)>,
) {
    for intent in jump_events.read() {
        let Ok((config, impulse)) = bodies.get_mut(intent.entity) else {
            crate::logger::log_warning(&format!(
                "JumpIntent for {:?} without ControllerConfig, ignored",
                intent.entity
            ));
            continue;
        };

        let Some(mut impulse) = impulse else {
            crate::logger::log_warning(&format!(
                "JumpIntent for {:?}: no ExternalImpulse on body, jump skipped",
                intent.entity
            ));
            continue;
        };

        impulse.impulse += Vec3::Y * config.jump_impulse;
    }
}

/// Горизонтальная компонента rapier velocity (для логов/HUD)
pub fn horizontal_speed(velocity: &Velocity) -> f32 {
    Vec2::new(velocity.linvel.x, velocity.linvel.z).length()
}
