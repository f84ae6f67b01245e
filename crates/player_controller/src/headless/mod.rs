//! Headless physics stand-in (без rapier pipeline)
//!
//! Для headless демо и интеграционных тестов: те же rapier компоненты
//! (`Velocity`, `ExternalImpulse`), но интеграция простая:
//! - ExternalImpulse / mass → velocity, затем сброс (как делает rapier)
//! - Гравитация пока тело выше пола
//! - velocity → Transform, пол плоский на `floor_height`
//!
//! Порядок: после `ControllerSet::Physics` в FixedUpdate.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, Velocity};

use crate::config::ControllerConfig;
use crate::controller::{ControllerSet, PlayerController};

#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HeadlessBody {
    /// Масса (kg), делитель для импульсов
    pub mass: f32,
    /// Ускорение свободного падения (m/s², отрицательное = вниз)
    pub gravity: f32,
    /// Высота пола для нижней точки тела
    pub floor_height: f32,
}

impl Default for HeadlessBody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            gravity: -9.81,
            floor_height: 0.0,
        }
    }
}

impl HeadlessBody {
    pub fn is_grounded(&self, transform: &Transform) -> bool {
        transform.translation.y <= self.floor_height
    }
}

/// Система: импульсы → velocity
pub fn apply_impulses(mut bodies: Query<(&HeadlessBody, &mut Velocity, &mut ExternalImpulse)>) {
    for (body, mut velocity, mut impulse) in bodies.iter_mut() {
        if impulse.impulse == Vec3::ZERO {
            continue;
        }

        // mass ≤ 0 трактуем как 1 — тело без массы не должно улетать в inf
        let mass = if body.mass > 0.0 { body.mass } else { 1.0 };
        velocity.linvel += impulse.impulse / mass;
        impulse.impulse = Vec3::ZERO;
    }
}

/// Система: гравитация для тел в воздухе
pub fn apply_gravity(mut bodies: Query<(&HeadlessBody, &Transform, &mut Velocity)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (body, transform, mut velocity) in bodies.iter_mut() {
        if !body.is_grounded(transform) || velocity.linvel.y > 0.0 {
            velocity.linvel.y += body.gravity * delta;
        }
    }
}

/// Система: velocity → Transform, посадка на пол
pub fn integrate_velocity(mut bodies: Query<(&HeadlessBody, &mut Velocity, &mut Transform)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (body, mut velocity, mut transform) in bodies.iter_mut() {
        transform.translation += velocity.linvel * delta;

        if transform.translation.y < body.floor_height {
            transform.translation.y = body.floor_height;
            if velocity.linvel.y < 0.0 {
                velocity.linvel.y = 0.0;
            }
        }
    }
}

/// Plugin: headless интеграция тел после velocity change контроллера
pub struct HeadlessPhysicsPlugin;

impl Plugin for HeadlessPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (apply_impulses, apply_gravity, integrate_velocity)
                .chain()
                .after(ControllerSet::Physics),
        );
    }
}

/// Spawn helper: controller entity с headless телом (без rapier collider)
pub fn spawn_headless_player(
    commands: &mut Commands,
    position: Vec3,
    config: ControllerConfig,
    camera: Option<Entity>,
) -> Entity {
    commands
        .spawn((
            Transform::from_translation(position),
            PlayerController,
            config,
            crate::controller::CameraLink(camera),
            HeadlessBody {
                floor_height: position.y.min(0.0),
                ..default()
            },
            Velocity::zero(),
            ExternalImpulse::default(),
        ))
        .id()
}
