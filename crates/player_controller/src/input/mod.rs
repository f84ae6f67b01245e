//! Player input snapshot
//!
//! # Архитектура
//!
//! ```text
//! Platform input (ButtonInput<KeyCode>, AccumulatedMouseMotion)
//!     ↓  sample_platform_input (только если host зарегистрировал InputPlugin)
//! InputSnapshot (component на player entity)
//!     ↓  player_frame_update
//! LookState / SprintStamina / AnimationFlags / DesiredSpeed
//! ```
//!
//! В headless режиме и тестах snapshot пишет frame driver напрямую —
//! глобального polling'а input нет.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

use crate::controller::PlayerController;
use crate::ownership::OwnershipContext;

/// Input одного frame
///
/// - `movement`: x = strafe (+ вправо), y = forward (+ вперёд)
/// - `mouse_delta`: градусы до sensitivity, y > 0 = мышь вверх
/// - `jump_pressed` / `crouch_pressed`: key-down edge (только frame нажатия)
/// - `run_held`: run key удерживается
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct InputSnapshot {
    pub movement: Vec2,
    pub mouse_delta: Vec2,
    pub jump_pressed: bool,
    pub crouch_pressed: bool,
    pub run_held: bool,
}

impl InputSnapshot {
    /// Движение нормализованное до единичной длины (или ноль)
    ///
    /// W+D по диагонали не быстрее, чем W.
    pub fn normalized_movement(&self) -> Vec2 {
        self.movement.normalize_or_zero()
    }

    /// Сбросить key-down edges после обработки frame
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.crouch_pressed = false;
    }
}

/// Раскладка клавиш и масштаб мыши
#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub run: KeyCode,
    pub jump: KeyCode,
    pub crouch: KeyCode,
    /// Пиксели мыши → градусы
    pub mouse_degrees_per_pixel: f32,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            back: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            run: KeyCode::ShiftLeft,
            jump: KeyCode::Space,
            crouch: KeyCode::ControlLeft,
            mouse_degrees_per_pixel: 0.1,
        }
    }
}

fn axis(keys: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    let mut value = 0.0;
    if keys.pressed(positive) {
        value += 1.0;
    }
    if keys.pressed(negative) {
        value -= 1.0;
    }
    value
}

/// Собрать InputSnapshot из platform input
pub fn read_platform_input(
    keys: &ButtonInput<KeyCode>,
    mouse_motion: Vec2,
    bindings: &InputBindings,
) -> InputSnapshot {
    let movement = Vec2::new(
        axis(keys, bindings.right, bindings.left),
        axis(keys, bindings.forward, bindings.back),
    );

    // Экранный Y растёт вниз, у нас "мышь вверх" = положительный delta.y
    let mouse_delta = Vec2::new(mouse_motion.x, -mouse_motion.y) * bindings.mouse_degrees_per_pixel;

    InputSnapshot {
        movement,
        mouse_delta,
        jump_pressed: keys.just_pressed(bindings.jump),
        crouch_pressed: keys.just_pressed(bindings.crouch),
        run_held: keys.pressed(bindings.run),
    }
}

/// Система: platform input → InputSnapshot
///
/// Регистрируется с `run_if(resource_exists::<ButtonInput<KeyCode>>)`,
/// без InputPlugin snapshot остаётся таким, каким его записал driver.
/// Реплики и Unspawned не трогаем.
pub fn sample_platform_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_motion: Option<Res<AccumulatedMouseMotion>>,
    bindings: Res<InputBindings>,
    mut snapshots: Query<(&OwnershipContext, &mut InputSnapshot), With<PlayerController>>,
) {
    let motion = mouse_motion.map(|m| m.delta).unwrap_or(Vec2::ZERO);
    let snapshot = read_platform_input(&keys, motion, &bindings);

    for (ownership, mut target) in snapshots.iter_mut() {
        if ownership.is_local_owner() {
            *target = snapshot;
        }
    }
}

/// Система: сбросить key-down edges owner'а в конце frame
pub fn clear_input_edges(mut snapshots: Query<(&OwnershipContext, &mut InputSnapshot), With<PlayerController>>) {
    for (ownership, mut snapshot) in snapshots.iter_mut() {
        if !ownership.is_local_owner() {
            continue;
        }

        if snapshot.jump_pressed || snapshot.crouch_pressed {
            snapshot.clear_edges();
        }
    }
}
