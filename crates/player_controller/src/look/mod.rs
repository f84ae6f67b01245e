//! Mouse look: yaw для тела, pitch для камеры
//!
//! Углы храним в градусах (как в ControllerConfig), в Quat переводим только
//! при записи в Transform. Сглаживания нет — прямое присваивание каждый frame.

use bevy::prelude::*;

/// Текущие углы обзора
///
/// Инвариант: -vertical_look_limit ≤ pitch ≤ vertical_look_limit.
/// Yaw накапливается без ограничения.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct LookState {
    pub yaw: f32,
    pub pitch: f32,
}

impl LookState {
    /// Применить mouse delta (уже в градусах, до sensitivity)
    ///
    /// Мышь вверх (delta.y > 0) уменьшает pitch → камера смотрит вверх.
    pub fn apply_mouse(&mut self, mouse_delta: Vec2, sensitivity: f32, vertical_limit: f32) {
        let scaled = mouse_delta * sensitivity;

        // NaN от кривого input не должен отравить состояние навсегда
        if !scaled.is_finite() {
            return;
        }

        let limit = vertical_limit.abs();
        self.pitch = (self.pitch - scaled.y).clamp(-limit, limit);
        self.yaw += scaled.x;
    }

    /// Поворот тела (только ось Y)
    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw.to_radians())
    }

    /// Локальный поворот камеры (только ось X)
    pub fn camera_rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch.to_radians())
    }
}
