//! Author-time настройки контроллера
//!
//! Значения по умолчанию совпадают с тем, что выставлено на prefab игрока.
//! Конфиг можно загрузить из RON (частичный файл допустим: недостающие поля
//! берутся из `Default`).

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Настройки движения, обзора и stamina для одного контроллера
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[serde(default)]
pub struct ControllerConfig {
    /// Скорость ходьбы (m/s)
    pub walk_speed: f32,
    /// Скорость бега (m/s)
    pub run_speed: f32,
    /// Максимальное изменение скорости по каждой горизонтальной оси за physics step
    pub max_velocity_change: f32,
    pub mouse_sensitivity: f32,
    /// Предел pitch камеры в градусах (симметричный)
    pub vertical_look_limit: f32,
    /// Сколько секунд можно бежать до истощения
    pub run_duration: f32,
    /// Скорость восстановления run timer (секунд таймера в секунду)
    pub stamina_regen_rate: f32,
    /// Импульс прыжка (N·s, вверх)
    pub jump_impulse: f32,
    /// |velocity.y| выше порога → анимация "Jump"
    pub jump_anim_threshold: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 10.0,
            max_velocity_change: 10.0,
            mouse_sensitivity: 1.0,
            vertical_look_limit: 80.0,
            run_duration: 3.0,
            stamina_regen_rate: 1.0,
            jump_impulse: 10.0,
            jump_anim_threshold: 0.1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read controller config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse controller config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid controller config: `{field}` = {value} ({reason})")]
    Invalid {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },
}

impl ControllerConfig {
    /// Проверка значений, которые сломали бы инварианты (clamp с min > max и т.п.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("walk_speed", self.walk_speed),
            ("run_speed", self.run_speed),
            ("max_velocity_change", self.max_velocity_change),
            ("jump_impulse", self.jump_impulse),
            ("jump_anim_threshold", self.jump_anim_threshold),
        ];
        let positive = [
            ("vertical_look_limit", self.vertical_look_limit),
            ("run_duration", self.run_duration),
            ("stamina_regen_rate", self.stamina_regen_rate),
        ];

        for &(field, value) in non_negative.iter().chain(positive.iter()) {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    value,
                    reason: "must be finite",
                });
            }
        }

        if let Some(&(field, value)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::Invalid {
                field,
                value,
                reason: "must not be negative",
            });
        }

        if let Some(&(field, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(ConfigError::Invalid {
                field,
                value,
                reason: "must be positive",
            });
        }

        if !self.mouse_sensitivity.is_finite() {
            return Err(ConfigError::Invalid {
                field: "mouse_sensitivity",
                value: self.mouse_sensitivity,
                reason: "must be finite",
            });
        }

        Ok(())
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&source)?;

        crate::logger::log_info(&format!(
            "Controller config loaded from {} (walk {:.1}, run {:.1}, run_duration {:.1}s)",
            path.display(),
            config.walk_speed,
            config.run_speed,
            config.run_duration
        ));

        Ok(config)
    }
}
