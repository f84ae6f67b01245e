//! Sprint stamina — hysteresis gate бега
//!
//! - Бежим пока держим run + есть движение + `can_run`
//! - Timer копит время бега, при `run_duration` → истощение (`can_run = false`)
//! - Без бега timer убывает со скоростью `stamina_regen_rate`
//! - `can_run` возвращается ТОЛЬКО когда timer дошёл до 0
//!
//! Истощение и восстановление используют разные пороги (duration vs 0),
//! поэтому отпускание Shift на полпути не даёт "мигать" между состояниями.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Выбранный режим передвижения на этот frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum RunState {
    #[default]
    Walking,
    Running,
}

/// Состояние stamina одного контроллера
///
/// Инвариант: 0.0 ≤ run_timer ≤ run_duration
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SprintStamina {
    /// Накопленное время бега (секунды)
    pub run_timer: f32,
    pub can_run: bool,
}

impl Default for SprintStamina {
    fn default() -> Self {
        Self {
            run_timer: 0.0,
            can_run: true,
        }
    }
}

/// Переход, случившийся за tick (для логов/анимаций)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaminaTransition {
    Exhausted,
    Recovered,
}

impl SprintStamina {
    /// Продвинуть state machine на `delta` секунд
    ///
    /// Возвращает режим, в котором контроллер движется с этого момента.
    /// Frame, на котором timer достиг `run_duration`, уже считается `Walking`.
    pub fn tick(
        &mut self,
        config: &ControllerConfig,
        is_moving: bool,
        run_held: bool,
        delta: f32,
    ) -> (RunState, Option<StaminaTransition>) {
        let delta = delta.max(0.0);

        if is_moving && run_held && self.can_run {
            self.run_timer = (self.run_timer + delta).min(config.run_duration);

            if self.run_timer >= config.run_duration {
                self.can_run = false;
                return (RunState::Walking, Some(StaminaTransition::Exhausted));
            }

            return (RunState::Running, None);
        }

        self.run_timer = (self.run_timer - config.stamina_regen_rate * delta).max(0.0);

        if self.run_timer <= 0.0 && !self.can_run {
            self.can_run = true;
            return (RunState::Walking, Some(StaminaTransition::Recovered));
        }

        (RunState::Walking, None)
    }

    /// Доля оставшегося бега (1.0 = полный запас), для HUD
    pub fn remaining_fraction(&self, config: &ControllerConfig) -> f32 {
        (1.0 - self.run_timer / config.run_duration).clamp(0.0, 1.0)
    }
}

impl RunState {
    pub fn speed(self, config: &ControllerConfig) -> f32 {
        match self {
            RunState::Walking => config.walk_speed,
            RunState::Running => config.run_speed,
        }
    }
}
