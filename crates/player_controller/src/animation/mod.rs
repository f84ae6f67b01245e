//! Animation flags для внешнего animator
//!
//! Три независимых boolean параметра — не state machine, могут быть
//! true одновременно (идём присев в прыжке).

use bevy::prelude::*;

pub const WALK_PARAM: &str = "Walk";
pub const CROUCH_PARAM: &str = "Crouch";
pub const JUMP_PARAM: &str = "Jump";

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    pub walking: bool,
    pub crouching: bool,
    pub jumping: bool,
}

impl AnimationFlags {
    /// Наблюдения за frame
    ///
    /// - walking: есть движение
    /// - crouching: текущее значение toggle
    /// - jumping: |vertical_speed| > threshold (вверх или вниз)
    pub fn observe(input_magnitude: f32, crouching: bool, vertical_speed: f32, threshold: f32) -> Self {
        Self {
            walking: input_magnitude > 0.0,
            crouching,
            jumping: vertical_speed.abs() > threshold,
        }
    }

    /// Named parameters в порядке публикации
    pub fn parameters(&self) -> [(&'static str, bool); 3] {
        [
            (WALK_PARAM, self.walking),
            (CROUCH_PARAM, self.crouching),
            (JUMP_PARAM, self.jumping),
        ]
    }
}
