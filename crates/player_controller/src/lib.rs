//! Player Controller Core
//!
//! Контроллер персонажа для сетевой игры на Bevy 0.16 ECS:
//! input → mouse look → animation flags → sprint stamina → velocity change.
//!
//! Вся per-frame работа идёт только у локального владельца entity
//! (`OwnershipContext::LocalOwner`), реплики после spawn выключены.
//!
//! Внешние системы общаются с контроллером через данные:
//! - network spawn → `NetworkSpawned` event
//! - rendering → `PlayerCamera`, `MainCamera`, `PointerLock`
//! - animator → `AnimationFlags` ("Walk" / "Crouch" / "Jump")
//! - physics → rapier `Velocity` + `ExternalImpulse`

use bevy::prelude::*;

pub mod animation;
pub mod config;
pub mod controller;
pub mod headless;
pub mod input;
pub mod locomotion;
pub mod logger;
pub mod look;
pub mod ownership;
pub mod stamina;

pub use animation::{AnimationFlags, CROUCH_PARAM, JUMP_PARAM, WALK_PARAM};
pub use config::{ConfigError, ControllerConfig};
pub use controller::{
    physics_step, spawn_player, update_frame, CameraLink, ControllerSet, ControllerState, FrameOutput,
    PlayerController, PlayerControllerPlugin,
};
pub use headless::{spawn_headless_player, HeadlessBody, HeadlessPhysicsPlugin};
pub use input::{InputBindings, InputSnapshot};
pub use locomotion::{DesiredSpeed, JumpIntent};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use look::LookState;
pub use ownership::{MainCamera, NetworkSpawned, OwnershipContext, PlayerCamera, PointerLock};
pub use stamina::{RunState, SprintStamina, StaminaTransition};

/// Частота physics step (FixedUpdate)
pub const PHYSICS_HZ: f64 = 60.0;

/// Создаёт minimal Bevy App для headless прогона контроллера
///
/// Плагины контроллера и физики добавляет вызывающий.
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ));

    app
}
