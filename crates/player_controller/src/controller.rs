//! Player controller — оркестрация frame и physics step
//!
//! Два темпа:
//! - `Update` (variable rate): input → look → animation flags → stamina → `DesiredSpeed`
//! - `FixedUpdate` (60Hz): `DesiredSpeed` + текущая velocity → velocity change
//!
//! Логика — чистые функции `update_frame` / `physics_step` с явным
//! `OwnershipContext`; ECS системы только достают компоненты и пишут результат.

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::*;

use crate::animation::AnimationFlags;
use crate::config::ControllerConfig;
use crate::input::{clear_input_edges, sample_platform_input, InputBindings, InputSnapshot};
use crate::locomotion::{apply_jump_impulse, desired_velocity, velocity_change, DesiredSpeed, JumpIntent};
use crate::logger;
use crate::look::LookState;
use crate::ownership::{handle_network_spawn, NetworkSpawned, OwnershipContext, PointerLock};
use crate::stamina::{RunState, SprintStamina, StaminaTransition};

/// Marker: entity управляется этим контроллером
///
/// Required Components добавляют всё состояние контроллера автоматически.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(
    ControllerConfig,
    ControllerState,
    InputSnapshot,
    DesiredSpeed,
    AnimationFlags,
    OwnershipContext,
    CameraLink,
    Transform
)]
pub struct PlayerController;

/// Состояние контроллера: мутирует только `update_frame` своего entity
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ControllerState {
    pub look: LookState,
    pub crouching: bool,
    pub stamina: SprintStamina,
    pub run_state: RunState,
}

/// Камера, которой управляет pitch (None → fallback на MainCamera при spawn)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CameraLink(pub Option<Entity>);

/// Результат одного frame для owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    pub body_rotation: Quat,
    pub camera_rotation: Quat,
    pub desired: DesiredSpeed,
    pub animation: AnimationFlags,
    pub run_state: RunState,
    /// Key-down прыжка на этом frame
    pub jump: bool,
    pub stamina_transition: Option<StaminaTransition>,
}

/// Один variable-rate frame
///
/// Для не-owner возвращает `None` и не трогает `state`.
pub fn update_frame(
    ownership: OwnershipContext,
    config: &ControllerConfig,
    state: &mut ControllerState,
    input: &InputSnapshot,
    vertical_speed: f32,
    delta: f32,
) -> Option<FrameOutput> {
    if !ownership.is_local_owner() {
        return None;
    }

    let axis = input.normalized_movement();
    let is_moving = axis.length() > 0.0;

    state
        .look
        .apply_mouse(input.mouse_delta, config.mouse_sensitivity, config.vertical_look_limit);

    if input.crouch_pressed {
        state.crouching = !state.crouching;
    }

    let animation = AnimationFlags::observe(
        axis.length(),
        state.crouching,
        vertical_speed,
        config.jump_anim_threshold,
    );

    let (run_state, stamina_transition) =
        state.stamina.tick(config, is_moving, input.run_held, delta);
    state.run_state = run_state;

    Some(FrameOutput {
        body_rotation: state.look.body_rotation(),
        camera_rotation: state.look.camera_rotation(),
        desired: DesiredSpeed {
            axis,
            speed: run_state.speed(config),
        },
        animation,
        run_state,
        jump: input.jump_pressed,
        stamina_transition,
    })
}

/// Один fixed-rate physics step: velocity change для тела
pub fn physics_step(
    ownership: OwnershipContext,
    config: &ControllerConfig,
    desired: &DesiredSpeed,
    body_rotation: Quat,
    current_velocity: Vec3,
) -> Option<Vec3> {
    if !ownership.is_local_owner() {
        return None;
    }

    let target = desired_velocity(desired.axis, desired.speed, body_rotation);
    Some(velocity_change(target, current_velocity, config.max_velocity_change))
}

/// Система: per-frame update всех owner контроллеров
pub fn player_frame_update(
    time: Res<Time>,
    mut jump_events: EventWriter<JumpIntent>,
    mut players: Query<
        (
            Entity,
            &OwnershipContext,
            &ControllerConfig,
            &mut ControllerState,
            &InputSnapshot,
            &mut DesiredSpeed,
            &mut AnimationFlags,
            &mut Transform,
            &CameraLink,
            Option<&Velocity>,
        ),
        With<PlayerController>,
    >,
    mut cameras: Query<&mut Transform, Without<PlayerController>>,
) {
    let delta = time.delta_secs();

    for (
        entity,
        ownership,
        config,
        mut state,
        input,
        mut desired,
        mut animation,
        mut transform,
        camera_link,
        velocity,
    ) in players.iter_mut()
    {
        // Guard до любого &mut доступа: реплика не получает даже change ticks
        if !ownership.is_local_owner() {
            continue;
        }

        let vertical_speed = velocity.map(|v| v.linvel.y).unwrap_or(0.0);

        let Some(output) = update_frame(*ownership, config, &mut state, input, vertical_speed, delta)
        else {
            continue;
        };

        transform.rotation = output.body_rotation;

        if let Some(camera) = camera_link.0 {
            if let Ok(mut camera_transform) = cameras.get_mut(camera) {
                camera_transform.rotation = output.camera_rotation;
            }
        }

        *desired = output.desired;

        if *animation != output.animation {
            *animation = output.animation;
        }

        if output.jump {
            jump_events.write(JumpIntent { entity });
        }

        match output.stamina_transition {
            Some(StaminaTransition::Exhausted) => logger::log(&format!(
                "Player {:?} exhausted after {:.2}s of running",
                entity, state.stamina.run_timer
            )),
            Some(StaminaTransition::Recovered) => {
                logger::log(&format!("Player {:?} can run again", entity))
            }
            None => {}
        }
    }
}

/// Система: fixed-step velocity change (до sync с rapier backend)
pub fn apply_locomotion(
    mut players: Query<
        (
            &OwnershipContext,
            &ControllerConfig,
            &DesiredSpeed,
            &Transform,
            &mut Velocity,
        ),
        With<PlayerController>,
    >,
) {
    for (ownership, config, desired, transform, mut velocity) in players.iter_mut() {
        if !ownership.is_local_owner() {
            continue;
        }

        if let Some(change) = physics_step(*ownership, config, desired, transform.rotation, velocity.linvel) {
            velocity.linvel += change;
        }
    }
}

/// Порядок систем контроллера
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ControllerSet {
    /// Update: spawn → input → frame → jump → cleanup
    Frame,
    /// FixedUpdate: velocity change
    Physics,
}

/// Plugin контроллера игрока
///
/// Physics backend (RapierPhysicsPlugin или HeadlessPhysicsPlugin)
/// добавляет host.
pub struct PlayerControllerPlugin;

impl Plugin for PlayerControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NetworkSpawned>()
            .add_event::<JumpIntent>()
            .init_resource::<PointerLock>()
            .init_resource::<InputBindings>()
            .add_systems(
                Update,
                (
                    handle_network_spawn,
                    sample_platform_input.run_if(resource_exists::<ButtonInput<KeyCode>>),
                    player_frame_update,
                    apply_jump_impulse,
                    clear_input_edges,
                )
                    .chain()
                    .in_set(ControllerSet::Frame),
            )
            .add_systems(
                FixedUpdate,
                apply_locomotion
                    .in_set(ControllerSet::Physics)
                    .before(PhysicsSet::SyncBackend),
            );
    }
}

/// Spawn helper: controller entity с rapier телом
///
/// - Dynamic rigid body, capsule 1.8m, вращение заблокировано
///   (yaw пишем сами в Transform)
/// - Ownership = Unspawned до `NetworkSpawned`
pub fn spawn_player(
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
            CameraLink(camera),
            // Rapier physics
            RigidBody::Dynamic,
            Collider::capsule_y(0.5, 0.4),
            LockedAxes::ROTATION_LOCKED,
            Velocity::zero(),
            ExternalImpulse::default(),
        ))
        .id()
}
