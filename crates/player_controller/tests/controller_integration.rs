//! Controller integration test
//!
//! Headless App (MinimalPlugins + HeadlessPhysicsPlugin), 60 FPS manual time.
//!
//! Проверяем:
//! - Ownership gate (owner / replica / повторный spawn)
//! - Owner: ходьба, mouse look → камера, прыжок, истощение бега
//! - Replica: ноль мутаций состояния при любом input

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::{ExternalImpulse, Velocity};
use player_controller::*;

/// Helper: App с контроллером и headless физикой, 1/60s на update
fn create_controller_app() -> App {
    let mut app = create_headless_app();
    app.add_plugins((PlayerControllerPlugin, HeadlessPhysicsPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / 60.0,
        )));
    app
}

/// Helper: spawn игрока и отправить NetworkSpawned
fn spawn_player_with_ownership(app: &mut App, is_local_owner: bool, camera: Option<Entity>) -> Entity {
    let entity = {
        let mut commands = app.world_mut().commands();
        spawn_headless_player(&mut commands, Vec3::ZERO, ControllerConfig::default(), camera)
    };
    app.world_mut().flush();

    app.world_mut().send_event(NetworkSpawned {
        entity,
        is_local_owner,
    });

    entity
}

fn spawn_camera(app: &mut App, main: bool) -> Entity {
    let mut camera = app
        .world_mut()
        .spawn((PlayerCamera::default(), Transform::default()));
    if main {
        camera.insert(MainCamera);
    }
    camera.id()
}

fn set_input(app: &mut App, entity: Entity, input: InputSnapshot) {
    *app.world_mut()
        .get_mut::<InputSnapshot>(entity)
        .expect("player has InputSnapshot") = input;
}

fn run_updates(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

/// Test: owner берёт MainCamera, захватывает курсор
#[test]
fn test_owner_binds_main_camera_and_locks_pointer() {
    let mut app = create_controller_app();
    let camera = spawn_camera(&mut app, true);
    let player = spawn_player_with_ownership(&mut app, true, None);

    app.update();

    let world = app.world();
    assert_eq!(world.get::<OwnershipContext>(player), Some(&OwnershipContext::LocalOwner));
    assert_eq!(world.get::<CameraLink>(player), Some(&CameraLink(Some(camera))));
    assert_eq!(*world.resource::<PointerLock>(), PointerLock::Locked);
    assert!(world.get::<PlayerCamera>(camera).unwrap().active);
}

/// Test: реплика выключает свою камеру и не трогает курсор
#[test]
fn test_replica_disables_camera() {
    let mut app = create_controller_app();
    let camera = spawn_camera(&mut app, false);
    let replica = spawn_player_with_ownership(&mut app, false, Some(camera));

    app.update();

    let world = app.world();
    assert_eq!(world.get::<OwnershipContext>(replica), Some(&OwnershipContext::Replica));
    assert!(!world.get::<PlayerCamera>(camera).unwrap().active);
    assert_eq!(*world.resource::<PointerLock>(), PointerLock::Free);
}

/// Test: повторный spawn event не переключает уже решённый ownership
#[test]
fn test_ownership_branch_is_irreversible() {
    let mut app = create_controller_app();
    let replica = spawn_player_with_ownership(&mut app, false, None);
    app.update();

    app.world_mut().send_event(NetworkSpawned {
        entity: replica,
        is_local_owner: true,
    });
    app.update();

    assert_eq!(
        app.world().get::<OwnershipContext>(replica),
        Some(&OwnershipContext::Replica)
    );
    assert_eq!(*app.world().resource::<PointerLock>(), PointerLock::Free);
}

/// Test: spawn event для entity без контроллера игнорируется без паники
#[test]
fn test_spawn_event_for_unknown_entity_ignored() {
    let mut app = create_controller_app();
    let stranger = app.world_mut().spawn(Transform::default()).id();

    app.world_mut().send_event(NetworkSpawned {
        entity: stranger,
        is_local_owner: true,
    });
    app.update();

    assert!(app.world().get::<OwnershipContext>(stranger).is_none());
    assert_eq!(*app.world().resource::<PointerLock>(), PointerLock::Free);
}

/// Test: W → velocity (0,0,walk_speed), тело движется вперёд
#[test]
fn test_owner_walks_forward() {
    let mut app = create_controller_app();
    let player = spawn_player_with_ownership(&mut app, true, None);

    set_input(
        &mut app,
        player,
        InputSnapshot {
            movement: Vec2::Y,
            ..default()
        },
    );
    run_updates(&mut app, 30);

    let world = app.world();
    let velocity = world.get::<Velocity>(player).unwrap().linvel;
    assert!((velocity.z - 4.0).abs() < 1e-4, "velocity = {velocity:?}");
    assert!(velocity.x.abs() < 1e-4, "velocity = {velocity:?}");
    assert!(world.get::<Transform>(player).unwrap().translation.z > 0.0);
    assert!(world.get::<AnimationFlags>(player).unwrap().walking);
}

/// Test: mouse look — pitch в камеру, yaw в тело
#[test]
fn test_mouse_look_rotates_body_and_camera() {
    let mut app = create_controller_app();
    let camera = spawn_camera(&mut app, true);
    let player = spawn_player_with_ownership(&mut app, true, None);

    // Первый update: ownership решён, input пустой
    app.update();

    set_input(
        &mut app,
        player,
        InputSnapshot {
            mouse_delta: Vec2::new(45.0, 10.0),
            ..default()
        },
    );
    app.update();

    let world = app.world();
    let state = world.get::<ControllerState>(player).unwrap();
    assert_eq!(state.look.yaw, 45.0);
    assert_eq!(state.look.pitch, -10.0);

    let body = world.get::<Transform>(player).unwrap();
    assert_eq!(body.rotation, Quat::from_rotation_y(45f32.to_radians()));

    let camera_transform = world.get::<Transform>(camera).unwrap();
    assert_eq!(camera_transform.rotation, Quat::from_rotation_x((-10f32).to_radians()));
}

/// Test: Space → импульс вверх, тело отрывается от пола, флаг Jump
#[test]
fn test_jump_applies_upward_impulse() {
    let mut app = create_controller_app();
    let player = spawn_player_with_ownership(&mut app, true, None);
    app.update();

    set_input(
        &mut app,
        player,
        InputSnapshot {
            jump_pressed: true,
            ..default()
        },
    );
    app.update();

    // Edge сброшен в конце frame, импульс ждёт physics step
    assert!(!app.world().get::<InputSnapshot>(player).unwrap().jump_pressed);

    run_updates(&mut app, 5);

    let world = app.world();
    assert_eq!(world.get::<ExternalImpulse>(player).unwrap().impulse, Vec3::ZERO);
    assert!(world.get::<Transform>(player).unwrap().translation.y > 0.0);
    assert!(world.get::<AnimationFlags>(player).unwrap().jumping);
}

/// Test: бег дольше run_duration → истощение, скорость возвращается к walk
#[test]
fn test_sprint_exhaustion_in_app() {
    let mut app = create_controller_app();
    let player = spawn_player_with_ownership(&mut app, true, None);
    let config = ControllerConfig::default();

    set_input(
        &mut app,
        player,
        InputSnapshot {
            movement: Vec2::Y,
            run_held: true,
            ..default()
        },
    );

    // ~1s бега: ещё running
    run_updates(&mut app, 60);
    {
        let world = app.world();
        assert_eq!(world.get::<DesiredSpeed>(player).unwrap().speed, config.run_speed);
        assert!(world.get::<ControllerState>(player).unwrap().stamina.can_run);
    }

    // run_duration + 1s суммарно
    run_updates(&mut app, 180);

    let world = app.world();
    let state = world.get::<ControllerState>(player).unwrap();
    assert!(!state.stamina.can_run);
    assert_eq!(state.run_state, RunState::Walking);
    assert_eq!(world.get::<DesiredSpeed>(player).unwrap().speed, config.walk_speed);
    assert!(state.stamina.run_timer <= config.run_duration);
}

/// Test: реплика с активным input — состояние не меняется вообще
#[test]
fn test_replica_ignores_input() {
    let mut app = create_controller_app();
    let camera = spawn_camera(&mut app, false);
    let replica = spawn_player_with_ownership(&mut app, false, Some(camera));
    app.update();

    let before_state = *app.world().get::<ControllerState>(replica).unwrap();
    let before_desired = *app.world().get::<DesiredSpeed>(replica).unwrap();
    let before_flags = *app.world().get::<AnimationFlags>(replica).unwrap();
    let before_rotation = app.world().get::<Transform>(replica).unwrap().rotation;
    let before_camera = *app.world().get::<Transform>(camera).unwrap();

    for _ in 0..30 {
        set_input(
            &mut app,
            replica,
            InputSnapshot {
                movement: Vec2::new(1.0, 1.0),
                mouse_delta: Vec2::new(15.0, -5.0),
                jump_pressed: true,
                crouch_pressed: true,
                run_held: true,
            },
        );
        app.update();
    }

    let world = app.world();
    assert_eq!(*world.get::<ControllerState>(replica).unwrap(), before_state);
    assert_eq!(*world.get::<DesiredSpeed>(replica).unwrap(), before_desired);
    assert_eq!(*world.get::<AnimationFlags>(replica).unwrap(), before_flags);
    assert_eq!(world.get::<Transform>(replica).unwrap().rotation, before_rotation);
    assert_eq!(*world.get::<Transform>(camera).unwrap(), before_camera);
    assert_eq!(world.get::<Velocity>(replica).unwrap().linvel, Vec3::ZERO);
    assert_eq!(world.get::<ExternalImpulse>(replica).unwrap().impulse, Vec3::ZERO);
}

/// Test: до spawn callback контроллер тоже молчит
#[test]
fn test_unspawned_controller_idle() {
    let mut app = create_controller_app();
    let entity = {
        let mut commands = app.world_mut().commands();
        spawn_headless_player(&mut commands, Vec3::ZERO, ControllerConfig::default(), None)
    };
    app.world_mut().flush();

    set_input(
        &mut app,
        entity,
        InputSnapshot {
            movement: Vec2::Y,
            mouse_delta: Vec2::new(10.0, 10.0),
            ..default()
        },
    );
    run_updates(&mut app, 10);

    let world = app.world();
    assert_eq!(world.get::<OwnershipContext>(entity), Some(&OwnershipContext::Unspawned));
    assert_eq!(*world.get::<ControllerState>(entity).unwrap(), ControllerState::default());
    assert_eq!(world.get::<Velocity>(entity).unwrap().linvel, Vec3::ZERO);
}

/// Test: platform input (ButtonInput<KeyCode>) заполняет snapshot сам
#[test]
fn test_platform_keys_drive_snapshot() {
    let mut app = create_controller_app();
    let player = spawn_player_with_ownership(&mut app, true, None);

    let mut keys = ButtonInput::<KeyCode>::default();
    keys.press(KeyCode::KeyD);
    keys.press(KeyCode::ShiftLeft);
    app.insert_resource(keys);

    run_updates(&mut app, 10);

    let world = app.world();
    let snapshot = world.get::<InputSnapshot>(player).unwrap();
    assert_eq!(snapshot.movement, Vec2::X);
    assert!(snapshot.run_held);

    let desired = world.get::<DesiredSpeed>(player).unwrap();
    assert_eq!(desired.axis, Vec2::X);
    assert_eq!(desired.speed, ControllerConfig::default().run_speed);
}

/// Test: камера сцены только с MainCamera (без явного PlayerCamera) получает pitch
#[test]
fn test_bare_main_camera_receives_pitch() {
    let mut app = create_controller_app();
    let camera = app.world_mut().spawn((MainCamera, Transform::default())).id();
    let player = spawn_player_with_ownership(&mut app, true, None);
    app.update();

    assert_eq!(app.world().get::<CameraLink>(player), Some(&CameraLink(Some(camera))));

    set_input(
        &mut app,
        player,
        InputSnapshot {
            mouse_delta: Vec2::new(0.0, 30.0),
            ..default()
        },
    );
    app.update();

    let world = app.world();
    assert_eq!(world.get::<ControllerState>(player).unwrap().look.pitch, -30.0);
    assert_eq!(
        world.get::<Transform>(camera).unwrap().rotation,
        Quat::from_rotation_x((-30f32).to_radians())
    );
}

/// Test: явно привязанная камера без PlayerCamera тоже вращается
#[test]
fn test_linked_plain_camera_receives_pitch() {
    let mut app = create_controller_app();
    let camera = app.world_mut().spawn(Transform::default()).id();
    let player = spawn_player_with_ownership(&mut app, true, Some(camera));
    app.update();

    set_input(
        &mut app,
        player,
        InputSnapshot {
            mouse_delta: Vec2::new(0.0, -20.0),
            ..default()
        },
    );
    app.update();

    assert_eq!(
        app.world().get::<Transform>(camera).unwrap().rotation,
        Quat::from_rotation_x(20f32.to_radians())
    );
}

/// Test: реплика выключает привязанную камеру, даже если PlayerCamera не было
#[test]
fn test_replica_disables_plain_linked_camera() {
    let mut app = create_controller_app();
    let camera = app.world_mut().spawn(Transform::default()).id();
    let replica = spawn_player_with_ownership(&mut app, false, Some(camera));

    app.update();

    let world = app.world();
    assert_eq!(world.get::<OwnershipContext>(replica), Some(&OwnershipContext::Replica));
    assert!(!world.get::<PlayerCamera>(camera).unwrap().active);
}

/// Test: platform input не пишет в snapshot реплики и Unspawned
#[test]
fn test_platform_keys_skip_non_owners() {
    let mut app = create_controller_app();
    let replica = spawn_player_with_ownership(&mut app, false, None);
    let unspawned = {
        let mut commands = app.world_mut().commands();
        spawn_headless_player(&mut commands, Vec3::ZERO, ControllerConfig::default(), None)
    };
    app.world_mut().flush();
    app.update();

    let before_replica = *app.world().get::<InputSnapshot>(replica).unwrap();
    let before_unspawned = *app.world().get::<InputSnapshot>(unspawned).unwrap();

    let mut keys = ButtonInput::<KeyCode>::default();
    keys.press(KeyCode::KeyW);
    keys.press(KeyCode::ShiftLeft);
    keys.press(KeyCode::Space);
    app.insert_resource(keys);

    run_updates(&mut app, 5);

    let world = app.world();
    assert_eq!(*world.get::<InputSnapshot>(replica).unwrap(), before_replica);
    assert_eq!(*world.get::<InputSnapshot>(unspawned).unwrap(), before_unspawned);
    assert_eq!(*world.get::<InputSnapshot>(replica).unwrap(), InputSnapshot::default());
    assert_eq!(world.get::<Velocity>(replica).unwrap().linvel, Vec3::ZERO);
}
