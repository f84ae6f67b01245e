//! Ownership gate
//!
//! Network spawn lifecycle сообщает через `NetworkSpawned`, владеет ли этот
//! клиент entity. Ветка одноразовая и необратимая:
//! - Owner → камера привязана, курсор захвачен, input обрабатывается
//! - Replica → камера выключена, per-frame работы нет вообще
//!
//! Контроллер не наследует никакой network base — ownership передаётся
//! явным значением `OwnershipContext` в `update_frame` / `physics_step`.

use bevy::prelude::*;

use crate::controller::{CameraLink, PlayerController};
use crate::logger;

/// Статус ownership для controller entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum OwnershipContext {
    /// Ещё не было spawn callback — ничего не обрабатываем
    #[default]
    Unspawned,
    /// Локальный владелец: обрабатывает input
    LocalOwner,
    /// Реплика чужого игрока: выключена навсегда
    Replica,
}

impl OwnershipContext {
    pub fn is_local_owner(self) -> bool {
        self == OwnershipContext::LocalOwner
    }
}

/// Event: network spawn callback для entity
#[derive(Event, Debug, Clone, Copy)]
pub struct NetworkSpawned {
    pub entity: Entity,
    pub is_local_owner: bool,
}

/// Захват курсора; применяется host window layer
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerLock {
    #[default]
    Free,
    Locked,
}

/// Камера игрока (rendering system читает `active`)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerCamera {
    pub active: bool,
}

impl Default for PlayerCamera {
    fn default() -> Self {
        Self { active: true }
    }
}

/// Marker: камера сцены по умолчанию (fallback для owner без своей камеры)
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PlayerCamera, Transform)]
pub struct MainCamera;

/// Система: разрешить ownership по spawn events
pub fn handle_network_spawn(
    mut commands: Commands,
    mut spawn_events: EventReader<NetworkSpawned>,
    mut players: Query<(&mut OwnershipContext, &mut CameraLink), With<PlayerController>>,
    main_cameras: Query<Entity, With<MainCamera>>,
    mut cameras: Query<&mut PlayerCamera>,
    mut pointer: ResMut<PointerLock>,
) {
    for event in spawn_events.read() {
        let Ok((mut ownership, mut camera_link)) = players.get_mut(event.entity) else {
            logger::log_warning(&format!(
                "NetworkSpawned for {:?}: not a player controller, ignored",
                event.entity
            ));
            continue;
        };

        if *ownership != OwnershipContext::Unspawned {
            logger::log_warning(&format!(
                "NetworkSpawned for {:?}: ownership already resolved as {:?}, ignored",
                event.entity, *ownership
            ));
            continue;
        }

        if event.is_local_owner {
            // Своей камеры нет → берём MainCamera сцены
            if camera_link.0.is_none() {
                camera_link.0 = main_cameras.iter().next();
            }

            match camera_link.0 {
                Some(camera) => logger::log_info(&format!(
                    "Player {:?} spawned as local owner (camera {:?})",
                    event.entity, camera
                )),
                None => logger::log_warning(&format!(
                    "Player {:?} spawned as local owner without camera: pitch will not be applied",
                    event.entity
                )),
            }

            *pointer = PointerLock::Locked;
            *ownership = OwnershipContext::LocalOwner;
        } else {
            if let Some(camera) = camera_link.0 {
                match cameras.get_mut(camera) {
                    Ok(mut player_camera) => player_camera.active = false,
                    // Привязанная камера без PlayerCamera: выключаем вставкой
                    Err(_) => {
                        if let Ok(mut entity) = commands.get_entity(camera) {
                            entity.insert(PlayerCamera { active: false });
                        }
                    }
                }
            }

            *ownership = OwnershipContext::Replica;
            logger::log(&format!("Player {:?} spawned as replica, controller disabled", event.entity));
        }
    }
}
