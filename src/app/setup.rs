//! Startup system building the demo course.
//!
//! Spawns a sun, a ground slab, a short run of boxes to jump across, the
//! player body and the camera rig. Every solid gets a `Collider` on the ground
//! layer so the probe and the physics step can see it.
use bevy::prelude::*;
use parkour::physics::{Collider, CollisionLayers, RigidBody};
use parkour::player::{CameraRig, LocomotionBody, Player};
use parkour::settings::Settings;

const PLAYER_SIZE: Vec3 = Vec3::new(0.8, 2.0, 0.8);

/// Position and size of each obstacle on the course.
const COURSE: [(Vec3, Vec3); 6] = [
    (Vec3::new(0.0, 0.5, -6.0), Vec3::new(2.0, 1.0, 2.0)),
    (Vec3::new(0.0, 1.0, -10.0), Vec3::new(2.0, 2.0, 2.0)),
    (Vec3::new(3.0, 1.5, -13.0), Vec3::new(2.0, 3.0, 2.0)),
    (Vec3::new(6.0, 2.0, -16.0), Vec3::new(2.0, 4.0, 2.0)),
    (Vec3::new(6.0, 2.5, -21.0), Vec3::new(2.0, 5.0, 4.0)),
    (Vec3::new(-8.0, 1.5, -4.0), Vec3::new(6.0, 3.0, 0.5)),
];

#[allow(clippy::needless_pass_by_value)]
pub fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<Settings>,
) {
    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });

    let ground_size = Vec3::new(80.0, 1.0, 80.0);
    commands.spawn((
        Name::new("Ground"),
        PbrBundle {
            mesh: meshes.add(Cuboid::from_size(ground_size)),
            material: materials.add(Color::srgb(0.35, 0.45, 0.3)),
            transform: Transform::from_xyz(0.0, -0.5, 0.0),
            ..default()
        },
        Collider::cuboid(ground_size, CollisionLayers::GROUND),
    ));

    let block_material = materials.add(Color::srgb(0.7, 0.55, 0.4));
    for (i, (center, size)) in COURSE.iter().enumerate() {
        commands.spawn((
            Name::new(format!("Block {i}")),
            PbrBundle {
                mesh: meshes.add(Cuboid::from_size(*size)),
                material: block_material.clone(),
                transform: Transform::from_translation(*center),
                ..default()
            },
            Collider::cuboid(*size, CollisionLayers::GROUND),
        ));
    }

    commands.spawn((
        Name::new("Player"),
        Player,
        PbrBundle {
            mesh: meshes.add(Capsule3d::new(PLAYER_SIZE.x * 0.5, PLAYER_SIZE.y - PLAYER_SIZE.x)),
            material: materials.add(Color::srgb(0.2, 0.4, 0.9)),
            transform: Transform::from_xyz(0.0, 2.0, 0.0),
            ..default()
        },
        RigidBody::default(),
        Collider::cuboid(PLAYER_SIZE, CollisionLayers::PLAYER),
        LocomotionBody::from_settings(&settings.locomotion),
    ));

    commands.spawn((
        Name::new("Main Camera"),
        Camera3dBundle {
            transform: Transform::from_xyz(0.0, 3.6, 0.0),
            ..default()
        },
        CameraRig::from_settings(&settings.camera),
    ));
}
