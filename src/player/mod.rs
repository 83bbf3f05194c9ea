//! Player components and systems (camera rig, locomotion, input).
//!
//! [`PlayerPlugin`] registers everything in order:
//!
//! - `Update`: activation, cursor state and input sampling, ground contact,
//!   jumps, then movement when stepping per frame.
//! - `FixedUpdate`: movement when stepping per physics tick, before the
//!   physics integration.
//! - `PostUpdate`: camera look and follow, before transforms propagate.
//!
//! # Example:
//!
//! ```no_run
//! use bevy::prelude::*;
//! use parkour::physics::{Collider, CollisionLayers, RigidBody};
//! use parkour::player::{CameraRig, LocomotionBody, Player, PlayerPlugin};
//!
//! fn spawn(mut commands: Commands) {
//!     commands.spawn((
//!         Player,
//!         LocomotionBody::default(),
//!         RigidBody::default(),
//!         Collider::cuboid(Vec3::new(0.8, 2.0, 0.8), CollisionLayers::PLAYER),
//!         SpatialBundle::default(),
//!     ));
//!     commands.spawn((Camera3dBundle::default(), CameraRig::default()));
//! }
//!
//! App::new().add_plugins((DefaultPlugins, PlayerPlugin)).add_systems(Startup, spawn);
//! ```
pub mod camera;
pub mod input;
pub mod movement;
pub mod smooth;

use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub use camera::*;
pub use input::*;
pub use movement::*;
pub use smooth::SmoothDamp;

use crate::physics::PhysicsSet;
use crate::settings::Settings;

/// Tag for the entity the camera rig follows by default.
#[derive(Component, Debug, Default)]
pub struct Player;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSet {
    Activate,
    Input,
    Ground,
    Jump,
    Move,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Settings>()
            .configure_sets(
                Update,
                (
                    PlayerSet::Activate,
                    PlayerSet::Input,
                    PlayerSet::Ground,
                    PlayerSet::Jump,
                    PlayerSet::Move,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (activate_camera_rigs, activate_locomotion_bodies).in_set(PlayerSet::Activate),
            )
            .add_systems(
                Update,
                ((cursor_lock, look_input).chain(), sample_move_input).in_set(PlayerSet::Input),
            )
            .add_systems(Update, update_ground_contact.in_set(PlayerSet::Ground))
            .add_systems(Update, apply_jump.in_set(PlayerSet::Jump))
            .add_systems(Update, drive_bodies.in_set(PlayerSet::Move).run_if(frame_stepped))
            .add_systems(FixedUpdate, drive_bodies.before(PhysicsSet).run_if(fixed_stepped))
            .add_systems(
                PostUpdate,
                follow_target.before(TransformSystem::TransformPropagate),
            )
            .add_systems(
                Update,
                (sync_camera_settings, sync_locomotion_settings, release_cursor_on_removal)
                    .before(PlayerSet::Activate),
            );
    }
}
