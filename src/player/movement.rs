//! Ground-relative locomotion: camera-relative walking and grounded jumps.
//!
//! Input axes are mapped onto the camera's forward/right flattened onto the
//! ground plane, scaled by the move speed and written as the body's
//! horizontal velocity. Vertical velocity belongs to gravity and jumps and is
//! never touched by walking.

use bevy::prelude::*;

use crate::physics::{CollisionLayers, OverlapQuery, PhysicsBody, RigidBody, StaticColliders};
use crate::player::camera::CameraRig;
use crate::player::input::{DirectionalInput, MoveIntent, MoveKeys};
use crate::settings::{InputScheme, LocomotionSettings, Settings, StepMode};

/// Local offset of an auto-created ground probe.
pub const DEFAULT_PROBE_OFFSET: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Marker on auto-created ground probe entities.
#[derive(Component, Debug, Default)]
pub struct GroundProbe;

/// Walks a [`RigidBody`] relative to a camera and jumps when grounded.
///
/// The grounded flag and the sampled intent are owned by the systems in this
/// module and only exposed read-only.
#[derive(Component, Debug, Clone)]
pub struct LocomotionBody {
    pub move_speed: f32,
    pub jump_impulse: f32,
    /// Probe whose world position is tested for ground. Created as a child on
    /// activation when unset.
    pub ground_check: Option<Entity>,
    pub ground_check_radius: f32,
    pub ground_mask: CollisionLayers,
    /// Camera whose orientation defines "forward". World axes when unset.
    pub camera: Option<Entity>,
    pub input: InputScheme,
    grounded: bool,
    intent: MoveIntent,
}

impl Default for LocomotionBody {
    fn default() -> Self {
        Self::from_settings(&LocomotionSettings::default())
    }
}

impl LocomotionBody {
    /// Build a body from the `locomotion` section of the settings.
    ///
    /// # Arguments
    /// * `s` - tuning to copy (speed, impulse, probe radius and mask, input)
    ///
    /// # Returns
    /// A body with no probe and no camera; both are resolved on activation.
    #[must_use]
    pub fn from_settings(s: &LocomotionSettings) -> Self {
        Self {
            move_speed: s.move_speed,
            jump_impulse: s.jump_impulse,
            ground_check: None,
            ground_check_radius: s.ground_check_radius,
            ground_mask: CollisionLayers(s.ground_mask),
            camera: None,
            input: s.input,
            grounded: false,
            intent: MoveIntent::default(),
        }
    }

    /// Use `camera` for the movement basis instead of discovering one.
    #[must_use]
    pub fn with_camera(mut self, camera: Entity) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Result of the last ground contact test.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Latest sampled input.
    #[must_use]
    pub fn intent(&self) -> MoveIntent {
        self.intent
    }

    /// Override the sampled input, e.g. for scripted movement.
    pub fn set_intent(&mut self, intent: MoveIntent) {
        self.intent = intent;
    }
}

/// Flatten onto the ground plane and scale to unit length, or zero when the
/// vector is (nearly) vertical.
#[must_use]
pub fn flatten(v: Vec3) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    let len = flat.length();
    if len > 1e-6 { flat / len } else { Vec3::ZERO }
}

/// Horizontal forward/right pair that input axes are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl MoveBasis {
    /// Used when no camera is available: world forward (-Z) and world right (+X).
    pub const WORLD: Self = Self {
        forward: Vec3::NEG_Z,
        right: Vec3::X,
    };

    /// Flatten a camera's forward/right onto the ground plane.
    ///
    /// Looking straight up or down leaves no horizontal forward; it is then
    /// rebuilt from the flattened right vector (and vice versa).
    #[must_use]
    pub fn from_camera(forward: Vec3, right: Vec3) -> Self {
        let f = flatten(forward);
        let r = flatten(right);
        match (f == Vec3::ZERO, r == Vec3::ZERO) {
            (false, false) => Self { forward: f, right: r },
            (true, false) => Self { forward: Vec3::Y.cross(r), right: r },
            (false, true) => Self { forward: f, right: f.cross(Vec3::Y) },
            (true, true) => Self::WORLD,
        }
    }

    /// Basis of a camera `Transform`; see [`MoveBasis::from_camera`].
    #[must_use]
    pub fn from_transform(tf: &Transform) -> Self {
        Self::from_camera(*tf.forward(), *tf.right())
    }

    /// Map input axes (x = right, y = forward) into a world direction.
    #[must_use]
    pub fn world_direction(&self, axis: Vec2) -> Vec3 {
        self.forward * axis.y + self.right * axis.x
    }
}

/// Horizontal velocity for `axis`. The y component is always zero.
#[must_use]
pub fn planar_velocity(basis: MoveBasis, axis: Vec2, speed: f32) -> Vec3 {
    let v = basis.world_direction(axis) * speed;
    Vec3::new(v.x, 0.0, v.z)
}

/// Overwrite the body's horizontal velocity and keep its vertical velocity.
/// Zero input stops horizontal motion.
pub fn apply_movement<B: PhysicsBody + ?Sized>(body: &mut B, basis: MoveBasis, axis: Vec2, speed: f32) {
    let vertical = body.velocity().y;
    let planar = if axis == Vec2::ZERO { Vec3::ZERO } else { planar_velocity(basis, axis, speed) };
    body.set_velocity(Vec3::new(planar.x, vertical, planar.z));
}

/// Zero vertical velocity then kick upward by `impulse`, only when grounded.
///
/// # Arguments
/// * `body` - body to kick
/// * `grounded` - cached ground contact; nothing happens when `false`
/// * `impulse` - upward impulse, divided by mass by the body
///
/// # Returns
/// Whether the jump happened.
pub fn try_jump<B: PhysicsBody + ?Sized>(body: &mut B, grounded: bool, impulse: f32) -> bool {
    if !grounded {
        return false;
    }
    let v = body.velocity();
    body.set_velocity(Vec3::new(v.x, 0.0, v.z));
    body.apply_impulse(Vec3::Y * impulse);
    true
}

/// World transform for a probe at `local` under a body spawned this frame.
///
/// Propagation has not run yet, so a root body's `GlobalTransform` may still be
/// the identity; its local `Transform` is already its world transform. A
/// parented body falls back to whatever `GlobalTransform` it carries.
///
/// # Arguments
/// * `body_local` - the body's `Transform`, if any
/// * `body_global` - the body's `GlobalTransform`, if any
/// * `has_parent` - whether the body is itself a child
/// * `local` - the probe's offset from the body
///
/// # Returns
/// The probe's `GlobalTransform` as propagation would compute it.
#[must_use]
pub fn probe_global_transform(
    body_local: Option<&Transform>,
    body_global: Option<&GlobalTransform>,
    has_parent: bool,
    local: Transform,
) -> GlobalTransform {
    let origin = match (body_local, body_global) {
        (Some(tf), _) if !has_parent => GlobalTransform::from(*tf),
        (_, Some(global)) => *global,
        (Some(tf), None) => GlobalTransform::from(*tf),
        (None, None) => GlobalTransform::IDENTITY,
    };
    origin.mul_transform(local)
}

/// Create missing ground probes and find a camera for new bodies.
///
/// The probe is spawned with its world transform already set, so a contact
/// test in the same frame samples the right place instead of the origin.
#[allow(clippy::needless_pass_by_value, clippy::type_complexity)]
pub fn activate_locomotion_bodies(
    mut commands: Commands,
    mut bodies: Query<
        (Entity, &mut LocomotionBody, Option<&Transform>, Option<&GlobalTransform>, Has<Parent>),
        Added<LocomotionBody>,
    >,
    cameras: Query<Entity, With<CameraRig>>,
) {
    for (entity, mut body, body_local, body_global, has_parent) in &mut bodies {
        if body.camera.is_none() {
            match cameras.iter().next() {
                Some(camera) => body.camera = Some(camera),
                None => warn!("no camera rig found for {entity:?}; moving along world axes"),
            }
        }

        if body.ground_check.is_none() {
            let local = Transform::from_translation(DEFAULT_PROBE_OFFSET);
            let probe = commands
                .spawn((
                    Name::new("GroundCheck"),
                    GroundProbe,
                    SpatialBundle {
                        transform: local,
                        global_transform: probe_global_transform(body_local, body_global, has_parent, local),
                        ..default()
                    },
                ))
                .id();
            commands.entity(entity).add_child(probe);
            body.ground_check = Some(probe);
            info!("created ground probe {probe:?} for {entity:?}");
        }
    }
}

/// Sample each body's configured input source.
#[allow(clippy::needless_pass_by_value)]
pub fn sample_move_input(
    input: DirectionalInput,
    settings: Res<Settings>,
    mut bodies: Query<&mut LocomotionBody>,
) {
    let keys = MoveKeys::from_controls(&settings.controls);
    let dead_zone = settings.locomotion.stick_dead_zone;
    for mut body in &mut bodies {
        let scheme = body.input;
        body.intent = input.sample(scheme, &keys, dead_zone);
    }
}

/// Refresh the cached ground contact of every body. A body without a live
/// probe is never grounded.
#[allow(clippy::needless_pass_by_value)]
pub fn update_ground_contact(
    statics: StaticColliders,
    probes: Query<&GlobalTransform>,
    mut bodies: Query<&mut LocomotionBody>,
) {
    for mut body in &mut bodies {
        let grounded = body
            .ground_check
            .and_then(|probe| probes.get(probe).ok())
            .is_some_and(|tf| statics.overlap_sphere(tf.translation(), body.ground_check_radius, body.ground_mask));
        if body.grounded != grounded {
            trace!("ground contact: {grounded}");
            body.grounded = grounded;
        }
    }
}

/// Apply this frame's jump edge.
pub fn apply_jump(mut bodies: Query<(&LocomotionBody, &mut RigidBody)>) {
    for (body, mut rb) in &mut bodies {
        if body.intent.jump_pressed && try_jump(&mut *rb, body.grounded, body.jump_impulse) {
            debug!("jump, vy = {:.2}", rb.velocity.y);
        }
    }
}

/// Write camera-relative horizontal velocity onto each body.
#[allow(clippy::needless_pass_by_value)]
pub fn drive_bodies(
    cameras: Query<&Transform, With<CameraRig>>,
    mut bodies: Query<(&LocomotionBody, &mut RigidBody)>,
) {
    for (body, mut rb) in &mut bodies {
        let basis = body
            .camera
            .and_then(|camera| cameras.get(camera).ok())
            .map_or(MoveBasis::WORLD, MoveBasis::from_transform);
        apply_movement(&mut *rb, basis, body.intent.axis, body.move_speed);
    }
}

/// Run condition: movement is applied every rendered frame.
pub fn frame_stepped(settings: Res<Settings>) -> bool {
    settings.locomotion.step == StepMode::Frame
}

/// Run condition: movement is applied every physics step.
pub fn fixed_stepped(settings: Res<Settings>) -> bool {
    settings.locomotion.step == StepMode::Fixed
}

/// Push locomotion tuning from `Settings` into live bodies when it changes.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_locomotion_settings(
    settings: Res<Settings>,
    mut bodies: Query<&mut LocomotionBody>,
    mut last: Local<Option<LocomotionSettings>>,
) {
    let s = &settings.locomotion;
    if last.as_ref() == Some(s) {
        return;
    }
    if last.is_some() {
        for mut body in &mut bodies {
            body.move_speed = s.move_speed;
            body.jump_impulse = s.jump_impulse;
            body.ground_check_radius = s.ground_check_radius;
            body.ground_mask = CollisionLayers(s.ground_mask);
            body.input = s.input;
        }
    }
    *last = Some(s.clone());
}
