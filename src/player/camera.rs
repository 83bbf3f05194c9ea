//! Orbit/first-person camera rig and cursor capture.
//!
//! A [`CameraRig`] turns pointer motion into accumulated yaw/pitch (degrees)
//! and follows a target entity at eye height through a [`SmoothDamp`]. Look
//! input is only applied while the cursor is captured. Systems:
//!
//! - `activate_camera_rigs`: seed angles from the spawn orientation, find a
//!   `Player` target, apply the initial cursor state.
//! - `cursor_lock`: the lock/unlock state machine.
//! - `look_input`: this frame's pointer delta.
//! - `follow_target`: rotation and position, once per frame before transform
//!   propagation.

use bevy::input::mouse::MouseMotion;
use bevy::math::EulerRot;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};

use crate::player::smooth::SmoothDamp;
use crate::player::Player;
use crate::settings::{CameraSettings, Settings};

/// Pointer deltas shorter than this are ignored.
pub const LOOK_DEAD_ZONE: f32 = 0.01;

/// Cursor capture state of a rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorLock {
    /// Cursor hidden and confined; pointer motion drives the look angles.
    Locked,
    /// Cursor free and visible; look input is ignored.
    Unlocked,
}

impl CursorLock {
    /// The opposite state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            CursorLock::Locked => CursorLock::Unlocked,
            CursorLock::Unlocked => CursorLock::Locked,
        }
    }

    /// One frame of the state machine.
    ///
    /// The toggle key flips the state, a primary click captures an unlocked
    /// cursor, and losing window focus releases a locked one.
    ///
    /// # Arguments
    /// * `toggle_pressed` - rising edge of the release-cursor key
    /// * `grab_pressed` - rising edge of the primary mouse button
    /// * `focus_lost` - the primary window lost focus this frame
    ///
    /// # Returns
    /// The state for the rest of the frame.
    #[must_use]
    pub fn step(self, toggle_pressed: bool, grab_pressed: bool, focus_lost: bool) -> Self {
        let mut next = if toggle_pressed { self.toggled() } else { self };
        if next == CursorLock::Unlocked && grab_pressed {
            next = CursorLock::Locked;
        }
        if next == CursorLock::Locked && focus_lost {
            next = CursorLock::Unlocked;
        }
        next
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// First-person camera that follows a target at eye height.
///
/// Angles, lock state and smoothing memory are private so the clamp and wrap
/// invariants hold; change them through the setters.
#[derive(Component, Debug, Clone)]
pub struct CameraRig {
    /// Entity to follow. Without one the rig holds still.
    pub target: Option<Entity>,
    pub eye_height: f32,
    pub eye_offset: Vec3,
    pub follow_speed: f32,
    /// Degrees of yaw per pointer unit.
    pub horizontal_sensitivity: f32,
    /// Degrees of pitch per pointer unit.
    pub vertical_sensitivity: f32,
    min_vertical_angle: f32,
    max_vertical_angle: f32,
    /// Axes on which the rig tracks the target; disabled axes stay put.
    pub follow_axes: BVec3,
    pub lock_on_start: bool,
    horizontal_angle: f32,
    vertical_angle: f32,
    lock: CursorLock,
    look_delta: Vec2,
    smoothing: SmoothDamp,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::from_settings(&CameraSettings::default())
    }
}

impl CameraRig {
    /// Build a rig from the `camera` section of the settings.
    ///
    /// # Arguments
    /// * `s` - eye placement, follow speed, sensitivities, pitch limits and
    ///   follow axes to copy
    ///
    /// # Returns
    /// An unlocked rig with no target, looking along -Z. Activation seeds the
    /// angles, finds a target and applies `lock_on_start`.
    #[must_use]
    pub fn from_settings(s: &CameraSettings) -> Self {
        let mut rig = Self {
            target: None,
            eye_height: s.eye_height,
            eye_offset: s.eye_offset,
            follow_speed: s.follow_speed,
            horizontal_sensitivity: s.horizontal_sensitivity,
            vertical_sensitivity: s.vertical_sensitivity,
            min_vertical_angle: -90.0,
            max_vertical_angle: 90.0,
            follow_axes: BVec3::new(s.follow_x, s.follow_y, s.follow_z),
            lock_on_start: s.lock_on_start,
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            lock: CursorLock::Unlocked,
            look_delta: Vec2::ZERO,
            smoothing: SmoothDamp::default(),
        };
        rig.set_vertical_range(s.min_vertical_angle, s.max_vertical_angle);
        rig
    }

    /// Follow `target` instead of discovering a `Player`.
    #[must_use]
    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    /// Follow another entity, or none. The smoothing velocity toward the old
    /// target is dropped.
    pub fn set_target(&mut self, target: Option<Entity>) {
        if self.target != target {
            self.smoothing.reset();
        }
        self.target = target;
    }

    /// Height above the target's origin the rig sits at.
    pub fn set_eye_height(&mut self, height: f32) {
        self.eye_height = height;
    }

    /// Extra world-space offset added after the eye height.
    pub fn set_eye_offset(&mut self, offset: Vec3) {
        self.eye_offset = offset;
    }

    /// Degrees per pointer unit for yaw and pitch.
    pub fn set_sensitivity(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal_sensitivity = horizontal;
        self.vertical_sensitivity = vertical;
    }

    /// Set the pitch limits in degrees. Reversed bounds are swapped and the
    /// current pitch is clamped into the new range.
    pub fn set_vertical_range(&mut self, min: f32, max: f32) {
        self.min_vertical_angle = min.min(max);
        self.max_vertical_angle = max.max(min);
        self.vertical_angle = self.clamp_vertical(self.vertical_angle);
    }

    /// `(min, max)` pitch limits in degrees.
    #[must_use]
    pub fn vertical_range(&self) -> (f32, f32) {
        (self.min_vertical_angle, self.max_vertical_angle)
    }

    /// Point the rig at yaw 0, pitch 0.
    pub fn reset_angles(&mut self) {
        self.horizontal_angle = 0.0;
        self.vertical_angle = self.clamp_vertical(0.0);
    }

    /// Overwrite both angles, enforcing the wrap and clamp invariants.
    pub fn set_angles(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal_angle = wrap_degrees(horizontal);
        self.vertical_angle = self.clamp_vertical(vertical);
    }

    /// Yaw in degrees, `[0, 360)`, positive turns right.
    #[must_use]
    pub fn horizontal_angle(&self) -> f32 {
        self.horizontal_angle
    }

    /// Pitch in degrees, positive looks down.
    #[must_use]
    pub fn vertical_angle(&self) -> f32 {
        self.vertical_angle
    }

    /// Current cursor capture state.
    #[must_use]
    pub fn lock_state(&self) -> CursorLock {
        self.lock
    }

    /// `true` while the cursor is captured and look input applies.
    #[must_use]
    pub fn is_cursor_locked(&self) -> bool {
        self.lock == CursorLock::Locked
    }

    /// Look delta recorded for this frame (zero while unlocked).
    #[must_use]
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    fn clamp_vertical(&self, angle: f32) -> f32 {
        let angle = if angle.is_nan() { 0.0 } else { angle };
        angle.clamp(self.min_vertical_angle, self.max_vertical_angle)
    }

    /// Integrate a pointer delta (y up) into the angles.
    pub fn apply_look(&mut self, delta: Vec2) {
        self.horizontal_angle = wrap_degrees(self.horizontal_angle + delta.x * self.horizontal_sensitivity);
        self.vertical_angle = self.clamp_vertical(self.vertical_angle - delta.y * self.vertical_sensitivity);
    }

    /// Orientation built from the angles: yaw about +Y, then pitch, no roll.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            -self.horizontal_angle.to_radians(),
            -self.vertical_angle.to_radians(),
            0.0,
        )
    }

    /// Seed the angles from an existing orientation.
    pub fn seed_from_rotation(&mut self, rotation: Quat) {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        self.set_angles(-yaw.to_degrees(), -pitch.to_degrees());
    }

    /// Where the rig wants to be: target plus eye height and offset, with
    /// disabled axes pinned to `current`.
    #[must_use]
    pub fn desired_position(&self, target: Vec3, current: Vec3) -> Vec3 {
        let desired = target + Vec3::Y * self.eye_height + self.eye_offset;
        Vec3::select(self.follow_axes, desired, current)
    }

    /// Advance the smoothed follow by `dt` and return the new position.
    pub fn follow(&mut self, current: Vec3, target: Vec3, dt: f32) -> Vec3 {
        let desired = self.desired_position(target, current);
        let smooth_time = 1.0 / self.follow_speed.max(f32::EPSILON);
        self.smoothing.step(current, desired, smooth_time, dt)
    }

    /// Change the lock state. Returns `true` if it changed.
    pub fn set_lock(&mut self, lock: CursorLock) -> bool {
        let changed = self.lock != lock;
        self.lock = lock;
        if lock == CursorLock::Unlocked {
            self.look_delta = Vec2::ZERO;
        }
        changed
    }
}

/// Hide and capture the cursor, or free and show it.
pub fn apply_cursor(window: &mut Window, lock: CursorLock) {
    match lock {
        CursorLock::Locked => {
            window.cursor.grab_mode = CursorGrabMode::Locked;
            window.cursor.visible = false;
        }
        CursorLock::Unlocked => {
            window.cursor.grab_mode = CursorGrabMode::None;
            window.cursor.visible = true;
        }
    }
}

/// Initialise rigs the first frame they exist.
#[allow(clippy::needless_pass_by_value)]
pub fn activate_camera_rigs(
    mut rigs: Query<(&Transform, &mut CameraRig), Added<CameraRig>>,
    players: Query<Entity, With<Player>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    for (tf, mut rig) in &mut rigs {
        rig.seed_from_rotation(tf.rotation);

        if rig.target.is_none() {
            match players.iter().next() {
                Some(player) => {
                    rig.target = Some(player);
                    info!("camera rig following player {player:?}");
                }
                None => warn!("camera rig has no target and no Player was found"),
            }
        }

        let initial = if rig.lock_on_start { CursorLock::Locked } else { CursorLock::Unlocked };
        rig.set_lock(initial);
        if let Ok(mut window) = windows.get_single_mut() {
            apply_cursor(&mut window, initial);
        }
        debug!(
            "camera rig active: yaw {:.1}, pitch {:.1}, {:?}",
            rig.horizontal_angle(),
            rig.vertical_angle(),
            initial
        );
    }
}

/// Step the lock state machine for every rig and mirror it onto the cursor.
#[allow(clippy::needless_pass_by_value)]
pub fn cursor_lock(
    kb: Res<ButtonInput<KeyCode>>,
    mb: Res<ButtonInput<MouseButton>>,
    settings: Res<Settings>,
    mut focus: EventReader<WindowFocused>,
    mut rigs: Query<&mut CameraRig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let toggle = kb.just_pressed(settings.controls.key("release_cursor", KeyCode::Escape));
    let grab = mb.just_pressed(MouseButton::Left);
    let focus_lost = focus.read().any(|ev| !ev.focused);

    for mut rig in &mut rigs {
        let next = rig.lock_state().step(toggle, grab, focus_lost);
        if rig.set_lock(next) {
            info!("cursor {}", if next == CursorLock::Locked { "locked" } else { "unlocked" });
            if let Ok(mut window) = windows.get_single_mut() {
                apply_cursor(&mut window, next);
            }
        }
    }
}

/// Record this frame's pointer delta on every locked rig.
#[allow(clippy::needless_pass_by_value)]
pub fn look_input(
    mut motion: EventReader<MouseMotion>,
    settings: Res<Settings>,
    mut rigs: Query<&mut CameraRig>,
) {
    let mut delta = Vec2::ZERO;
    for ev in motion.read() {
        // screen space grows downward; look deltas are y-up
        let mut axis = Vec2::new(ev.delta.x, -ev.delta.y);
        if settings.controls.invert_x { axis.x = -axis.x; }
        if settings.controls.invert_y { axis.y = -axis.y; }
        delta += axis;
    }
    if delta.length() < LOOK_DEAD_ZONE {
        delta = Vec2::ZERO;
    }

    for mut rig in &mut rigs {
        rig.look_delta = if rig.is_cursor_locked() { delta } else { Vec2::ZERO };
    }
}

/// Apply look and follow the target.
///
/// Targets are read through their local `Transform`, so they are expected to
/// be root entities. Rigs without a live target are left untouched.
#[allow(clippy::needless_pass_by_value)]
pub fn follow_target(
    time: Res<Time>,
    mut rigs: Query<(&mut Transform, &mut CameraRig)>,
    targets: Query<&Transform, Without<CameraRig>>,
) {
    let dt = time.delta_seconds();
    for (mut tf, mut rig) in &mut rigs {
        let Some(target) = rig.target.and_then(|e| targets.get(e).ok()) else { continue };

        let delta = rig.look_delta;
        if rig.is_cursor_locked() && delta != Vec2::ZERO {
            rig.apply_look(delta);
            trace!("camera yaw {:.1}, pitch {:.1}", rig.horizontal_angle(), rig.vertical_angle());
        }

        tf.translation = rig.follow(tf.translation, target.translation, dt);
        tf.rotation = rig.rotation();
    }
}

/// Free the cursor when a rig goes away.
pub fn release_cursor_on_removal(
    mut removed: RemovedComponents<CameraRig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if removed.read().next().is_some()
        && let Ok(mut window) = windows.get_single_mut()
    {
        apply_cursor(&mut window, CursorLock::Unlocked);
    }
}

/// Push camera tuning from `Settings` into live rigs when it changes.
#[allow(clippy::needless_pass_by_value)]
pub fn sync_camera_settings(
    settings: Res<Settings>,
    mut rigs: Query<&mut CameraRig>,
    mut last: Local<Option<CameraSettings>>,
) {
    let s = &settings.camera;
    if last.as_ref() == Some(s) {
        return;
    }
    // first run only records the baseline; spawned rigs already match it
    if last.is_some() {
        for mut rig in &mut rigs {
            rig.set_eye_height(s.eye_height);
            rig.set_eye_offset(s.eye_offset);
            rig.follow_speed = s.follow_speed;
            rig.set_sensitivity(s.horizontal_sensitivity, s.vertical_sensitivity);
            rig.set_vertical_range(s.min_vertical_angle, s.max_vertical_angle);
            rig.follow_axes = BVec3::new(s.follow_x, s.follow_y, s.follow_z);
        }
    }
    *last = Some(s.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn vertical_angle_stays_clamped() {
        let mut rig = CameraRig::default();
        rig.set_vertical_range(-60.0, 75.0);
        for dy in [-1000.0, 3.0, 500.0, -0.5, f32::MAX, -f32::MAX] {
            rig.apply_look(Vec2::new(0.0, dy));
            let v = rig.vertical_angle();
            assert!((-60.0..=75.0).contains(&v), "{v} after dy {dy}");
        }
    }

    #[test]
    fn horizontal_angle_stays_wrapped() {
        let mut rig = CameraRig::default();
        for dx in [10.0, -25.0, 1800.0, -1e-7, -359.99, 720.0, 1e-7] {
            rig.apply_look(Vec2::new(dx, 0.0));
            let h = rig.horizontal_angle();
            assert!((0.0..360.0).contains(&h), "{h} after dx {dx}");
        }
        assert_eq!(wrap_degrees(-1e-7), 0.0);
        assert_eq!(wrap_degrees(-90.0), 270.0);
    }

    #[test]
    fn look_follows_pointer_direction() {
        let mut rig = CameraRig::default();
        rig.set_sensitivity(2.0, 3.0);
        rig.apply_look(Vec2::new(5.0, 2.0));
        assert_eq!(rig.horizontal_angle(), 10.0);
        assert_eq!(rig.vertical_angle(), -6.0);
    }

    #[test]
    fn reversed_range_is_normalised() {
        let mut rig = CameraRig::default();
        rig.set_vertical_range(45.0, -45.0);
        assert_eq!(rig.vertical_range(), (-45.0, 45.0));
    }

    #[test]
    fn rotation_matches_angles() {
        let mut rig = CameraRig::default();
        rig.set_angles(90.0, 0.0);
        // yaw right by 90 degrees faces +X
        let fwd = rig.rotation() * Vec3::NEG_Z;
        assert!((fwd - Vec3::X).length() < 1e-5, "{fwd}");

        rig.set_angles(0.0, 45.0);
        let fwd = rig.rotation() * Vec3::NEG_Z;
        assert!(fwd.y < 0.0, "positive pitch looks down");
    }

    #[test]
    fn seeds_angles_from_rotation() {
        let mut rig = CameraRig::default();
        rig.set_angles(30.0, 10.0);
        let rotation = rig.rotation();

        let mut fresh = CameraRig::default();
        fresh.seed_from_rotation(rotation);
        assert!((fresh.horizontal_angle() - 30.0).abs() < 1e-3);
        assert!((fresh.vertical_angle() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn frozen_axes_keep_current_coordinate() {
        let mut rig = CameraRig::default();
        rig.follow_axes = BVec3::new(true, false, true);
        rig.set_eye_offset(Vec3::new(0.5, 0.0, 0.0));
        let desired = rig.desired_position(Vec3::new(1.0, 0.0, 2.0), Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(desired, Vec3::new(1.5, 9.0, 2.0));
    }

    #[test]
    fn lock_toggles_from_lock_on_start() {
        let mut state = CursorLock::Locked;
        state = state.step(true, false, false);
        assert_eq!(state, CursorLock::Unlocked);
        state = state.step(true, false, false);
        assert_eq!(state, CursorLock::Locked);
    }

    #[test]
    fn click_captures_and_focus_loss_releases() {
        assert_eq!(CursorLock::Unlocked.step(false, true, false), CursorLock::Locked);
        assert_eq!(CursorLock::Locked.step(false, true, false), CursorLock::Locked);
        assert_eq!(CursorLock::Locked.step(false, false, true), CursorLock::Unlocked);
        assert_eq!(CursorLock::Unlocked.step(false, false, true), CursorLock::Unlocked);
    }

    fn rig_world() -> (World, Schedule) {
        let mut world = World::new();
        world.insert_resource(Settings::default());
        world.insert_resource(ButtonInput::<KeyCode>::default());
        world.insert_resource(ButtonInput::<MouseButton>::default());
        world.init_resource::<Events<WindowFocused>>();
        world.init_resource::<Events<MouseMotion>>();
        world.spawn((Window::default(), PrimaryWindow));

        let mut schedule = Schedule::default();
        schedule.add_systems((activate_camera_rigs, cursor_lock, look_input).chain());
        (world, schedule)
    }

    fn primary_window(world: &mut World) -> Window {
        world
            .query_filtered::<&Window, With<PrimaryWindow>>()
            .single(world)
            .clone()
    }

    #[test]
    fn escape_toggles_lock_and_cursor() {
        let (mut world, mut schedule) = rig_world();
        let rig = world.spawn((Transform::default(), CameraRig::default())).id();

        schedule.run(&mut world);
        assert!(world.get::<CameraRig>(rig).unwrap().is_cursor_locked());
        assert!(!primary_window(&mut world).cursor.visible);

        world.resource_mut::<ButtonInput<KeyCode>>().press(KeyCode::Escape);
        schedule.run(&mut world);
        assert_eq!(world.get::<CameraRig>(rig).unwrap().lock_state(), CursorLock::Unlocked);
        let window = primary_window(&mut world);
        assert!(window.cursor.visible);
        assert_eq!(window.cursor.grab_mode, CursorGrabMode::None);

        // still held: no new edge
        world.resource_mut::<ButtonInput<KeyCode>>().clear();
        schedule.run(&mut world);
        assert_eq!(world.get::<CameraRig>(rig).unwrap().lock_state(), CursorLock::Unlocked);

        {
            let mut kb = world.resource_mut::<ButtonInput<KeyCode>>();
            kb.release(KeyCode::Escape);
            kb.clear();
            kb.press(KeyCode::Escape);
        }
        schedule.run(&mut world);
        assert_eq!(world.get::<CameraRig>(rig).unwrap().lock_state(), CursorLock::Locked);
    }

    #[test]
    fn pointer_motion_is_ignored_while_unlocked() {
        let (mut world, mut schedule) = rig_world();
        let mut unlocked = CameraRig::default();
        unlocked.lock_on_start = false;
        let idle = world.spawn((Transform::default(), unlocked)).id();
        let active = world.spawn((Transform::default(), CameraRig::default())).id();

        world.send_event(MouseMotion { delta: Vec2::new(4.0, -2.0) });
        schedule.run(&mut world);

        assert_eq!(world.get::<CameraRig>(idle).unwrap().look_delta(), Vec2::ZERO);
        assert_eq!(world.get::<CameraRig>(active).unwrap().look_delta(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn follow_is_skipped_without_target() {
        let mut world = World::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 60.0));
        world.insert_resource(time);

        let start = Transform::from_xyz(1.0, 2.0, 3.0);
        let mut rig = CameraRig::default();
        rig.set_lock(CursorLock::Locked);
        rig.look_delta = Vec2::new(50.0, 0.0);
        let cam = world.spawn((start, rig)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(follow_target);
        schedule.run(&mut world);

        assert_eq!(*world.get::<Transform>(cam).unwrap(), start);
        assert_eq!(world.get::<CameraRig>(cam).unwrap().horizontal_angle(), 0.0);
    }

    #[test]
    fn follow_moves_toward_eye_point() {
        let mut world = World::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs_f32(1.0 / 60.0));
        world.insert_resource(time);

        let player = world.spawn(Transform::from_xyz(0.0, 0.0, -10.0)).id();
        let cam = world
            .spawn((Transform::default(), CameraRig::default().with_target(player)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(follow_target);

        let eye = Vec3::new(0.0, 1.6, -10.0);
        let mut last = eye.length();
        for _ in 0..5 {
            schedule.run(&mut world);
            let d = world.get::<Transform>(cam).unwrap().translation.distance(eye);
            assert!(d < last);
            last = d;
        }
    }
    #[test]
    fn retargeting_drops_follow_velocity() {
        let mut rig = CameraRig::default();
        let first = Entity::from_raw(1);
        rig.set_target(Some(first));
        rig.follow(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0), 1.0 / 60.0);
        assert_ne!(rig.smoothing.velocity, Vec3::ZERO);

        rig.set_target(Some(first));
        assert_ne!(rig.smoothing.velocity, Vec3::ZERO);

        rig.set_target(Some(Entity::from_raw(2)));
        assert_eq!(rig.smoothing.velocity, Vec3::ZERO);
    }

    #[test]
    fn activation_targets_the_player() {
        let (mut world, mut schedule) = rig_world();
        let player = world.spawn((Transform::default(), Player)).id();
        let other = world.spawn(Transform::default()).id();
        let found = world.spawn((Transform::default(), CameraRig::default())).id();
        let preset = world
            .spawn((Transform::default(), CameraRig::default().with_target(other)))
            .id();

        schedule.run(&mut world);

        assert_eq!(world.get::<CameraRig>(found).unwrap().target, Some(player));
        assert_eq!(world.get::<CameraRig>(preset).unwrap().target, Some(other));
    }

    #[test]
    fn losing_focus_releases_the_cursor() {
        let (mut world, mut schedule) = rig_world();
        let rig = world.spawn((Transform::default(), CameraRig::default())).id();
        schedule.run(&mut world);
        assert!(world.get::<CameraRig>(rig).unwrap().is_cursor_locked());

        let window = world.query_filtered::<Entity, With<PrimaryWindow>>().single(&world);
        world.send_event(WindowFocused { window, focused: false });
        schedule.run(&mut world);

        assert_eq!(world.get::<CameraRig>(rig).unwrap().lock_state(), CursorLock::Unlocked);
        let window = primary_window(&mut world);
        assert!(window.cursor.visible);
        assert_eq!(window.cursor.grab_mode, CursorGrabMode::None);
    }

    #[test]
    fn removing_the_rig_frees_the_cursor() {
        let (mut world, mut schedule) = rig_world();
        let rig = world.spawn((Transform::default(), CameraRig::default())).id();
        schedule.run(&mut world);
        assert!(!primary_window(&mut world).cursor.visible);

        world.entity_mut(rig).remove::<CameraRig>();
        let mut cleanup = Schedule::default();
        cleanup.add_systems(release_cursor_on_removal);
        cleanup.run(&mut world);

        let window = primary_window(&mut world);
        assert!(window.cursor.visible);
        assert_eq!(window.cursor.grab_mode, CursorGrabMode::None);
    }

    #[test]
    fn settings_changes_reach_live_rigs() {
        let mut world = World::new();
        world.insert_resource(Settings::default());
        let mut tuned = CameraRig::default();
        tuned.set_sensitivity(1.0, 1.0);
        let rig = world.spawn(tuned).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(sync_camera_settings);
        schedule.run(&mut world);
        // unchanged settings leave per-rig tuning alone
        assert_eq!(world.get::<CameraRig>(rig).unwrap().horizontal_sensitivity, 1.0);

        {
            let mut settings = world.resource_mut::<Settings>();
            settings.camera.eye_height = 2.0;
            settings.camera.follow_speed = 3.0;
            settings.camera.min_vertical_angle = -30.0;
            settings.camera.follow_y = false;
        }
        schedule.run(&mut world);

        let rig = world.get::<CameraRig>(rig).unwrap();
        assert_eq!(rig.eye_height, 2.0);
        assert_eq!(rig.follow_speed, 3.0);
        assert_eq!(rig.horizontal_sensitivity, 0.2);
        assert_eq!(rig.vertical_range(), (-30.0, 90.0));
        assert_eq!(rig.follow_axes, BVec3::new(true, false, true));
    }
}
