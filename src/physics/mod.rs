//! Minimal rigid-body stand-in: gravity, a terminal fall speed, impulses and
//! box-vs-box push-out against static colliders.
//!
//! This is not an accurate simulation. It gives the locomotion controller a
//! body with velocity and mass, and gives the ground probe something to hit.
//! Register [`PhysicsPlugin`] to step bodies in `FixedUpdate`.

pub mod collider;

use bevy::prelude::*;

pub use collider::*;

use crate::settings::{PhysicsSettings, Settings};

/// A body whose linear velocity can be read, overwritten and kicked.
pub trait PhysicsBody {
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    /// Instantaneous change of momentum; velocity changes by `impulse / mass`.
    fn apply_impulse(&mut self, impulse: Vec3);
}

/// Simulated body. Pair with a [`Collider`] to collide with static geometry.
#[derive(Component, Debug, Clone)]
pub struct RigidBody {
    /// World units per second.
    pub velocity: Vec3,
    pub mass: f32,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }
}

impl PhysicsBody for RigidBody {
    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhysicsSet;

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Settings>()
            .add_systems(FixedUpdate, integrate_bodies.in_set(PhysicsSet))
            .add_systems(Update, sync_fixed_rate);
    }
}

/// Advance one body by `dt`: gravity, terminal speed, translation, then
/// push-out from every static box it ended up inside.
///
/// Extracted from the system so tests and benchmarks run identical logic.
pub fn step_body(
    position: &mut Vec3,
    body: &mut RigidBody,
    collider: Option<&Collider>,
    statics: impl IntoIterator<Item = BoxBounds>,
    physics: &PhysicsSettings,
    dt: f32,
) {
    body.velocity.y = (body.velocity.y + physics.gravity * dt).max(-physics.terminal_speed);
    *position += body.velocity * dt;

    let Some(collider) = collider else { return };
    for other in statics {
        let Some(push) = collider.bounds_at(*position).push_out_of(&other) else { continue };
        *position += push;
        // kill the velocity component driving into the surface
        for axis in 0..3 {
            if push[axis] != 0.0 && body.velocity[axis] * push[axis] < 0.0 {
                body.velocity[axis] = 0.0;
            }
        }
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn integrate_bodies(
    time: Res<Time>,
    settings: Res<Settings>,
    statics: StaticColliders,
    mut bodies: Query<(&mut Transform, &mut RigidBody, Option<&Collider>)>,
) {
    let dt = time.delta_seconds();
    if dt <= 0.0 {
        return;
    }
    let solids: Vec<BoxBounds> = statics.bounds().collect();

    for (mut tf, mut body, collider) in &mut bodies {
        let mut position = tf.translation;
        step_body(&mut position, &mut body, collider, solids.iter().copied(), &settings.physics, dt);
        tf.translation = position;
    }
}

/// Validate a configured physics rate.
///
/// # Arguments
/// * `hz` - steps per second as read from the settings file
///
/// # Returns
/// `hz` when it is finite and positive, otherwise the default rate (with a
/// warning). `Time<Fixed>` panics on zero, infinite or NaN rates.
#[must_use]
pub fn fixed_rate_hz(hz: f64) -> f64 {
    if hz.is_finite() && hz > 0.0 {
        hz
    } else {
        let fallback = PhysicsSettings::default().fixed_hz;
        warn!("invalid physics.fixed_hz {hz}, using {fallback}");
        fallback
    }
}

/// Keep the fixed timestep in line with `Settings.physics.fixed_hz`.
pub fn sync_fixed_rate(
    settings: Res<Settings>,
    mut fixed: ResMut<Time<Fixed>>,
    mut last: Local<Option<u64>>,
) {
    // compared bitwise so an invalid NaN setting is only reported once
    let raw = settings.physics.fixed_hz;
    if *last == Some(raw.to_bits()) {
        return;
    }
    fixed.set_timestep_hz(fixed_rate_hz(raw));
    *last = Some(raw.to_bits());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ground() -> BoxBounds {
        BoxBounds { min: Vec3::new(-50.0, -1.0, -50.0), max: Vec3::new(50.0, 0.0, 50.0) }
    }

    #[test]
    fn impulse_divides_by_mass() {
        let mut body = RigidBody { velocity: Vec3::new(1.0, 0.0, 0.0), mass: 2.0 };
        body.apply_impulse(Vec3::new(0.0, 8.0, 0.0));
        assert_eq!(body.velocity(), Vec3::new(1.0, 4.0, 0.0));
    }

    #[test]
    fn falling_is_capped_at_terminal_speed() {
        let physics = PhysicsSettings { terminal_speed: 3.0, ..Default::default() };
        let mut body = RigidBody::default();
        let mut position = Vec3::new(0.0, 100.0, 0.0);
        for _ in 0..200 {
            step_body(&mut position, &mut body, None, [], &physics, 1.0 / 50.0);
        }
        assert_eq!(body.velocity.y, -3.0);
    }

    #[test]
    fn body_comes_to_rest_on_ground() {
        let physics = PhysicsSettings::default();
        let collider = Collider::cuboid(Vec3::new(1.0, 2.0, 1.0), CollisionLayers::PLAYER);
        let mut body = RigidBody { velocity: Vec3::new(2.0, 0.0, 0.0), mass: 1.0 };
        let mut position = Vec3::new(0.0, 3.0, 0.0);

        for _ in 0..300 {
            step_body(&mut position, &mut body, Some(&collider), [ground()], &physics, 1.0 / 50.0);
        }

        // feet rest on the top face, within one step of gravity sink
        assert!((position.y - 1.0).abs() < 0.01, "y = {}", position.y);
        assert!(body.velocity.y.abs() < 1.0);
        // horizontal motion is not touched by the ground contact
        assert_eq!(body.velocity.x, 2.0);
    }

    #[test]
    fn unusable_rates_fall_back_to_default() {
        assert_eq!(fixed_rate_hz(60.0), 60.0);
        for hz in [0.0, -5.0, f64::INFINITY, f64::NAN] {
            assert_eq!(fixed_rate_hz(hz), 50.0, "{hz}");
        }
    }

    #[test]
    fn infinite_rate_from_file_keeps_default_timestep() {
        let settings: Settings = ::ron::from_str("(physics: (fixed_hz: inf))").unwrap();
        assert!(settings.physics.fixed_hz.is_infinite());

        let mut world = World::new();
        world.insert_resource(settings);
        world.insert_resource(Time::<Fixed>::from_hz(20.0));
        let mut schedule = Schedule::default();
        schedule.add_systems(sync_fixed_rate);
        schedule.run(&mut world);

        assert_eq!(world.resource::<Time<Fixed>>().timestep(), Duration::from_secs_f64(1.0 / 50.0));

        world.resource_mut::<Settings>().physics.fixed_hz = 25.0;
        schedule.run(&mut world);
        assert_eq!(world.resource::<Time<Fixed>>().timestep(), Duration::from_secs_f64(1.0 / 25.0));
    }
}
