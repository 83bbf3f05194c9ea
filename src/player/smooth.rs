//! Critically-damped position smoothing with velocity memory.
//!
//! `SmoothDamp` integrates a critically damped spring toward a moving goal. The
//! velocity it carries between calls is what makes consecutive frames join
//! smoothly and the result independent of frame rate.

use bevy::math::Vec3;

/// Smoothing times below this are treated as this value.
pub const MIN_SMOOTH_TIME: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothDamp {
    /// Velocity carried over from the previous step, in units per second.
    pub velocity: Vec3,
}

impl SmoothDamp {
    /// Move `current` toward `target` for `dt` seconds and return the new
    /// position. `smooth_time` is roughly the time to cover most of the gap.
    ///
    /// The result never passes the target: if a step would overshoot it lands
    /// on the target and the carried velocity is cleared.
    pub fn step(&mut self, current: Vec3, target: Vec3, smooth_time: f32, dt: f32) -> Vec3 {
        if dt <= 0.0 {
            return current;
        }
        let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;

        // Pade-style approximation of exp(-omega * dt)
        let x = omega * dt;
        let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

        let change = current - target;
        let temp = (self.velocity + omega * change) * dt;
        self.velocity = (self.velocity - omega * temp) * decay;
        let output = target + (change + temp) * decay;

        if (target - current).dot(output - target) > 0.0 {
            self.velocity = Vec3::ZERO;
            return target;
        }
        output
    }

    /// Forget the carried velocity, e.g. when the goal jumps elsewhere.
    pub fn reset(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn converges_with_strictly_shrinking_distance() {
        let mut damp = SmoothDamp::default();
        let target = Vec3::new(3.0, 1.6, -4.0);
        let mut pos = Vec3::ZERO;
        let mut last = pos.distance(target);

        for _ in 0..600 {
            pos = damp.step(pos, target, 0.1, DT);
            let d = pos.distance(target);
            if last < 1e-4 {
                break;
            }
            assert!(d < last, "distance grew from {last} to {d}");
            last = d;
        }
        assert!(last < 1e-3, "did not converge: {last}");
    }

    #[test]
    fn never_passes_the_target() {
        let mut damp = SmoothDamp::default();
        let target = Vec3::X * 10.0;
        let mut pos = Vec3::ZERO;
        // large steps relative to the smoothing time
        for _ in 0..50 {
            pos = damp.step(pos, target, 0.05, 0.2);
            assert!(pos.x <= target.x);
        }
    }

    #[test]
    fn carries_velocity_between_calls() {
        let target = Vec3::new(0.0, 0.0, 5.0);
        let mut warm = SmoothDamp::default();
        let p1 = warm.step(Vec3::ZERO, target, 0.3, DT);
        assert!(warm.velocity.z > 0.0);

        let mut cold = SmoothDamp::default();
        let from_warm = warm.step(p1, target, 0.3, DT);
        let from_cold = cold.step(p1, target, 0.3, DT);
        assert!(from_warm.z > from_cold.z);
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut damp = SmoothDamp { velocity: Vec3::ONE };
        let pos = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(damp.step(pos, Vec3::ZERO, 0.1, 0.0), pos);
        assert_eq!(damp.velocity, Vec3::ONE);
    }

    #[test]
    fn roughly_frame_rate_independent() {
        let target = Vec3::X * 2.0;
        let mut coarse = SmoothDamp::default();
        let mut fine = SmoothDamp::default();
        let mut a = Vec3::ZERO;
        let mut b = Vec3::ZERO;
        for _ in 0..30 {
            a = coarse.step(a, target, 0.25, 1.0 / 30.0);
        }
        for _ in 0..120 {
            b = fine.step(b, target, 0.25, 1.0 / 120.0);
        }
        assert!((a - b).length() < 0.02, "{a} vs {b}");
    }
}
