//! Axis-aligned box colliders, layer masks and overlap queries.
//!
//! Colliders ignore rotation: a collider is a box of `half_extents` centred on
//! its entity's world translation.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::RigidBody;

/// Bit set of collision layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionLayers(pub u32);

impl CollisionLayers {
    pub const NONE: Self = Self(0);
    /// Level geometry.
    pub const GROUND: Self = Self(1);
    pub const PLAYER: Self = Self(1 << 1);

    #[must_use]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Collider {
    pub half_extents: Vec3,
    pub layers: CollisionLayers,
}

impl Collider {
    #[must_use]
    pub fn cuboid(size: Vec3, layers: CollisionLayers) -> Self {
        Self {
            half_extents: size * 0.5,
            layers,
        }
    }

    #[must_use]
    pub fn bounds_at(&self, center: Vec3) -> BoxBounds {
        BoxBounds {
            min: center - self.half_extents,
            max: center + self.half_extents,
        }
    }
}

/// World-space box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoxBounds {
    /// Whether a sphere touches or enters this box.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Smallest translation that moves `self` out of `other`, or `None` when
    /// they do not overlap. Touching faces do not count as overlap.
    #[must_use]
    pub fn push_out_of(&self, other: &BoxBounds) -> Option<Vec3> {
        let overlap = self.max.min(other.max) - self.min.max(other.min);
        if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
            return None;
        }

        let self_center = (self.min + self.max) * 0.5;
        let other_center = (other.min + other.max) * 0.5;
        let side = |axis: usize| if self_center[axis] < other_center[axis] { -1.0 } else { 1.0 };

        // resolve along the axis of least penetration
        let push = if overlap.x <= overlap.y && overlap.x <= overlap.z {
            Vec3::new(overlap.x * side(0), 0.0, 0.0)
        } else if overlap.y <= overlap.z {
            Vec3::new(0.0, overlap.y * side(1), 0.0)
        } else {
            Vec3::new(0.0, 0.0, overlap.z * side(2))
        };
        Some(push)
    }
}

/// "Is anything solid inside this sphere?" against a layer mask.
pub trait OverlapQuery {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: CollisionLayers) -> bool;
}

impl OverlapQuery for [(Collider, Vec3)] {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: CollisionLayers) -> bool {
        self.iter().any(|(collider, position)| {
            collider.layers.intersects(mask) && collider.bounds_at(*position).intersects_sphere(center, radius)
        })
    }
}

/// Colliders that do not belong to a simulated body.
#[derive(SystemParam)]
pub struct StaticColliders<'w, 's> {
    colliders: Query<'w, 's, (&'static Collider, &'static GlobalTransform), Without<RigidBody>>,
}

impl StaticColliders<'_, '_> {
    pub fn bounds(&self) -> impl Iterator<Item = BoxBounds> + '_ {
        self.colliders
            .iter()
            .map(|(collider, tf)| collider.bounds_at(tf.translation()))
    }
}

impl OverlapQuery for StaticColliders<'_, '_> {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: CollisionLayers) -> bool {
        self.colliders.iter().any(|(collider, tf)| {
            collider.layers.intersects(mask)
                && collider.bounds_at(tf.translation()).intersects_sphere(center, radius)
        })
    }
}
