//! Debug drawing for the ground probe (F1 by default).
//!
//! Each body's probe sphere is drawn green while grounded and red while
//! airborne.
use bevy::prelude::*;

use crate::player::LocomotionBody;
use crate::settings::Settings;

/// Whether probe gizmos are drawn.
#[derive(Resource, Debug, Default)]
pub struct ProbeGizmos(pub bool);

pub struct DebugGizmoPlugin;

impl Plugin for DebugGizmoPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProbeGizmos>()
            .add_systems(Update, (toggle_probe_gizmos, draw_ground_probes).chain());
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn toggle_probe_gizmos(
    kb: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut show: ResMut<ProbeGizmos>,
) {
    if kb.just_pressed(settings.controls.key("toggle_gizmos", KeyCode::F1)) {
        show.0 = !show.0;
        info!("ground probe gizmos {}", if show.0 { "on" } else { "off" });
    }
}

#[allow(clippy::needless_pass_by_value)]
pub fn draw_ground_probes(
    mut gizmos: Gizmos,
    show: Res<ProbeGizmos>,
    bodies: Query<&LocomotionBody>,
    probes: Query<&GlobalTransform>,
) {
    if !show.0 {
        return;
    }
    for body in &bodies {
        let Some(tf) = body.ground_check.and_then(|e| probes.get(e).ok()) else { continue };
        let color = if body.is_grounded() { Color::srgb(0.2, 0.9, 0.3) } else { Color::srgb(0.9, 0.2, 0.2) };
        gizmos.sphere(tf.translation(), Quat::IDENTITY, body.ground_check_radius, color);
    }
}
