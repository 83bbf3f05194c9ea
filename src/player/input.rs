//! Directional input for the locomotion controller.
//!
//! Keys and analog sticks feed the same contract: a 2D axis with each
//! component in `[-1, 1]` (x = strafe right, y = forward) plus the jump rising
//! edge for this frame. The source is picked per body by [`InputScheme`].

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::settings::{ControlsSettings, InputScheme};

/// One frame of directional input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    pub axis: Vec2,
    /// Jump went from released to pressed this frame.
    pub jump_pressed: bool,
}

/// Keys resolved from `controls.keybinds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: KeyCode,
    pub back: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub jump: KeyCode,
}

impl MoveKeys {
    #[must_use]
    pub fn from_controls(controls: &ControlsSettings) -> Self {
        Self {
            forward: controls.key("forward", KeyCode::KeyW),
            back: controls.key("back", KeyCode::KeyS),
            left: controls.key("left", KeyCode::KeyA),
            right: controls.key("right", KeyCode::KeyD),
            jump: controls.key("jump", KeyCode::Space),
        }
    }
}

impl Default for MoveKeys {
    fn default() -> Self {
        Self::from_controls(&ControlsSettings::default())
    }
}

/// Held keys to unit axis contributions. Opposite keys cancel.
#[must_use]
pub fn axis_from_keys(kb: &ButtonInput<KeyCode>, keys: &MoveKeys) -> Vec2 {
    let held = |k: KeyCode| if kb.pressed(k) { 1.0 } else { 0.0 };
    Vec2::new(held(keys.right) - held(keys.left), held(keys.forward) - held(keys.back))
}

/// Raw stick values to an axis, zeroed inside the dead zone and capped at unit length.
#[must_use]
pub fn axis_from_stick(x: f32, y: f32, dead_zone: f32) -> Vec2 {
    let raw = Vec2::new(x, y);
    if raw.length() < dead_zone {
        return Vec2::ZERO;
    }
    raw.clamp_length_max(1.0)
}

/// Everything needed to sample either input scheme.
///
/// Gamepad resources are optional; without them the gamepad scheme reads as idle.
#[derive(SystemParam)]
pub struct DirectionalInput<'w> {
    keys: Res<'w, ButtonInput<KeyCode>>,
    gamepads: Option<Res<'w, Gamepads>>,
    sticks: Option<Res<'w, Axis<GamepadAxis>>>,
    pad_buttons: Option<Res<'w, ButtonInput<GamepadButton>>>,
}

impl DirectionalInput<'_> {
    pub fn sample(&self, scheme: InputScheme, keys: &MoveKeys, dead_zone: f32) -> MoveIntent {
        match scheme {
            InputScheme::Keys => MoveIntent {
                axis: axis_from_keys(&self.keys, keys),
                jump_pressed: self.keys.just_pressed(keys.jump),
            },
            InputScheme::Gamepad => self.sample_gamepad(dead_zone),
        }
    }

    fn sample_gamepad(&self, dead_zone: f32) -> MoveIntent {
        let (Some(gamepads), Some(sticks), Some(buttons)) = (&self.gamepads, &self.sticks, &self.pad_buttons) else {
            return MoveIntent::default();
        };
        // first connected pad drives the body
        let Some(pad) = gamepads.iter().next() else {
            return MoveIntent::default();
        };

        let read = |kind| sticks.get(GamepadAxis::new(pad, kind)).unwrap_or(0.0);
        MoveIntent {
            axis: axis_from_stick(read(GamepadAxisType::LeftStickX), read(GamepadAxisType::LeftStickY), dead_zone),
            jump_pressed: buttons.just_pressed(GamepadButton::new(pad, GamepadButtonType::South)),
        }
    }
}
