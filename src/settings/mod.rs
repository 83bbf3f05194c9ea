//! Settings, types and defaults.
//!
//! Settings are stored as a RON file under `data/settings/` and are
//! hot-reloadable through [`loader::check_settings_changes`]. Every field has a
//! default, so a partial file only overrides what it names.
use bevy::prelude::{KeyCode, Resource, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Controls / input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    pub invert_y: bool, // Invert mouse Y axis
    pub invert_x: bool, // Invert mouse X axis
    pub keybinds: HashMap<String, String>, // Action name -> key identifier
}

impl ControlsSettings {
    fn default_keybinds() -> HashMap<String, String> {
        [
            ("forward", "W"),
            ("back", "S"),
            ("left", "A"),
            ("right", "D"),
            ("jump", "Space"),
            ("release_cursor", "Escape"),
            ("toggle_gizmos", "F1"),
        ]
        .into_iter()
        .map(|(action, key)| (action.to_string(), key.to_string()))
        .collect()
    }

    /// Resolve the key bound to `action`, falling back to `default` when the
    /// action is unbound or names an unknown key.
    #[must_use]
    pub fn key(&self, action: &str, default: KeyCode) -> KeyCode {
        self.keybinds
            .get(action)
            .and_then(|s| Settings::keycode_from_str(s))
            .unwrap_or(default)
    }
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            invert_y: false,
            invert_x: false,
            keybinds: Self::default_keybinds(),
        }
    }
}

/// Defaults for newly spawned camera rigs, and live tuning pushed into
/// existing rigs when the file changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub eye_height: f32,
    pub eye_offset: Vec3,
    /// Higher follows tighter; the smoothing time is `1 / follow_speed`.
    pub follow_speed: f32,
    /// Degrees per pointer unit.
    pub horizontal_sensitivity: f32,
    pub vertical_sensitivity: f32,
    pub min_vertical_angle: f32,
    pub max_vertical_angle: f32,
    pub lock_on_start: bool,
    pub follow_x: bool,
    pub follow_y: bool,
    pub follow_z: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            eye_height: 1.6,
            eye_offset: Vec3::ZERO,
            follow_speed: 10.0,
            horizontal_sensitivity: 0.2,
            vertical_sensitivity: 0.2,
            min_vertical_angle: -90.0,
            max_vertical_angle: 90.0,
            lock_on_start: true,
            follow_x: true,
            follow_y: true,
            follow_z: true,
        }
    }
}

/// Which device feeds the locomotion controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputScheme {
    #[default]
    Keys,
    Gamepad,
}

/// Which tick applies movement velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    /// Every rendered frame (`Update`).
    Frame,
    /// Every physics step (`FixedUpdate`).
    #[default]
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionSettings {
    pub move_speed: f32,
    pub jump_impulse: f32,
    pub ground_check_radius: f32,
    /// Collision layer bits the ground probe tests against.
    pub ground_mask: u32,
    pub input: InputScheme,
    pub step: StepMode,
    /// Analog stick values below this magnitude read as zero.
    pub stick_dead_zone: f32,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_impulse: 8.0,
            ground_check_radius: 0.3,
            ground_mask: 1,
            input: InputScheme::Keys,
            step: StepMode::Fixed,
            stick_dead_zone: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub gravity: f32,
    /// Fall speed cap, in units per second.
    pub terminal_speed: f32,
    /// Physics steps per second.
    pub fixed_hz: f64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            terminal_speed: 50.0,
            fixed_hz: 50.0,
        }
    }
}

/// Top-level Settings
#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub controls: ControlsSettings,
    pub camera: CameraSettings,
    pub locomotion: LocomotionSettings,
    pub physics: PhysicsSettings,
}

impl Settings {
    /// Convert a key identifier from `controls.keybinds` (e.g. "W", "Space",
    /// "F1", "LShift") into a `KeyCode`. Case-insensitive.
    #[must_use]
    pub fn keycode_from_str(name: &str) -> Option<KeyCode> {
        const LETTERS: [KeyCode; 26] = [
            KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
            KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
            KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
            KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
            KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
            KeyCode::KeyZ,
        ];
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
            KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
        ];
        const FUNCTION: [KeyCode; 12] = [
            KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
            KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
        ];

        let s = name.trim().to_ascii_uppercase();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_uppercase() {
                return Some(LETTERS[(c as u8 - b'A') as usize]);
            }
            if c.is_ascii_digit() {
                return Some(DIGITS[(c as u8 - b'0') as usize]);
            }
        }

        if let Some(n) = s.strip_prefix('F').and_then(|n| n.parse::<usize>().ok()) {
            return (1..=FUNCTION.len()).contains(&n).then(|| FUNCTION[n - 1]);
        }

        Some(match s.as_str() {
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "SPACE" => KeyCode::Space,
            "TAB" => KeyCode::Tab,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "BACKSPACE" => KeyCode::Backspace,
            "LSHIFT" | "SHIFT" => KeyCode::ShiftLeft,
            "RSHIFT" => KeyCode::ShiftRight,
            "LCTRL" | "CTRL" => KeyCode::ControlLeft,
            "RCTRL" => KeyCode::ControlRight,
            "LALT" | "ALT" => KeyCode::AltLeft,
            "RALT" => KeyCode::AltRight,
            _ => return None,
        })
    }
}

pub mod loader;
