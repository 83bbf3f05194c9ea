//! Settings loading and hot-reloading.
//!
//! Settings are loaded from RON files in the `data/settings` directory. If
//! several files are present the first one (by file name) that parses wins;
//! with none the defaults are used.
use crate::ron_loader::{load_ron_files, setup_ron_watcher, RonWatcher};
use crate::settings::Settings;
use bevy::log::info;
use bevy::prelude::{Res, ResMut, Resource};

pub const SETTINGS_DIR: &str = "data/settings";

/// Hot-reload watcher for the settings directory, plus the directory it reloads from.
#[derive(Resource)]
pub struct SettingsWatcher {
    pub watcher: RonWatcher,
    pub dir: String,
}

impl SettingsWatcher {
    #[must_use]
    pub fn stub() -> Self {
        SettingsWatcher {
            watcher: RonWatcher::stub(),
            dir: SETTINGS_DIR.to_string(),
        }
    }
}

/// Load settings from the `.ron` files in `path`.
///
/// # Example
/// ```no_run
/// let settings = parkour::settings::loader::load_settings_from_dir("data/settings");
/// ```
#[must_use]
pub fn load_settings_from_dir(path: &str) -> Settings {
    load_ron_files::<Settings>(path).into_iter().next().unwrap_or_default()
}

/// Create a watcher for the settings directory.
///
/// # Errors
/// Propagates the `notify::Error` raised when the directory cannot be watched.
pub fn setup_settings_watcher(path: &str) -> Result<SettingsWatcher, notify::Error> {
    setup_ron_watcher(path).map(|watcher| SettingsWatcher {
        watcher,
        dir: path.to_string(),
    })
}

/// Reload the `Settings` resource when a watched file changed.
#[allow(clippy::needless_pass_by_value)]
pub fn check_settings_changes(watcher: Res<SettingsWatcher>, mut settings: ResMut<Settings>) {
    if watcher.watcher.take_changed() {
        info!("settings changed, reloading from {}", watcher.dir);
        *settings = load_settings_from_dir(&watcher.dir);
    }
}
