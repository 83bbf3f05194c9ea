use bevy::diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use parkour::debug::DebugGizmoPlugin;
use parkour::physics::{fixed_rate_hz, PhysicsPlugin};
use parkour::player::PlayerPlugin;
use parkour::settings::loader::{self as settings_loader, SETTINGS_DIR};

mod app;

fn main() {
    let settings = settings_loader::load_settings_from_dir(SETTINGS_DIR);
    let settings_watcher = settings_loader::setup_settings_watcher(SETTINGS_DIR).unwrap_or_else(|e| {
        eprintln!("settings hot-reload disabled: {e}");
        settings_loader::SettingsWatcher::stub()
    });

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "parkour".into(),
                position: WindowPosition::Centered(MonitorSelection::Primary),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(FrameTimeDiagnosticsPlugin)
        .add_plugins(LogDiagnosticsPlugin::default())
        .add_plugins((PhysicsPlugin, PlayerPlugin, DebugGizmoPlugin));

    app.insert_resource(Time::<Fixed>::from_hz(fixed_rate_hz(settings.physics.fixed_hz)));
    app.insert_resource(settings);
    app.insert_resource(settings_watcher);

    app.add_systems(Startup, app::setup);
    app.add_systems(PreUpdate, settings_loader::check_settings_changes);

    app.run();
}
