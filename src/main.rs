//! Terraced hex terrain editor.
//!
//! Click a cell to apply the brush: number keys pick its color, arrow keys
//! its target elevation, Backspace makes it paint-only. WASD pans, the mouse
//! wheel zooms and Tab toggles the debug overlay.

use bevy::app::AppExit;
use bevy::picking::mesh_picking::MeshPickingPlugin;
use bevy::prelude::*;
#[cfg(feature = "native")]
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy_inspector_egui::quick::WorldInspectorPlugin;
#[cfg(feature = "native")]
use clap::Parser;

use hex_terraces::GameState;
use hex_terraces::camera::{CameraConfig, CameraPlugin};
use hex_terraces::terrain::{TerrainConfig, TerrainPlugin};

/// Command-line overrides for the terrain configuration.
#[cfg(feature = "native")]
#[derive(Parser, Debug)]
#[command(version, about = "Terraced hex terrain editor")]
struct Cli {
    /// Cells per row.
    #[arg(long)]
    width: Option<u32>,
    /// Number of rows.
    #[arg(long)]
    height: Option<u32>,
    /// Seed for both elevation and perturbation noise.
    #[arg(long)]
    seed: Option<u32>,
    /// Start with every cell at elevation 0.
    #[arg(long)]
    flat: bool,
    /// Disable vertex perturbation.
    #[arg(long)]
    no_perturb: bool,
}

#[cfg(feature = "native")]
impl Cli {
    fn apply(&self, cfg: &mut TerrainConfig) {
        if let Some(width) = self.width {
            cfg.grid.width = width;
        }
        if let Some(height) = self.height {
            cfg.grid.height = height;
        }
        if let Some(seed) = self.seed {
            cfg.grid.elevation.seed = seed;
            cfg.perturb_noise.seed = seed;
        }
        if self.flat {
            cfg.grid.elevation.enabled = false;
        }
        if self.no_perturb {
            cfg.metrics.perturb = false;
        }
    }
}

fn main() {
    #[allow(unused_mut)]
    let mut terrain = TerrainConfig::default();
    #[cfg(feature = "native")]
    Cli::parse().apply(&mut terrain);

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Terraces".into(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(MeshPickingPlugin)
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(TerrainPlugin(terrain))
    .add_plugins(CameraPlugin(CameraConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    #[cfg(feature = "native")]
    app.add_plugins((RemotePlugin::default(), RemoteHttpPlugin::default()));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        };
        info!("switching to {new_state:?}");
        next.set(new_state);
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
