//! Terrain plugin: builds the [`HexGrid`] resource, uploads its mesh, keeps
//! per-cell anchors in sync and turns pointer clicks into cell edits.

mod entities;
mod systems;

pub use entities::{Brush, CellAnchor, CellAnchors, TerrainMesh};

use bevy::prelude::*;

use crate::GameState;
use crate::hex_map::{GridSettings, HexGrid, HexMetrics};

/// Nested configuration for the terrain subsystem.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct TerrainConfig {
    /// Grid extents, default color and starting elevations.
    pub grid: GridSettings,
    /// Hexagon, terrace and perturbation geometry.
    pub metrics: HexMetrics,
    /// Noise driving vertex perturbation.
    pub perturb_noise: PerturbNoiseSettings,
    /// Brush colors, selected with the number keys.
    pub palette: Vec<Color>,
    /// Background clear color.
    pub clear_color: Color,
}

/// Tileable fractal noise parameters for vertex perturbation.
#[derive(Clone, Debug, Reflect)]
pub struct PerturbNoiseSettings {
    /// Seed of the first channel; the others use the following seeds.
    pub seed: u32,
    /// Number of octaves per channel.
    pub octaves: usize,
    /// Noise-space distance after which the pattern repeats.
    pub period: f64,
    /// Features per period.
    pub frequency: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid: GridSettings {
                width: 12,
                height: 10,
                ..default()
            },
            metrics: HexMetrics::default(),
            perturb_noise: PerturbNoiseSettings {
                seed: 7,
                octaves: 3,
                period: 1.0,
                frequency: 4.0,
            },
            palette: vec![
                Color::srgb(0.93, 0.84, 0.35),
                Color::srgb(0.35, 0.68, 0.27),
                Color::srgb(0.22, 0.45, 0.82),
                Color::srgb(0.95, 0.95, 0.95),
                Color::srgb(0.52, 0.40, 0.30),
            ],
            clear_color: Color::srgb(0.05, 0.06, 0.08),
        }
    }
}

/// Terrain plugin: grid generation at startup, click editing at runtime.
pub struct TerrainPlugin(pub TerrainConfig);

impl Plugin for TerrainPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<TerrainConfig>()
            .register_type::<CellAnchor>()
            .register_type::<Brush>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(self.0.clear_color))
            .insert_resource(Brush::new(
                self.0.palette.first().copied().unwrap_or(Color::WHITE),
            ))
            .add_systems(Startup, systems::generate_grid)
            .add_systems(
                Update,
                systems::select_brush.run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                systems::refresh_terrain.run_if(resource_exists_and_changed::<HexGrid>),
            );

        app.add_systems(
            Update,
            systems::draw_hex_labels.run_if(in_state(GameState::Debugging)),
        );
    }
}
