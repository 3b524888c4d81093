//! Top-down pan/zoom camera over the terrain.
//!
//! WASD pans the focus point, the mouse wheel zooms. The camera frames the
//! grid once it exists.

mod entities;
mod systems;

pub use entities::{CameraRig, TerrainCamera};

use bevy::prelude::*;

use crate::GameState;
use crate::hex_map::HexGrid;

/// Per-plugin configuration for the terrain camera.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct CameraConfig {
    /// Pan speed in world-units per second at the starting distance.
    pub pan_speed: f32,
    /// Fraction of the distance covered per scroll line.
    pub zoom_speed: f32,
    /// Closest allowed distance to the focus point.
    pub min_distance: f32,
    /// Farthest allowed distance to the focus point.
    pub max_distance: f32,
    /// Distance to the focus point when spawning.
    pub start_distance: f32,
    /// Angle below the horizon the camera looks down at (radians).
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            pan_speed: 120.0,
            zoom_speed: 0.1,
            min_distance: 20.0,
            max_distance: 600.0,
            start_distance: 220.0,
            pitch: 0.95,
        }
    }
}

/// Pan/zoom camera plugin.
pub struct CameraPlugin(pub CameraConfig);

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<CameraConfig>()
            .register_type::<CameraRig>()
            .register_type::<TerrainCamera>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                systems::focus_on_grid.run_if(resource_added::<HexGrid>),
            )
            .add_systems(
                Update,
                systems::pan_and_zoom.run_if(in_state(GameState::Running)),
            )
            .add_systems(
                Update,
                systems::apply_rig
                    .after(systems::focus_on_grid)
                    .after(systems::pan_and_zoom),
            );
    }
}
