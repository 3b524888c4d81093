#![warn(missing_docs)]
//! Terraced hex terrain: a grid of hexagonal cells with independent
//! elevations and colors, triangulated into flat strips, stepped slopes and
//! cliffs, with noise-perturbed vertices.

pub mod camera;
pub mod hex_map;
pub mod math;
pub mod terrain;

use bevy::prelude::*;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal editing: clicks paint and raise cells.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle).
    Debugging,
}
