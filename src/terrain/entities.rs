use bevy::prelude::*;

use crate::hex_map::CellEdit;

/// Marker on the entity carrying the terrain mesh.
#[derive(Component)]
pub struct TerrainMesh;

/// Follows one cell: placed at its unperturbed anchor and moved when the
/// cell's elevation changes.
#[derive(Component, Reflect)]
pub struct CellAnchor {
    /// Index of the cell in the grid.
    pub index: usize,
}

/// Anchor entities, indexed like the grid's cells.
#[derive(Resource)]
pub struct CellAnchors {
    /// One entity per cell.
    pub entities: Vec<Entity>,
}

/// What a click applies to the cell under the pointer.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct Brush {
    /// Paint color.
    pub color: Color,
    /// Target elevation; `None` leaves elevation alone.
    pub elevation: Option<i32>,
}

impl Brush {
    /// A paint-only brush.
    pub fn new(color: Color) -> Self {
        Self {
            color,
            elevation: None,
        }
    }

    /// Raises the target elevation, starting from 0 when unset.
    pub fn raise(&mut self) {
        self.elevation = Some(self.elevation.unwrap_or(0).saturating_add(1));
    }

    /// Lowers the target elevation, starting from 0 when unset.
    pub fn lower(&mut self) {
        self.elevation = Some(self.elevation.unwrap_or(0).saturating_sub(1));
    }

    /// Back to painting only.
    pub fn clear_elevation(&mut self) {
        self.elevation = None;
    }

    /// The edit a click applies.
    pub fn edit(&self) -> CellEdit {
        CellEdit {
            color: Some(self.color.to_linear()),
            elevation: self.elevation,
        }
    }
}
