use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::cell::{HexCell, link_neighbors};
use super::coordinates::HexCoordinates;
use super::error::HexGridError;
use super::mesh::{HexGridMesh, HexMesh, TriangulationStats};
use super::metrics::{HexDirection, HexMetrics};
use super::noise_source::NoiseSource;
use crate::math;

/// Grid extents, starting color and initial terrain.
#[derive(Clone, Debug, Reflect)]
pub struct GridSettings {
    /// Cells per row.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Color every cell starts with.
    pub default_color: Color,
    /// Noise-derived starting elevations.
    pub elevation: ElevationNoiseSettings,
}

/// Fbm parameters for seeding starting elevations.
#[derive(Clone, Debug, Reflect)]
pub struct ElevationNoiseSettings {
    /// When off, every cell starts at elevation 0.
    pub enabled: bool,
    /// Seed for the elevation noise generator.
    pub seed: u32,
    /// Number of octaves for elevation noise.
    pub octaves: usize,
    /// Spatial scale divisor for elevation noise sampling.
    pub scale: f64,
    /// Lowest seeded elevation.
    pub min: i32,
    /// Highest seeded elevation.
    pub max: i32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            width: 6,
            height: 6,
            default_color: Color::WHITE,
            elevation: ElevationNoiseSettings {
                enabled: true,
                seed: 42,
                octaves: 4,
                scale: 60.0,
                min: 0,
                max: 4,
            },
        }
    }
}

/// A requested change to one cell. `None` leaves the value alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellEdit {
    /// New color.
    pub color: Option<LinearRgba>,
    /// New elevation.
    pub elevation: Option<i32>,
}

/// Recorded for every accepted mutation, drained by whoever mirrors the
/// grid (anchors, labels, meshes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellChange {
    /// A cell moved to another terrace level.
    Elevation {
        /// Cell index.
        index: usize,
        /// Cell coordinates.
        coordinates: HexCoordinates,
        /// Previous elevation.
        old: i32,
        /// Current elevation.
        new: i32,
    },
    /// A cell was repainted.
    Color {
        /// Cell index.
        index: usize,
        /// Cell coordinates.
        coordinates: HexCoordinates,
        /// Previous color.
        old: LinearRgba,
        /// Current color.
        new: LinearRgba,
    },
}

impl CellChange {
    /// Index of the changed cell.
    pub fn index(&self) -> usize {
        match self {
            Self::Elevation { index, .. } | Self::Color { index, .. } => *index,
        }
    }
}

/// Owner of all cells. Cells are stored row by row: `index = row * width + column`.
#[derive(Resource)]
pub struct HexGrid {
    width: u32,
    height: u32,
    cells: Vec<HexCell>,
    metrics: HexMetrics,
    noise: Box<dyn NoiseSource>,
    triangulator: HexGridMesh,
    changes: Vec<CellChange>,
}

impl HexGrid {
    /// Builds, links and triangulates a `width x height` grid.
    pub fn new(
        settings: &GridSettings,
        metrics: HexMetrics,
        noise: Box<dyn NoiseSource>,
    ) -> Result<Self, HexGridError> {
        metrics.validate()?;
        let elevation = &settings.elevation;
        if elevation.enabled && elevation.min > elevation.max {
            return Err(HexGridError::InvalidElevationRange {
                min: elevation.min,
                max: elevation.max,
            });
        }
        let mut cells = build_cells(
            settings.width,
            settings.height,
            settings.default_color.to_linear(),
        )?;
        if settings.elevation.enabled {
            seed_elevations(&mut cells, &settings.elevation, &metrics);
        }

        let mut grid = Self {
            width: settings.width,
            height: settings.height,
            cells,
            metrics,
            noise,
            triangulator: HexGridMesh::new(),
            changes: Vec::new(),
        };
        grid.retriangulate()?;
        info!(
            "built {}x{} hex grid: {} triangles",
            grid.width,
            grid.height,
            grid.mesh().triangle_count()
        );
        Ok(grid)
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Cells per row.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// All cells, row-major.
    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    /// Cell at an array index.
    pub fn cell(&self, index: usize) -> Option<&HexCell> {
        self.cells.get(index)
    }

    /// Geometry parameters the grid was built with.
    pub fn metrics(&self) -> &HexMetrics {
        &self.metrics
    }

    /// Current triangulation.
    pub fn mesh(&self) -> &HexMesh {
        self.triangulator.mesh()
    }

    /// Tallies of the current triangulation.
    pub fn stats(&self) -> &TriangulationStats {
        self.triangulator.stats()
    }

    /// Surface center of a cell as used by the triangulation.
    pub fn cell_center(&self, index: usize) -> Option<Vec3> {
        let cell = self.cells.get(index)?;
        Some(
            self.metrics
                .cell_center(cell.coordinates(), cell.elevation(), self.noise.as_ref()),
        )
    }

    // ── Lookup ─────────────────────────────────────────────────────

    /// Array index for coordinates, checking column and row separately so
    /// an overflowing column never wraps into the next row.
    pub fn index_of(&self, coordinates: HexCoordinates) -> Result<usize, HexGridError> {
        let (column, row) = coordinates.to_offset_coordinates();
        let inside = (0..self.width as i32).contains(&column) && (0..self.height as i32).contains(&row);
        if !inside {
            return Err(HexGridError::OutOfRange {
                coordinates,
                width: self.width,
                height: self.height,
            });
        }
        Ok(row as usize * self.width as usize + column as usize)
    }

    /// Index of the cell under a grid-local world position.
    pub fn index_at(&self, position: Vec3) -> Result<usize, HexGridError> {
        self.index_of(HexCoordinates::from_position(position, &self.metrics))
    }

    /// Cell under a grid-local world position.
    pub fn cell_at(&self, position: Vec3) -> Result<&HexCell, HexGridError> {
        self.index_at(position).map(|index| &self.cells[index])
    }

    // ── Edits ──────────────────────────────────────────────────────

    /// Paints the cell under `position` and re-triangulates.
    ///
    /// Positions outside the grid are rejected without touching any cell or
    /// the current mesh.
    pub fn color_cell(&mut self, position: Vec3, color: LinearRgba) -> Result<usize, HexGridError> {
        self.edit_cell(
            position,
            CellEdit {
                color: Some(color),
                elevation: None,
            },
        )
    }

    /// Applies an edit to the cell under `position`; returns its index.
    pub fn edit_cell(&mut self, position: Vec3, edit: CellEdit) -> Result<usize, HexGridError> {
        let index = self.index_at(position)?;
        if self.apply(index, edit) {
            self.retriangulate()?;
        }
        Ok(index)
    }

    /// Moves a cell to another elevation and re-triangulates.
    pub fn set_elevation(&mut self, index: usize, elevation: i32) -> Result<(), HexGridError> {
        self.edit_index(
            index,
            CellEdit {
                color: None,
                elevation: Some(elevation),
            },
        )
    }

    /// Repaints a cell and re-triangulates.
    pub fn set_color(&mut self, index: usize, color: LinearRgba) -> Result<(), HexGridError> {
        self.edit_index(
            index,
            CellEdit {
                color: Some(color),
                elevation: None,
            },
        )
    }

    fn edit_index(&mut self, index: usize, edit: CellEdit) -> Result<(), HexGridError> {
        if index >= self.cells.len() {
            return Err(HexGridError::CellIndex {
                index,
                len: self.cells.len(),
            });
        }
        if self.apply(index, edit) {
            self.retriangulate()?;
        }
        Ok(())
    }

    /// Mutates one cell and records what changed. Returns whether anything did.
    fn apply(&mut self, index: usize, edit: CellEdit) -> bool {
        let cell = &mut self.cells[index];
        let coordinates = cell.coordinates();
        let mut changed = false;

        if let Some(new) = edit.color
            && cell.color() != new
        {
            let old = cell.set_color(new);
            self.changes.push(CellChange::Color {
                index,
                coordinates,
                old,
                new,
            });
            changed = true;
        }
        if let Some(new) = edit.elevation
            && cell.elevation() != new
        {
            let old = cell.set_elevation(new);
            self.changes.push(CellChange::Elevation {
                index,
                coordinates,
                old,
                new,
            });
            changed = true;
        }
        changed
    }

    /// Full triangulation pass over every cell.
    pub fn retriangulate(&mut self) -> Result<(), HexGridError> {
        self.triangulator
            .triangulate(&self.cells, &self.metrics, self.noise.as_ref())?;
        let stats = self.triangulator.stats();
        debug!(
            "triangulated {} cells: {} bridges, {} corners, {} triangles",
            stats.cells(),
            stats.total_bridges(),
            stats.total_corners(),
            self.triangulator.mesh().triangle_count()
        );
        Ok(())
    }

    /// Whether edits were recorded that nobody has drained yet.
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Hands over the changes recorded since the last call.
    pub fn drain_changes(&mut self) -> Vec<CellChange> {
        std::mem::take(&mut self.changes)
    }
}

/// Creates `width x height` cells and links each to its W, SW and SE
/// neighbors as it is created; the opposite slots are filled by the link.
pub(crate) fn build_cells(
    width: u32,
    height: u32,
    color: LinearRgba,
) -> Result<Vec<HexCell>, HexGridError> {
    if width == 0 || height == 0 {
        return Err(HexGridError::EmptyGrid { width, height });
    }
    let w = width as usize;
    let mut cells = Vec::with_capacity(w * height as usize);

    for z in 0..height as usize {
        for x in 0..w {
            let i = cells.len();
            cells.push(HexCell::new(
                HexCoordinates::from_offset_coordinates(x as i32, z as i32),
                color,
            ));
            if x > 0 {
                link_neighbors(&mut cells, i, HexDirection::W, i - 1)?;
            }
            if z > 0 {
                if z % 2 == 0 {
                    link_neighbors(&mut cells, i, HexDirection::SE, i - w)?;
                    if x > 0 {
                        link_neighbors(&mut cells, i, HexDirection::SW, i - w - 1)?;
                    }
                } else {
                    link_neighbors(&mut cells, i, HexDirection::SW, i - w)?;
                    if x < w - 1 {
                        link_neighbors(&mut cells, i, HexDirection::SE, i - w + 1)?;
                    }
                }
            }
        }
    }
    Ok(cells)
}

fn seed_elevations(cells: &mut [HexCell], settings: &ElevationNoiseSettings, metrics: &HexMetrics) {
    let fbm: Fbm<Perlin> = Fbm::new(settings.seed).set_octaves(settings.octaves);
    for cell in cells {
        let pos = cell.coordinates().to_position(metrics);
        let noise_val = fbm.get([pos.x as f64 / settings.scale, pos.z as f64 / settings.scale]);
        cell.set_elevation(math::noise_to_elevation(noise_val, settings.min, settings.max));
    }
}
