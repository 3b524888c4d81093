use thiserror::Error;

use super::coordinates::HexCoordinates;
use super::metrics::HexDirection;

/// Rejected grid operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HexGridError {
    /// A metrics parameter is outside the range the triangulator supports.
    #[error("invalid hex metrics: {0}")]
    InvalidMetrics(String),

    /// Seeded elevations were asked to span an inverted range.
    #[error("elevation range is inverted: min {min} > max {max}")]
    InvalidElevationRange {
        /// Configured lowest elevation.
        min: i32,
        /// Configured highest elevation.
        max: i32,
    },

    /// The grid was configured without cells.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// An edge was classified through a neighbor slot that was never linked.
    #[error("cell {coordinates} has no neighbor to the {direction:?}")]
    MissingNeighbor {
        /// Cell whose slot was read.
        coordinates: HexCoordinates,
        /// Empty slot.
        direction: HexDirection,
    },

    /// A neighbor slot points outside the cell array it was resolved against.
    #[error("cell {coordinates} links {direction:?} to cell {neighbor}, but only {len} cells exist")]
    DanglingNeighbor {
        /// Cell holding the link.
        coordinates: HexCoordinates,
        /// Slot holding the link.
        direction: HexDirection,
        /// Linked index.
        neighbor: usize,
        /// Number of cells available.
        len: usize,
    },

    /// A lookup resolved to coordinates outside the grid.
    #[error("coordinates {coordinates} lie outside the {width}x{height} grid")]
    OutOfRange {
        /// Resolved coordinates.
        coordinates: HexCoordinates,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },

    /// A cell index is not part of the grid.
    #[error("cell index {index} is out of bounds for {len} cells")]
    CellIndex {
        /// Requested index.
        index: usize,
        /// Number of cells.
        len: usize,
    },
}
