//! Terraced hex terrain core: coordinates, cells, metrics and the
//! triangulator that turns a grid of cells into one seamless mesh.
//!
//! Nothing here touches the ECS beyond deriving `Resource` on [`HexGrid`];
//! the plugin in [`crate::terrain`] is a consumer.

mod cell;
mod coordinates;
mod error;
mod grid;
mod mesh;
mod metrics;
mod noise_source;

pub use cell::{HexCell, link_neighbors};
pub use coordinates::HexCoordinates;
pub use error::HexGridError;
pub use grid::{CellChange, CellEdit, ElevationNoiseSettings, GridSettings, HexGrid};
pub use mesh::{CornerCase, HexGridMesh, HexMesh, TriangulationStats};
pub use metrics::{EdgeVertices, HexDirection, HexEdgeType, HexMetrics};
pub use noise_source::{ConstantNoise, FbmNoise, NoiseSource};
