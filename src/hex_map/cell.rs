use bevy::prelude::*;

use super::coordinates::HexCoordinates;
use super::error::HexGridError;
use super::metrics::{HexDirection, HexEdgeType, HexMetrics};

/// One grid node. Neighbors are indices into the owning grid's cell array,
/// so the grid stays the only owner of every cell.
#[derive(Clone, Debug, PartialEq)]
pub struct HexCell {
    coordinates: HexCoordinates,
    elevation: i32,
    color: LinearRgba,
    neighbors: [Option<usize>; 6],
}

impl HexCell {
    /// A cell at elevation 0 without neighbors.
    pub fn new(coordinates: HexCoordinates, color: LinearRgba) -> Self {
        Self {
            coordinates,
            elevation: 0,
            color,
            neighbors: [None; 6],
        }
    }

    /// Position of the cell in the grid.
    pub fn coordinates(&self) -> HexCoordinates {
        self.coordinates
    }

    /// Terrace level of the cell.
    pub fn elevation(&self) -> i32 {
        self.elevation
    }

    /// Surface color of the solid region.
    pub fn color(&self) -> LinearRgba {
        self.color
    }

    /// Data-only setter; returns the previous value. Placement of anything
    /// that follows the cell is derived from [`HexMetrics::cell_anchor`].
    pub fn set_elevation(&mut self, elevation: i32) -> i32 {
        std::mem::replace(&mut self.elevation, elevation)
    }

    /// Replaces the color; returns the previous value.
    pub fn set_color(&mut self, color: LinearRgba) -> LinearRgba {
        std::mem::replace(&mut self.color, color)
    }

    /// Index of the neighbor in `direction`, if linked.
    pub fn neighbor(&self, direction: HexDirection) -> Option<usize> {
        self.neighbors[direction.index()]
    }

    /// Linked neighbor slots with their directions.
    pub fn neighbors(&self) -> impl Iterator<Item = (HexDirection, usize)> + '_ {
        HexDirection::ALL
            .into_iter()
            .filter_map(|d| self.neighbor(d).map(|n| (d, n)))
    }

    /// Classifies the edge shared with the linked neighbor in `direction`.
    ///
    /// Fails when the slot is empty or points outside `cells`.
    pub fn edge_type(
        &self,
        direction: HexDirection,
        cells: &[HexCell],
    ) -> Result<HexEdgeType, HexGridError> {
        let neighbor = self
            .neighbor(direction)
            .ok_or(HexGridError::MissingNeighbor {
                coordinates: self.coordinates,
                direction,
            })?;
        let other = cells.get(neighbor).ok_or(HexGridError::DanglingNeighbor {
            coordinates: self.coordinates,
            direction,
            neighbor,
            len: cells.len(),
        })?;
        Ok(self.edge_type_with(other))
    }

    /// Classifies the edge against an explicit cell.
    pub fn edge_type_with(&self, other: &HexCell) -> HexEdgeType {
        HexMetrics::edge_type(self.elevation, other.elevation)
    }
}

/// Links `cell` to `neighbor` in `direction` and `neighbor` back to `cell`
/// in the opposite direction. This is the only writer of neighbor slots.
pub fn link_neighbors(
    cells: &mut [HexCell],
    cell: usize,
    direction: HexDirection,
    neighbor: usize,
) -> Result<(), HexGridError> {
    let len = cells.len();
    for index in [cell, neighbor] {
        if index >= len {
            return Err(HexGridError::CellIndex { index, len });
        }
    }
    cells[cell].neighbors[direction.index()] = Some(neighbor);
    cells[neighbor].neighbors[direction.opposite().index()] = Some(cell);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(e0: i32, e1: i32) -> Vec<HexCell> {
        let mut cells = vec![
            HexCell::new(HexCoordinates::new(0, 0), LinearRgba::WHITE),
            HexCell::new(HexCoordinates::new(1, 0), LinearRgba::WHITE),
        ];
        cells[0].set_elevation(e0);
        cells[1].set_elevation(e1);
        link_neighbors(&mut cells, 0, HexDirection::E, 1).unwrap();
        cells
    }

    #[test]
    fn linking_is_symmetric() {
        let cells = pair(0, 0);
        assert_eq!(cells[0].neighbor(HexDirection::E), Some(1));
        assert_eq!(cells[1].neighbor(HexDirection::W), Some(0));
        assert_eq!(cells[0].neighbors().count(), 1);
        assert_eq!(cells[1].neighbors().collect::<Vec<_>>(), vec![(HexDirection::W, 0)]);
    }

    #[test]
    fn linking_out_of_bounds_fails_without_writing() {
        let mut cells = pair(0, 0);
        let err = link_neighbors(&mut cells, 0, HexDirection::NE, 9).unwrap_err();
        assert_eq!(err, HexGridError::CellIndex { index: 9, len: 2 });
        assert_eq!(cells[0].neighbor(HexDirection::NE), None);
    }

    #[test]
    fn edge_type_through_neighbor_slot() {
        let cells = pair(0, 1);
        assert_eq!(
            cells[0].edge_type(HexDirection::E, &cells),
            Ok(HexEdgeType::Slope)
        );
        assert_eq!(
            cells[1].edge_type(HexDirection::W, &cells),
            Ok(HexEdgeType::Slope)
        );
    }

    #[test]
    fn edge_type_with_explicit_cell() {
        let cells = pair(0, 3);
        assert_eq!(cells[0].edge_type_with(&cells[1]), HexEdgeType::Cliff);
        assert_eq!(cells[1].edge_type_with(&cells[0]), HexEdgeType::Cliff);
    }

    #[test]
    fn edge_type_of_unlinked_slot_is_an_error() {
        let cells = pair(0, 0);
        assert_eq!(
            cells[0].edge_type(HexDirection::NW, &cells),
            Err(HexGridError::MissingNeighbor {
                coordinates: HexCoordinates::new(0, 0),
                direction: HexDirection::NW,
            })
        );
    }

    #[test]
    fn edge_type_against_truncated_slice_is_an_error() {
        let cells = pair(0, 0);
        let err = cells[0].edge_type(HexDirection::E, &cells[..1]).unwrap_err();
        assert!(matches!(err, HexGridError::DanglingNeighbor { neighbor: 1, len: 1, .. }));
    }

    #[test]
    fn setters_return_previous_values() {
        let mut cell = HexCell::new(HexCoordinates::default(), LinearRgba::WHITE);
        assert_eq!(cell.set_elevation(4), 0);
        assert_eq!(cell.set_elevation(2), 4);
        assert_eq!(cell.set_color(LinearRgba::BLACK), LinearRgba::WHITE);
        assert_eq!(cell.color(), LinearRgba::BLACK);
    }
}
