use std::fmt;

use bevy::prelude::*;

use super::metrics::{HexDirection, HexMetrics};

/// Cube coordinates of a cell. `y` is derived so `x + y + z == 0` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub struct HexCoordinates {
    x: i32,
    z: i32,
}

impl HexCoordinates {
    /// Builds coordinates from the two independent cube axes.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cube X.
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Cube Y, always `-x - z`.
    pub const fn y(&self) -> i32 {
        -self.x - self.z
    }

    /// Cube Z, equal to the offset row.
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Converts offset `(column, row)` storage coordinates. Odd rows are
    /// shifted half a cell east, so every second row moves X back by one.
    pub const fn from_offset_coordinates(column: i32, row: i32) -> Self {
        Self::new(column - row.div_euclid(2), row)
    }

    /// Inverse of [`Self::from_offset_coordinates`].
    pub const fn to_offset_coordinates(&self) -> (i32, i32) {
        (self.x + self.z.div_euclid(2), self.z)
    }

    /// Cell center on the ground plane.
    pub fn to_position(&self, metrics: &HexMetrics) -> Vec3 {
        Vec3::new(
            (self.x as f32 + self.z as f32 * 0.5) * metrics.inner_radius() * 2.0,
            0.0,
            self.z as f32 * metrics.outer_radius * 1.5,
        )
    }

    /// Cell containing a world position. The height is ignored.
    ///
    /// Projects onto the hex axes, rounds each cube axis and, when rounding
    /// broke the zero-sum invariant, rebuilds the axis that moved the most.
    pub fn from_position(position: Vec3, metrics: &HexMetrics) -> Self {
        let mut x = position.x / (metrics.inner_radius() * 2.0);
        let mut y = -x;
        let offset = position.z / (metrics.outer_radius * 3.0);
        x -= offset;
        y -= offset;
        let z = -x - y;

        let mut ix = x.round() as i32;
        let mut iy = y.round() as i32;
        let mut iz = z.round() as i32;

        if ix + iy + iz != 0 {
            let dx = (x - ix as f32).abs();
            let dy = (y - iy as f32).abs();
            let dz = (z - iz as f32).abs();
            if dx > dy && dx > dz {
                ix = -iy - iz;
            } else if dy > dz {
                iy = -ix - iz;
            } else {
                iz = -ix - iy;
            }
        }
        debug_assert_eq!(
            ix + iy + iz,
            0,
            "cube coordinates lost their zero sum for {position:?}"
        );

        Self::new(ix, iz)
    }

    /// Coordinates one step away in `direction`.
    pub const fn neighbor(&self, direction: HexDirection) -> Self {
        let (dx, dz) = match direction {
            HexDirection::NE => (0, 1),
            HexDirection::E => (1, 0),
            HexDirection::SE => (1, -1),
            HexDirection::SW => (0, -1),
            HexDirection::W => (-1, 0),
            HexDirection::NW => (-1, 1),
        };
        Self::new(self.x + dx, self.z + dz)
    }

    /// Number of cell steps between two coordinates.
    pub const fn distance_to(&self, other: &Self) -> u32 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y() - other.y()).unsigned_abs();
        let dz = (self.z - other.z).unsigned_abs();
        (dx + dy + dz) / 2
    }

    /// Label text with one axis per line.
    pub fn to_string_on_separate_lines(&self) -> String {
        format!("{}\n{}\n{}", self.x, self.y(), self.z)
    }
}

impl fmt::Display for HexCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y(), self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_axes_sum_to_zero() {
        for row in -6..6 {
            for column in -6..6 {
                let c = HexCoordinates::from_offset_coordinates(column, row);
                assert_eq!(c.x() + c.y() + c.z(), 0, "{c}");
            }
        }
    }

    #[test]
    fn offset_conversion_floors_the_row() {
        assert_eq!(HexCoordinates::from_offset_coordinates(3, 0), HexCoordinates::new(3, 0));
        assert_eq!(HexCoordinates::from_offset_coordinates(3, 3), HexCoordinates::new(2, 3));
        assert_eq!(HexCoordinates::from_offset_coordinates(0, -1), HexCoordinates::new(1, -1));
    }

    #[test]
    fn offset_coordinates_roundtrip() {
        for row in -5..5 {
            for column in -5..5 {
                let c = HexCoordinates::from_offset_coordinates(column, row);
                assert_eq!(c.to_offset_coordinates(), (column, row));
            }
        }
    }

    #[test]
    fn center_position_maps_back_to_same_cell() {
        let m = HexMetrics::default();
        for row in 0..12 {
            for column in 0..12 {
                let c = HexCoordinates::from_offset_coordinates(column, row);
                let back = HexCoordinates::from_position(c.to_position(&m), &m);
                assert_eq!(back, c, "roundtrip failed for offset ({column}, {row})");
            }
        }
    }

    #[test]
    fn positions_inside_solid_region_resolve_to_owner() {
        let m = HexMetrics::default();
        let c = HexCoordinates::from_offset_coordinates(4, 5);
        let center = c.to_position(&m);
        for d in HexDirection::ALL {
            let p = center + m.first_solid_corner(d) * 0.99;
            assert_eq!(HexCoordinates::from_position(p, &m), c, "corner {d:?}");
        }
    }

    #[test]
    fn from_position_ignores_height() {
        let m = HexMetrics::default();
        let c = HexCoordinates::from_offset_coordinates(2, 1);
        let p = c.to_position(&m) + Vec3::Y * 40.0;
        assert_eq!(HexCoordinates::from_position(p, &m), c);
    }

    #[test]
    fn neighbor_centers_are_one_cell_apart() {
        let m = HexMetrics::default();
        let c = HexCoordinates::new(1, 2);
        for d in HexDirection::ALL {
            let n = c.neighbor(d);
            assert_eq!(c.distance_to(&n), 1);
            assert_eq!(n.neighbor(d.opposite()), c);
            let gap = c.to_position(&m).distance(n.to_position(&m));
            assert!((gap - m.inner_radius() * 2.0).abs() < 1e-3, "{d:?}: {gap}");
        }
    }

    #[test]
    fn neighbor_lies_across_the_matching_edge() {
        let m = HexMetrics::default();
        let c = HexCoordinates::new(0, 0);
        for d in HexDirection::ALL {
            let toward = c.neighbor(d).to_position(&m).normalize();
            let edge_mid = ((m.first_corner(d) + m.second_corner(d)) * 0.5).normalize();
            assert!(toward.dot(edge_mid) > 0.999, "{d:?}");
        }
    }

    #[test]
    fn labels_and_display() {
        let c = HexCoordinates::new(2, -5);
        assert_eq!(c.to_string_on_separate_lines(), "2\n3\n-5");
        assert_eq!(c.to_string(), "(2, 3, -5)");
    }
}
