use bevy::color::Mix;
use bevy::prelude::*;

use super::coordinates::HexCoordinates;
use super::error::HexGridError;
use super::noise_source::NoiseSource;

/// `sqrt(3) / 2`, the ratio between a hexagon's inner and outer radius.
const INNER_TO_OUTER: f32 = 0.866_025_4;

/// One of the six edge directions of a pointy-top hexagon, clockwise from
/// north-east.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HexDirection {
    /// North-east.
    NE,
    /// East.
    E,
    /// South-east.
    SE,
    /// South-west.
    SW,
    /// West.
    W,
    /// North-west.
    NW,
}

impl HexDirection {
    /// All directions in table order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::NE,
        HexDirection::E,
        HexDirection::SE,
        HexDirection::SW,
        HexDirection::W,
        HexDirection::NW,
    ];

    /// Slot of this direction in neighbor and corner tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction for a table slot, wrapping modulo 6.
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// The direction pointing the other way (`+3 mod 6`).
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Clockwise successor; `NW` wraps to `NE`.
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Counter-clockwise predecessor; `NE` wraps to `NW`.
    pub const fn previous(self) -> Self {
        Self::from_index(self.index() + 5)
    }
}

/// How two adjacent cells connect, derived from their elevation difference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HexEdgeType {
    /// Same elevation.
    Flat,
    /// Elevations differ by exactly one step; rendered as terraces.
    Slope,
    /// Any larger difference; rendered as a vertical face.
    Cliff,
}

/// A cell edge split into three segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVertices {
    /// First corner.
    pub v1: Vec3,
    /// One third along the edge.
    pub v2: Vec3,
    /// Two thirds along the edge.
    pub v3: Vec3,
    /// Second corner.
    pub v4: Vec3,
}

impl EdgeVertices {
    /// Subdivides the edge between two corners.
    pub fn new(corner1: Vec3, corner2: Vec3) -> Self {
        Self {
            v1: corner1,
            v2: corner1.lerp(corner2, 1.0 / 3.0),
            v3: corner1.lerp(corner2, 2.0 / 3.0),
            v4: corner2,
        }
    }

    /// Terrace-interpolates every vertex of `a` toward the matching vertex of `b`.
    pub fn terrace_lerp(metrics: &HexMetrics, a: &Self, b: &Self, step: u32) -> Self {
        Self {
            v1: metrics.terrace_lerp(a.v1, b.v1, step),
            v2: metrics.terrace_lerp(a.v2, b.v2, step),
            v3: metrics.terrace_lerp(a.v3, b.v3, step),
            v4: metrics.terrace_lerp(a.v4, b.v4, step),
        }
    }

    /// The four vertices in edge order.
    pub fn to_array(&self) -> [Vec3; 4] {
        [self.v1, self.v2, self.v3, self.v4]
    }
}

/// Hexagon geometry, terrace and perturbation parameters.
///
/// Passed explicitly to everything that needs it; there is no global table.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct HexMetrics {
    /// Center-to-corner distance of a cell.
    pub outer_radius: f32,
    /// Share of the hexagon rendered in the cell's own color.
    pub solid_factor: f32,
    /// World height of one elevation level.
    pub elevation_step: f32,
    /// Treads per slope; each slope is split into `2n + 1` steps.
    pub terraces_per_slope: u32,
    /// Maximum horizontal vertex displacement.
    pub cell_perturb_strength: f32,
    /// Maximum vertical displacement of a cell's surface.
    pub elevation_perturb_strength: f32,
    /// World-to-noise coordinate scale.
    pub noise_scale: f32,
    /// Whether noise perturbation is applied at all.
    pub perturb: bool,
}

impl Default for HexMetrics {
    fn default() -> Self {
        Self {
            outer_radius: 10.0,
            solid_factor: 0.75,
            elevation_step: 4.0,
            terraces_per_slope: 2,
            cell_perturb_strength: 5.0,
            elevation_perturb_strength: 1.5,
            noise_scale: 0.003,
            perturb: true,
        }
    }
}

impl HexMetrics {
    /// Metrics with perturbation switched off, for exact geometry.
    pub fn unperturbed() -> Self {
        Self {
            perturb: false,
            ..default()
        }
    }

    /// Rejects parameter combinations the triangulator cannot handle.
    pub fn validate(&self) -> Result<(), HexGridError> {
        let invalid = |msg: &str| Err(HexGridError::InvalidMetrics(msg.to_string()));
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.outer_radius) {
            return invalid("outer_radius must be positive");
        }
        if !positive(self.solid_factor) || self.solid_factor >= 1.0 {
            return invalid("solid_factor must lie strictly between 0 and 1");
        }
        if !positive(self.elevation_step) {
            return invalid("elevation_step must be positive");
        }
        if self.terraces_per_slope == 0 {
            return invalid("terraces_per_slope must be at least 1");
        }
        if self.cell_perturb_strength < 0.0 || self.elevation_perturb_strength < 0.0 {
            return invalid("perturb strengths must not be negative");
        }
        if !positive(self.noise_scale) {
            return invalid("noise_scale must be positive");
        }
        Ok(())
    }

    // ── Hexagon shape ──────────────────────────────────────────────

    /// Center-to-edge distance of a cell.
    pub fn inner_radius(&self) -> f32 {
        self.outer_radius * INNER_TO_OUTER
    }

    /// Share of the hexagon used for blending with neighbors.
    pub fn blend_factor(&self) -> f32 {
        1.0 - self.solid_factor
    }

    /// Corner offset from a cell center. Index 6 repeats index 0 so that
    /// `corner(d + 1)` is valid for every direction.
    pub fn corner(&self, index: usize) -> Vec3 {
        let outer = self.outer_radius;
        let inner = self.inner_radius();
        match index % 6 {
            0 => Vec3::new(0.0, 0.0, outer),
            1 => Vec3::new(inner, 0.0, 0.5 * outer),
            2 => Vec3::new(inner, 0.0, -0.5 * outer),
            3 => Vec3::new(0.0, 0.0, -outer),
            4 => Vec3::new(-inner, 0.0, -0.5 * outer),
            _ => Vec3::new(-inner, 0.0, 0.5 * outer),
        }
    }

    /// First corner bounding the edge in `direction`.
    pub fn first_corner(&self, direction: HexDirection) -> Vec3 {
        self.corner(direction.index())
    }

    /// Second corner bounding the edge in `direction`.
    pub fn second_corner(&self, direction: HexDirection) -> Vec3 {
        self.corner(direction.index() + 1)
    }

    /// First corner of the solid inner hexagon.
    pub fn first_solid_corner(&self, direction: HexDirection) -> Vec3 {
        self.first_corner(direction) * self.solid_factor
    }

    /// Second corner of the solid inner hexagon.
    pub fn second_solid_corner(&self, direction: HexDirection) -> Vec3 {
        self.second_corner(direction) * self.solid_factor
    }

    /// Offset spanning the blend region from one solid edge to the
    /// neighbor's solid edge.
    pub fn bridge(&self, direction: HexDirection) -> Vec3 {
        (self.first_corner(direction) + self.second_corner(direction)) * self.blend_factor()
    }

    // ── Elevation and terraces ─────────────────────────────────────

    /// Classifies the connection between two elevations.
    pub fn edge_type(elevation1: i32, elevation2: i32) -> HexEdgeType {
        match elevation1.abs_diff(elevation2) {
            0 => HexEdgeType::Flat,
            1 => HexEdgeType::Slope,
            _ => HexEdgeType::Cliff,
        }
    }

    /// Number of interpolation steps across a slope.
    pub fn terrace_steps(&self) -> u32 {
        self.terraces_per_slope * 2 + 1
    }

    /// Horizontal fraction covered by one terrace step.
    pub fn horizontal_terrace_step_size(&self) -> f32 {
        1.0 / self.terrace_steps() as f32
    }

    /// Vertical fraction covered by one riser.
    pub fn vertical_terrace_step_size(&self) -> f32 {
        1.0 / (self.terraces_per_slope + 1) as f32
    }

    /// Stair-step interpolation: x/z advance every step, y only on odd steps.
    ///
    /// Returns `a` at step 0 and `b` at `terrace_steps()`, bit for bit.
    pub fn terrace_lerp(&self, a: Vec3, b: Vec3, step: u32) -> Vec3 {
        if step >= self.terrace_steps() {
            return b;
        }
        let h = step as f32 * self.horizontal_terrace_step_size();
        let v = ((step + 1) / 2) as f32 * self.vertical_terrace_step_size();
        Vec3::new(
            a.x * (1.0 - h) + b.x * h,
            a.y * (1.0 - v) + b.y * v,
            a.z * (1.0 - h) + b.z * h,
        )
    }

    /// Color counterpart of [`Self::terrace_lerp`]; blends linearly per step.
    pub fn terrace_lerp_color(&self, a: LinearRgba, b: LinearRgba, step: u32) -> LinearRgba {
        a.mix(&b, step as f32 * self.horizontal_terrace_step_size())
    }

    // ── Noise ──────────────────────────────────────────────────────

    /// Samples the noise source at a world position (y is ignored).
    pub fn sample_noise(&self, noise: &dyn NoiseSource, position: Vec3) -> Vec4 {
        noise.sample(position.x * self.noise_scale, position.z * self.noise_scale)
    }

    /// Horizontally displaces a vertex. Depends on the position only, so
    /// vertices shared between cells move together.
    pub fn perturb(&self, noise: &dyn NoiseSource, position: Vec3) -> Vec3 {
        if !self.perturb {
            return position;
        }
        let sample = self.sample_noise(noise, position);
        Vec3::new(
            position.x + (sample.x * 2.0 - 1.0) * self.cell_perturb_strength,
            position.y,
            position.z + (sample.z * 2.0 - 1.0) * self.cell_perturb_strength,
        )
    }

    // ── Cell placement ─────────────────────────────────────────────

    /// Unperturbed anchor of a cell: ground position raised by its elevation.
    pub fn cell_anchor(&self, coordinates: HexCoordinates, elevation: i32) -> Vec3 {
        let mut position = coordinates.to_position(self);
        position.y = elevation as f32 * self.elevation_step;
        position
    }

    /// Depth offset of a cell's overlay label, opposite to its height.
    pub fn label_offset(&self, elevation: i32) -> f32 {
        -(elevation as f32) * self.elevation_step
    }

    /// World position of a cell's label. The overlay plane lies flat, so its
    /// depth axis points down and the label rises by `-label_offset`.
    pub fn label_position(&self, coordinates: HexCoordinates, elevation: i32) -> Vec3 {
        let mut position = coordinates.to_position(self);
        position.y = -self.label_offset(elevation);
        position
    }

    /// Surface center used for triangulation, including the elevation jitter
    /// sampled at the cell's ground position.
    pub fn cell_center(
        &self,
        coordinates: HexCoordinates,
        elevation: i32,
        noise: &dyn NoiseSource,
    ) -> Vec3 {
        let mut position = self.cell_anchor(coordinates, elevation);
        if self.perturb {
            let sample = self.sample_noise(noise, position);
            position.y += (sample.y * 2.0 - 1.0) * self.elevation_perturb_strength;
        }
        position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex_map::noise_source::ConstantNoise;

    // ── HexDirection ────────────────────────────────────────────────

    #[test]
    fn opposite_is_three_steps_away() {
        for d in HexDirection::ALL {
            assert_eq!(d.opposite().index(), (d.index() + 3) % 6);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn next_and_previous_wrap() {
        assert_eq!(HexDirection::NW.next(), HexDirection::NE);
        assert_eq!(HexDirection::NE.previous(), HexDirection::NW);
        for d in HexDirection::ALL {
            assert_eq!(d.next().previous(), d);
        }
    }

    // ── Corners ─────────────────────────────────────────────────────

    #[test]
    fn second_corner_is_next_first_corner() {
        let m = HexMetrics::default();
        for d in HexDirection::ALL {
            assert_eq!(m.second_corner(d), m.first_corner(d.next()));
        }
    }

    #[test]
    fn corners_lie_on_outer_radius() {
        let m = HexMetrics::default();
        for i in 0..7 {
            assert!((m.corner(i).length() - m.outer_radius).abs() < 1e-4);
        }
    }

    #[test]
    fn bridges_of_opposite_directions_cancel() {
        let m = HexMetrics::default();
        for d in HexDirection::ALL {
            let sum = m.bridge(d) + m.bridge(d.opposite());
            assert!(sum.length() < 1e-5, "{d:?}: {sum:?}");
        }
    }

    #[test]
    fn solid_edge_plus_bridge_meets_neighbor_solid_edge() {
        let m = HexMetrics::default();
        // E neighbor sits one inner diameter to the east.
        let neighbor = Vec3::new(m.inner_radius() * 2.0, 0.0, 0.0);
        let d = HexDirection::E;
        let ours = m.first_solid_corner(d) + m.bridge(d);
        let theirs = neighbor + m.second_solid_corner(d.opposite());
        assert!((ours - theirs).length() < 1e-4);
    }

    // ── Edge classification ─────────────────────────────────────────

    #[test]
    fn edge_type_by_delta() {
        assert_eq!(HexMetrics::edge_type(2, 2), HexEdgeType::Flat);
        assert_eq!(HexMetrics::edge_type(2, 3), HexEdgeType::Slope);
        assert_eq!(HexMetrics::edge_type(2, 1), HexEdgeType::Slope);
        assert_eq!(HexMetrics::edge_type(0, 3), HexEdgeType::Cliff);
        assert_eq!(HexMetrics::edge_type(5, -5), HexEdgeType::Cliff);
    }

    #[test]
    fn edge_type_survives_extreme_elevations() {
        assert_eq!(HexMetrics::edge_type(i32::MIN, 1), HexEdgeType::Cliff);
        assert_eq!(HexMetrics::edge_type(i32::MAX, i32::MIN), HexEdgeType::Cliff);
        assert_eq!(HexMetrics::edge_type(i32::MIN, i32::MIN + 1), HexEdgeType::Slope);
    }

    #[test]
    fn edge_type_is_symmetric() {
        for a in -4..=4 {
            for b in -4..=4 {
                assert_eq!(HexMetrics::edge_type(a, b), HexMetrics::edge_type(b, a));
            }
        }
    }

    // ── Terraces ────────────────────────────────────────────────────

    #[test]
    fn terrace_steps_follow_terraces_per_slope() {
        let m = HexMetrics::default();
        assert_eq!(m.terrace_steps(), 5);
        let m = HexMetrics {
            terraces_per_slope: 3,
            ..default()
        };
        assert_eq!(m.terrace_steps(), 7);
    }

    #[test]
    fn terrace_lerp_is_exact_at_both_ends() {
        let m = HexMetrics::default();
        let a = Vec3::new(1.3, 4.0, -7.1);
        let b = Vec3::new(8.9, 8.0, 2.7);
        assert_eq!(m.terrace_lerp(a, b, 0), a);
        assert_eq!(m.terrace_lerp(a, b, m.terrace_steps()), b);
    }

    #[test]
    fn terrace_lerp_is_monotonic_horizontally() {
        let m = HexMetrics::default();
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, 4.0, 5.0);
        let points: Vec<Vec3> = (0..=m.terrace_steps())
            .map(|i| m.terrace_lerp(a, b, i))
            .collect();
        for w in points.windows(2) {
            assert!(w[1].x > w[0].x);
            assert!(w[1].z > w[0].z);
            assert!(w[1].y >= w[0].y);
        }
    }

    #[test]
    fn terrace_lerp_rises_only_on_odd_steps() {
        let m = HexMetrics::default();
        let a = Vec3::ZERO;
        let b = Vec3::new(5.0, 3.0, 0.0);
        let heights: Vec<f32> = (0..=m.terrace_steps())
            .map(|i| m.terrace_lerp(a, b, i).y)
            .collect();
        // Treads: step pairs (1,2) and (3,4) share a height.
        assert_eq!(heights[1], heights[2]);
        assert_eq!(heights[3], heights[4]);
        assert!(heights[1] > heights[0]);
        assert!(heights[3] > heights[2]);
        assert!(heights[5] > heights[4]);
    }

    #[test]
    fn terrace_lerp_color_hits_endpoints() {
        let m = HexMetrics::default();
        let a = LinearRgba::rgb(1.0, 0.0, 0.0);
        let b = LinearRgba::rgb(0.0, 0.0, 1.0);
        assert_eq!(m.terrace_lerp_color(a, b, 0), a);
        let end = m.terrace_lerp_color(a, b, m.terrace_steps());
        assert!((end.blue - 1.0).abs() < 1e-6 && end.red.abs() < 1e-6);
    }

    #[test]
    fn edge_vertices_split_in_thirds() {
        let e = EdgeVertices::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        assert!((e.v2.x - 1.0).abs() < 1e-6);
        assert!((e.v3.x - 2.0).abs() < 1e-6);
        assert_eq!(e.v4, Vec3::new(3.0, 0.0, 0.0));
    }

    // ── Noise and placement ─────────────────────────────────────────

    #[test]
    fn neutral_noise_does_not_move_vertices() {
        let m = HexMetrics::default();
        let p = Vec3::new(12.0, 3.0, -4.0);
        assert_eq!(m.perturb(&ConstantNoise::NEUTRAL, p), p);
    }

    #[test]
    fn perturb_is_bounded_and_keeps_height() {
        let m = HexMetrics::default();
        let full = ConstantNoise(Vec4::ONE);
        let p = Vec3::new(1.0, 2.0, 3.0);
        let moved = m.perturb(&full, p);
        assert_eq!(moved.y, p.y);
        assert!((moved.x - (p.x + m.cell_perturb_strength)).abs() < 1e-5);
        assert!((moved.z - (p.z + m.cell_perturb_strength)).abs() < 1e-5);
    }

    #[test]
    fn disabled_perturbation_is_identity() {
        let m = HexMetrics::unperturbed();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(m.perturb(&ConstantNoise(Vec4::ONE), p), p);
    }

    #[test]
    fn anchor_and_label_follow_elevation() {
        let m = HexMetrics::default();
        let c = HexCoordinates::from_offset_coordinates(2, 3);
        assert_eq!(m.cell_anchor(c, 3).y, 12.0);
        assert_eq!(m.label_offset(3), -12.0);
        assert_eq!(m.label_position(c, 3), m.cell_anchor(c, 3));
    }

    #[test]
    fn step_sizes_match_terrace_lerp() {
        let m = HexMetrics {
            terraces_per_slope: 3,
            ..default()
        };
        let a = Vec3::ZERO;
        let b = Vec3::new(7.0, 4.0, 0.0);
        let first = m.terrace_lerp(a, b, 1);
        assert!((first.x - 7.0 * m.horizontal_terrace_step_size()).abs() < 1e-5);
        assert!((first.y - 4.0 * m.vertical_terrace_step_size()).abs() < 1e-5);
        assert_eq!(m.terrace_lerp(a, b, m.terrace_steps()), b);
    }

    #[test]
    fn cell_center_jitters_height_only() {
        let m = HexMetrics::default();
        let c = HexCoordinates::from_offset_coordinates(1, 1);
        let anchor = m.cell_anchor(c, 2);
        let center = m.cell_center(c, 2, &ConstantNoise(Vec4::ONE));
        assert_eq!(center.x, anchor.x);
        assert_eq!(center.z, anchor.z);
        assert!((center.y - (anchor.y + m.elevation_perturb_strength)).abs() < 1e-5);
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        assert!(HexMetrics::default().validate().is_ok());
        let bad = HexMetrics {
            terraces_per_slope: 0,
            ..default()
        };
        assert!(matches!(bad.validate(), Err(HexGridError::InvalidMetrics(_))));
        let bad = HexMetrics {
            solid_factor: 1.0,
            ..default()
        };
        assert!(bad.validate().is_err());
    }
}
