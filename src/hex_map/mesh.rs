use bevy::asset::RenderAssetUsages;
use bevy::color::Mix;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::cell::HexCell;
use super::error::HexGridError;
use super::metrics::{EdgeVertices, HexDirection, HexEdgeType, HexMetrics};
use super::noise_source::NoiseSource;
use crate::math;

/// Triangle soup produced by [`HexGridMesh::triangulate`].
///
/// Every triangle owns its three vertices, so `indices` is `0..len` in
/// order; keeping them explicit lets any backend consume the mesh as-is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HexMesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// One color per vertex.
    pub colors: Vec<LinearRgba>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl HexMesh {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corner positions in emission order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Builds a renderable triangle list with flat per-triangle normals and
    /// vertex colors. Kept in the main world as well so it can be picked.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();
        let mut normals = vec![[0.0, 1.0, 0.0]; self.positions.len()];
        for t in self.indices.chunks_exact(3) {
            let [a, b, c] = [t[0], t[1], t[2]].map(|i| i as usize);
            let n = math::compute_normal(self.positions[a], self.positions[b], self.positions[c]);
            for i in [a, b, c] {
                normals[i] = n.to_array();
            }
        }
        let colors: Vec<[f32; 4]> = self
            .colors
            .iter()
            .map(|c| [c.red, c.green, c.blue, c.alpha])
            .collect();

        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, colors)
            .with_inserted_indices(Indices::U32(self.indices.clone()))
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.indices.clear();
    }

    fn add_triangle(&mut self, v: [Vec3; 3], c: [LinearRgba; 3]) {
        let base = self.positions.len() as u32;
        self.positions.extend(v);
        self.colors.extend(c);
        self.indices.extend([base, base + 1, base + 2]);
    }

    /// `v1 v2` is the near edge, `v3 v4` the far edge.
    fn add_quad(&mut self, v: [Vec3; 4], c: [LinearRgba; 4]) {
        self.add_triangle([v[0], v[2], v[1]], [c[0], c[2], c[1]]);
        self.add_triangle([v[1], v[2], v[3]], [c[1], c[2], c[3]]);
    }
}

/// Which fill closes the gap where three cells meet.
///
/// Named after the edges running from the lowest cell (the pivot) to its
/// left and right neighbors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CornerCase {
    /// Both pivot edges are slopes: a terraced fan from the pivot.
    DoubleSlope,
    /// One slope and one flat edge: a terraced fan from the odd cell out.
    SlopeFlat,
    /// Terraces on the left, a cliff on the right.
    SlopeCliff,
    /// A cliff on the left, terraces on the right.
    CliffSlope,
    /// No terraces touch the corner: a single triangle.
    Plain,
}

impl CornerCase {
    fn index(self) -> usize {
        self as usize
    }
}

/// What the last triangulation pass emitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriangulationStats {
    cells: usize,
    bridges: [usize; 3],
    corners: [usize; 5],
}

impl TriangulationStats {
    /// Cells visited.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Bridges emitted for one edge type.
    pub fn bridges(&self, edge_type: HexEdgeType) -> usize {
        self.bridges[edge_type as usize]
    }

    /// Bridges of any type.
    pub fn total_bridges(&self) -> usize {
        self.bridges.iter().sum()
    }

    /// Corners closed with one case.
    pub fn corners(&self, case: CornerCase) -> usize {
        self.corners[case.index()]
    }

    /// Corners of any case.
    pub fn total_corners(&self) -> usize {
        self.corners.iter().sum()
    }
}

/// Reusable triangulator: turns the whole cell array into one [`HexMesh`].
#[derive(Clone, Debug, Default)]
pub struct HexGridMesh {
    mesh: HexMesh,
    stats: TriangulationStats,
}

impl HexGridMesh {
    /// An empty triangulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the last successful pass.
    pub fn mesh(&self) -> &HexMesh {
        &self.mesh
    }

    /// Tallies of the last successful pass.
    pub fn stats(&self) -> &TriangulationStats {
        &self.stats
    }

    /// Rebuilds the mesh from scratch.
    ///
    /// Bridges are emitted for `NE`, `E` and `SE` only and corners for `NE`
    /// and `E` only, so every shared edge and corner is produced exactly once.
    /// Missing neighbors (the grid border) are skipped. A neighbor index that
    /// points outside `cells` rejects the pass and keeps the previous mesh.
    pub fn triangulate(
        &mut self,
        cells: &[HexCell],
        metrics: &HexMetrics,
        noise: &dyn NoiseSource,
    ) -> Result<(), HexGridError> {
        for cell in cells {
            for (direction, neighbor) in cell.neighbors() {
                if neighbor >= cells.len() {
                    return Err(HexGridError::DanglingNeighbor {
                        coordinates: cell.coordinates(),
                        direction,
                        neighbor,
                        len: cells.len(),
                    });
                }
            }
        }

        let centers: Vec<Vec3> = cells
            .iter()
            .map(|c| metrics.cell_center(c.coordinates(), c.elevation(), noise))
            .collect();

        self.mesh.clear();
        self.stats = TriangulationStats::default();

        let mut triangulator = Triangulator {
            metrics,
            noise,
            cells,
            centers: &centers,
            mesh: &mut self.mesh,
            stats: &mut self.stats,
        };
        for index in 0..cells.len() {
            triangulator.triangulate_cell(index);
        }
        Ok(())
    }
}

/// A corner vertex together with the cell it belongs to.
#[derive(Clone, Copy)]
struct Corner {
    position: Vec3,
    cell: usize,
}

struct Triangulator<'a> {
    metrics: &'a HexMetrics,
    noise: &'a dyn NoiseSource,
    cells: &'a [HexCell],
    centers: &'a [Vec3],
    mesh: &'a mut HexMesh,
    stats: &'a mut TriangulationStats,
}

impl Triangulator<'_> {
    fn perturb(&self, position: Vec3) -> Vec3 {
        self.metrics.perturb(self.noise, position)
    }

    fn color(&self, cell: usize) -> LinearRgba {
        self.cells[cell].color()
    }

    fn elevation(&self, cell: usize) -> i32 {
        self.cells[cell].elevation()
    }

    fn edge_type(&self, a: usize, b: usize) -> HexEdgeType {
        self.cells[a].edge_type_with(&self.cells[b])
    }

    fn triangle(&mut self, v: [Vec3; 3], c: [LinearRgba; 3]) {
        let v = v.map(|p| self.perturb(p));
        self.mesh.add_triangle(v, c);
    }

    fn quad(&mut self, v: [Vec3; 4], c: [LinearRgba; 4]) {
        let v = v.map(|p| self.perturb(p));
        self.mesh.add_quad(v, c);
    }

    fn triangulate_cell(&mut self, index: usize) {
        self.stats.cells += 1;
        for direction in HexDirection::ALL {
            self.triangulate_direction(index, direction);
        }
    }

    fn triangulate_direction(&mut self, index: usize, direction: HexDirection) {
        let center = self.centers[index];
        let edge = EdgeVertices::new(
            center + self.metrics.first_solid_corner(direction),
            center + self.metrics.second_solid_corner(direction),
        );
        self.edge_fan(center, &edge, self.color(index));

        if direction <= HexDirection::SE {
            self.triangulate_connection(index, direction, &edge);
        }
    }

    /// Solid region; the center anchor itself is never displaced.
    fn edge_fan(&mut self, center: Vec3, edge: &EdgeVertices, color: LinearRgba) {
        let [v1, v2, v3, v4] = edge.to_array().map(|p| self.perturb(p));
        for (a, b) in [(v1, v2), (v2, v3), (v3, v4)] {
            self.mesh.add_triangle([center, a, b], [color; 3]);
        }
    }

    fn edge_strip(
        &mut self,
        e1: &EdgeVertices,
        c1: LinearRgba,
        e2: &EdgeVertices,
        c2: LinearRgba,
    ) {
        let near = e1.to_array();
        let far = e2.to_array();
        for i in 0..3 {
            self.quad(
                [near[i], near[i + 1], far[i], far[i + 1]],
                [c1, c1, c2, c2],
            );
        }
    }

    fn triangulate_connection(
        &mut self,
        index: usize,
        direction: HexDirection,
        e1: &EdgeVertices,
    ) {
        let Some(neighbor) = self.cells[index].neighbor(direction) else {
            return;
        };

        let mut bridge = self.metrics.bridge(direction);
        bridge.y = self.centers[neighbor].y - self.centers[index].y;
        let e2 = EdgeVertices::new(e1.v1 + bridge, e1.v4 + bridge);

        let edge_type = self.edge_type(index, neighbor);
        self.stats.bridges[edge_type as usize] += 1;
        if edge_type == HexEdgeType::Slope {
            self.edge_terraces(e1, index, &e2, neighbor);
        } else {
            self.edge_strip(e1, self.color(index), &e2, self.color(neighbor));
        }

        if direction > HexDirection::E {
            return;
        }
        let Some(next) = self.cells[index].neighbor(direction.next()) else {
            return;
        };
        let mut v5 = e1.v4 + self.metrics.bridge(direction.next());
        v5.y = self.centers[next].y;

        let cell = Corner {
            position: e1.v4,
            cell: index,
        };
        let neighbor = Corner {
            position: e2.v4,
            cell: neighbor,
        };
        let next = Corner {
            position: v5,
            cell: next,
        };

        // Rotate so the lowest cell leads, keeping the winding.
        let (e_cell, e_neighbor, e_next) = (
            self.elevation(cell.cell),
            self.elevation(neighbor.cell),
            self.elevation(next.cell),
        );
        if e_cell <= e_neighbor {
            if e_cell <= e_next {
                self.triangulate_corner(cell, neighbor, next);
            } else {
                self.triangulate_corner(next, cell, neighbor);
            }
        } else if e_neighbor <= e_next {
            self.triangulate_corner(neighbor, next, cell);
        } else {
            self.triangulate_corner(next, cell, neighbor);
        }
    }

    fn edge_terraces(
        &mut self,
        begin: &EdgeVertices,
        begin_cell: usize,
        end: &EdgeVertices,
        end_cell: usize,
    ) {
        let (c_begin, c_end) = (self.color(begin_cell), self.color(end_cell));
        let steps = self.metrics.terrace_steps();

        let mut e2 = EdgeVertices::terrace_lerp(self.metrics, begin, end, 1);
        let mut c2 = self.metrics.terrace_lerp_color(c_begin, c_end, 1);
        self.edge_strip(begin, c_begin, &e2, c2);

        for step in 2..steps {
            let (e1, c1) = (e2, c2);
            e2 = EdgeVertices::terrace_lerp(self.metrics, begin, end, step);
            c2 = self.metrics.terrace_lerp_color(c_begin, c_end, step);
            self.edge_strip(&e1, c1, &e2, c2);
        }

        self.edge_strip(&e2, c2, end, c_end);
    }

    /// `bottom` is the lowest of the three cells; `left` and `right`
    /// follow it clockwise.
    fn triangulate_corner(&mut self, bottom: Corner, left: Corner, right: Corner) {
        let left_edge = self.edge_type(bottom.cell, left.cell);
        let right_edge = self.edge_type(bottom.cell, right.cell);

        let case = match (left_edge, right_edge) {
            (HexEdgeType::Slope, HexEdgeType::Slope) => {
                self.corner_terraces(bottom, left, right);
                CornerCase::DoubleSlope
            }
            (HexEdgeType::Slope, HexEdgeType::Flat) => {
                self.corner_terraces(left, right, bottom);
                CornerCase::SlopeFlat
            }
            (HexEdgeType::Flat, HexEdgeType::Slope) => {
                self.corner_terraces(right, bottom, left);
                CornerCase::SlopeFlat
            }
            (HexEdgeType::Slope, HexEdgeType::Cliff) => {
                self.corner_terraces_cliff(bottom, left, right);
                CornerCase::SlopeCliff
            }
            (HexEdgeType::Cliff, HexEdgeType::Slope) => {
                self.corner_cliff_terraces(bottom, left, right);
                CornerCase::CliffSlope
            }
            _ if self.edge_type(left.cell, right.cell) == HexEdgeType::Slope => {
                // Two cliffs rising from the pivot; the terraces run along
                // the top edge, so pivot on the lower of the two.
                if self.elevation(left.cell) < self.elevation(right.cell) {
                    self.corner_cliff_terraces(right, bottom, left);
                    CornerCase::CliffSlope
                } else {
                    self.corner_terraces_cliff(left, right, bottom);
                    CornerCase::SlopeCliff
                }
            }
            _ => {
                self.triangle(
                    [bottom.position, left.position, right.position],
                    [self.color(bottom.cell), self.color(left.cell), self.color(right.cell)],
                );
                CornerCase::Plain
            }
        };
        self.stats.corners[case.index()] += 1;
    }

    fn corner_terraces(&mut self, begin: Corner, left: Corner, right: Corner) {
        let m = self.metrics;
        let (c_begin, c_left, c_right) = (
            self.color(begin.cell),
            self.color(left.cell),
            self.color(right.cell),
        );

        let mut v3 = m.terrace_lerp(begin.position, left.position, 1);
        let mut v4 = m.terrace_lerp(begin.position, right.position, 1);
        let mut c3 = m.terrace_lerp_color(c_begin, c_left, 1);
        let mut c4 = m.terrace_lerp_color(c_begin, c_right, 1);
        self.triangle([begin.position, v3, v4], [c_begin, c3, c4]);

        for step in 2..m.terrace_steps() {
            let (v1, v2, c1, c2) = (v3, v4, c3, c4);
            v3 = m.terrace_lerp(begin.position, left.position, step);
            v4 = m.terrace_lerp(begin.position, right.position, step);
            c3 = m.terrace_lerp_color(c_begin, c_left, step);
            c4 = m.terrace_lerp_color(c_begin, c_right, step);
            self.quad([v1, v2, v3, v4], [c1, c2, c3, c4]);
        }

        self.quad(
            [v3, v4, left.position, right.position],
            [c3, c4, c_left, c_right],
        );
    }

    /// Terraces toward `left`, a cliff toward `right`.
    fn corner_terraces_cliff(&mut self, begin: Corner, left: Corner, right: Corner) {
        let (boundary, boundary_color) = self.cliff_boundary(begin, right);
        self.boundary_triangle(begin, left, boundary, boundary_color);
        self.close_cliff_corner(left, right, boundary, boundary_color);
    }

    /// A cliff toward `left`, terraces toward `right`.
    fn corner_cliff_terraces(&mut self, begin: Corner, left: Corner, right: Corner) {
        let (boundary, boundary_color) = self.cliff_boundary(begin, left);
        self.boundary_triangle(right, begin, boundary, boundary_color);
        self.close_cliff_corner(left, right, boundary, boundary_color);
    }

    /// Point on the (perturbed) cliff edge one elevation level above `begin`,
    /// where the collapsed terraces meet the cliff.
    fn cliff_boundary(&self, begin: Corner, cliff: Corner) -> (Vec3, LinearRgba) {
        let delta = self.elevation(cliff.cell).abs_diff(self.elevation(begin.cell));
        let b = 1.0 / delta as f32;
        let boundary = self
            .perturb(begin.position)
            .lerp(self.perturb(cliff.position), b);
        let color = self.color(begin.cell).mix(&self.color(cliff.cell), b);
        (boundary, color)
    }

    fn close_cliff_corner(
        &mut self,
        left: Corner,
        right: Corner,
        boundary: Vec3,
        color: LinearRgba,
    ) {
        if self.edge_type(left.cell, right.cell) == HexEdgeType::Slope {
            self.boundary_triangle(left, right, boundary, color);
        } else {
            let (l, r) = (self.perturb(left.position), self.perturb(right.position));
            let (c_left, c_right) = (self.color(left.cell), self.color(right.cell));
            self.mesh
                .add_triangle([l, r, boundary], [c_left, c_right, color]);
        }
    }

    /// Terraces from `begin` to `left`, collapsed onto `boundary`.
    ///
    /// `boundary` is already in perturbed space, so it is emitted as-is.
    fn boundary_triangle(
        &mut self,
        begin: Corner,
        left: Corner,
        boundary: Vec3,
        boundary_color: LinearRgba,
    ) {
        let m = self.metrics;
        let (c_begin, c_left) = (self.color(begin.cell), self.color(left.cell));

        let mut v2 = self.perturb(m.terrace_lerp(begin.position, left.position, 1));
        let mut c2 = m.terrace_lerp_color(c_begin, c_left, 1);
        let start = self.perturb(begin.position);
        self.mesh
            .add_triangle([start, v2, boundary], [c_begin, c2, boundary_color]);

        for step in 2..m.terrace_steps() {
            let (v1, c1) = (v2, c2);
            v2 = self.perturb(m.terrace_lerp(begin.position, left.position, step));
            c2 = m.terrace_lerp_color(c_begin, c_left, step);
            self.mesh
                .add_triangle([v1, v2, boundary], [c1, c2, boundary_color]);
        }

        let end = self.perturb(left.position);
        self.mesh
            .add_triangle([v2, end, boundary], [c2, c_left, boundary_color]);
    }
}
