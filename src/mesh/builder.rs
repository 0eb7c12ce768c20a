//! Grid-to-triangle conversion.

use glam::Vec3;

use super::buffers::Mesh;
use crate::terrain::ElevationGrid;

/// Barycentric markers handed to the three corners of every triangle, in order.
pub const BARYCENTRIC_MARKERS: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Append-only triangle soup builder.
///
/// Every triangle gets three fresh vertices; nothing is shared between
/// neighbours, so each vertex carries exactly one barycentric marker.
#[derive(Debug, Default, Clone)]
pub struct MeshBuilder {
    positions: Vec<[f32; 3]>,
    barycentric: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with room for `triangles` triangles.
    pub fn with_capacity(triangles: usize) -> Self {
        let vertices = triangles * 3;
        Self {
            positions: Vec::with_capacity(vertices),
            barycentric: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices),
        }
    }

    /// Appends one triangle. Corners are stored in the order given.
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        for (corner, marker) in [a, b, c].into_iter().zip(BARYCENTRIC_MARKERS) {
            let index = self.positions.len() as u32;
            self.positions.push(corner.to_array());
            self.barycentric.push(marker);
            self.indices.push(index);
        }
    }

    /// Number of vertices emitted so far.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles emitted so far.
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Finishes construction.
    pub fn build(self) -> Mesh {
        Mesh::from_parts(self.positions, self.barycentric, self.indices)
    }
}

/// Triangulates `grid` into two triangles per cell.
///
/// The grid is laid out on `[-0.5, 0.5]` along x and z, with elevations as y.
/// For the cell whose lower corner is `(x, z)` the emitted triangles are
/// `(x0,y0,z0) (x1,y1,z0) (x0,y2,z1)` and `(x1,y1,z0) (x1,y3,z1) (x0,y2,z1)`,
/// both wound clockwise when seen from above.
pub fn triangulate(grid: &ElevationGrid) -> Mesh {
    let resolution = grid.resolution();
    let step = 1.0 / (resolution - 1) as f32;
    let coord = |i: u32| -0.5 + i as f32 * step;

    let mut builder = MeshBuilder::with_capacity(grid.cell_count() * 2);

    for z in 0..resolution - 1 {
        let z0 = coord(z);
        let z1 = coord(z + 1);
        for x in 0..resolution - 1 {
            let x0 = coord(x);
            let x1 = coord(x + 1);

            let y0 = grid.get(x, z);
            let y1 = grid.get(x + 1, z);
            let y2 = grid.get(x, z + 1);
            let y3 = grid.get(x + 1, z + 1);

            builder.push_triangle(
                Vec3::new(x0, y0, z0),
                Vec3::new(x1, y1, z0),
                Vec3::new(x0, y2, z1),
            );
            builder.push_triangle(
                Vec3::new(x1, y1, z0),
                Vec3::new(x1, y3, z1),
                Vec3::new(x0, y2, z1),
            );
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{generate_elevation, LayerSpec};

    #[test]
    fn test_counts_match_grid_size() {
        for n in [2u32, 3, 5, 10, 33] {
            let grid = ElevationGrid::new(n).unwrap();
            let mesh = triangulate(&grid);
            let cells = ((n - 1) * (n - 1)) as usize;

            assert_eq!(mesh.triangle_count(), 2 * cells);
            assert_eq!(mesh.indices().len(), 6 * cells);
            assert_eq!(mesh.position_floats().len(), 18 * cells);
            assert_eq!(mesh.barycentric().len(), mesh.positions().len());
        }
    }

    #[test]
    fn test_minimal_scenario() {
        let spec = LayerSpec::single_layer(2, 1.0, 1.0);
        let grid = generate_elevation(&spec, 11).unwrap();
        let mesh = triangulate(&grid);

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(mesh.position_floats().len(), 18);
        assert_eq!(mesh.index_buffer_u16().unwrap().len(), 6);
    }

    #[test]
    fn test_cell_corners_and_winding_order() {
        let grid = ElevationGrid::from_values(2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mesh = triangulate(&grid);

        // y0 = (0,0), y1 = (1,0), y2 = (0,1), y3 = (1,1)
        assert_eq!(
            mesh.positions(),
            &[
                [-0.5, 0.1, -0.5],
                [0.5, 0.2, -0.5],
                [-0.5, 0.3, 0.5],
                [0.5, 0.2, -0.5],
                [0.5, 0.4, 0.5],
                [-0.5, 0.3, 0.5],
            ]
        );
    }

    #[test]
    fn test_barycentric_markers_cycle_per_triangle() {
        let grid = ElevationGrid::new(4).unwrap();
        let mesh = triangulate(&grid);

        for (i, marker) in mesh.barycentric().iter().enumerate() {
            assert_eq!(*marker, BARYCENTRIC_MARKERS[i % 3]);
        }
    }

    #[test]
    fn test_indices_are_sequential() {
        let grid = ElevationGrid::new(6).unwrap();
        let mesh = triangulate(&grid);
        for (i, &index) in mesh.indices().iter().enumerate() {
            assert_eq!(index as usize, i);
        }
    }

    #[test]
    fn test_positions_span_unit_square() {
        let spec = LayerSpec {
            resolution: 9,
            ..Default::default()
        };
        let grid = generate_elevation(&spec, 4).unwrap();
        let mesh = triangulate(&grid);

        for p in mesh.positions() {
            assert!(p[0] >= -0.5 && p[0] <= 0.5);
            assert!(p[2] >= -0.5 && p[2] <= 0.5);
            assert!(p[1] >= -1.0 && p[1] <= 1.0);
        }
        let max_x = mesh.positions().iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_consistent_winding_on_flat_grid() {
        let grid = ElevationGrid::new(5).unwrap();
        let mesh = triangulate(&grid);
        for tri in mesh.positions().chunks(3) {
            let a = Vec3::from(tri[0]);
            let b = Vec3::from(tri[1]);
            let c = Vec3::from(tri[2]);
            // Clockwise seen from +Y means the right-handed normal points down
            assert!((b - a).cross(c - a).y < 0.0);
        }
    }

    #[test]
    fn test_builder_counts() {
        let mut builder = MeshBuilder::new();
        builder.push_triangle(Vec3::ZERO, Vec3::X, Vec3::Z);
        assert_eq!(builder.vertex_count(), 3);
        assert_eq!(builder.triangle_count(), 1);

        let mesh = builder.build();
        assert_eq!(mesh.indices(), &[0, 1, 2]);
        assert_eq!(mesh.barycentric(), &BARYCENTRIC_MARKERS);
    }
}
