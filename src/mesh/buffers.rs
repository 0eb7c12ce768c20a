//! Finished mesh and the buffer layout it is uploaded with.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use thiserror::Error;

/// Errors that can occur when preparing mesh buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("Vertex index {0} does not fit a 16-bit index buffer")]
    IndexOverflow(u32),
    #[error("Resolution {resolution} exceeds the 16-bit index limit of {max}")]
    ResolutionTooLarge { resolution: u32, max: u32 },
}

/// Description of one per-vertex attribute stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub shader_location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte distance between consecutive vertices.
    pub stride: u64,
}

/// Positions: `float32x3` at location 0.
pub const POSITION_ATTRIBUTE: VertexAttribute = VertexAttribute {
    shader_location: 0,
    components: 3,
    stride: 12,
};

/// Barycentric markers: `float32x3` at location 1.
pub const BARYCENTRIC_ATTRIBUTE: VertexAttribute = VertexAttribute {
    shader_location: 1,
    components: 3,
    stride: 12,
};

/// Size of one entry in the index stream (`uint16`).
pub const INDEX_STRIDE: u64 = 2;

/// Interleaved vertex for renderers that prefer a single buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WireframeVertex {
    pub position: [f32; 3],
    pub barycentric: [f32; 3],
}

/// Triangle soup with wireframe markers.
///
/// `positions`, `barycentric` and `indices` run in parallel: vertex `i` has
/// one position, one marker, and appears once in the index list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<[f32; 3]>,
    barycentric: Vec<[f32; 3]>,
    indices: Vec<u32>,
}

impl Mesh {
    pub(crate) fn from_parts(
        positions: Vec<[f32; 3]>,
        barycentric: Vec<[f32; 3]>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(positions.len(), barycentric.len());
        Self {
            positions,
            barycentric,
            indices,
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn barycentric(&self) -> &[[f32; 3]] {
        &self.barycentric
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Positions flattened to `x, y, z, x, y, z, ...`.
    pub fn position_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the position stream.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw bytes of the barycentric stream.
    pub fn barycentric_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.barycentric)
    }

    /// Index stream narrowed to `u16` and padded to an even length.
    ///
    /// # Returns
    /// An error if any index exceeds `u16::MAX`.
    pub fn index_buffer_u16(&self) -> Result<Vec<u16>, MeshError> {
        let mut out = Vec::with_capacity(self.indices.len() + 1);
        for &index in &self.indices {
            let narrow = u16::try_from(index).map_err(|_| MeshError::IndexOverflow(index))?;
            out.push(narrow);
        }
        pad_to_even(&mut out);
        Ok(out)
    }

    /// Whether the mesh can be drawn with a 16-bit index buffer.
    pub fn fits_u16_indices(&self) -> bool {
        self.indices.iter().all(|&i| i <= u16::MAX as u32)
    }

    /// Positions and markers zipped into one buffer.
    pub fn interleaved(&self) -> Vec<WireframeVertex> {
        self.positions
            .iter()
            .zip(&self.barycentric)
            .map(|(&position, &barycentric)| WireframeVertex {
                position,
                barycentric,
            })
            .collect()
    }

    /// One normal per vertex, shared by the three corners of each triangle.
    ///
    /// Normals follow the clockwise front-face convention, so flat ground
    /// faces +Y. Degenerate triangles get a zero normal.
    pub fn flat_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = Vec::with_capacity(self.positions.len());
        for tri in self.positions.chunks_exact(3) {
            let a = Vec3::from(tri[0]);
            let b = Vec3::from(tri[1]);
            let c = Vec3::from(tri[2]);
            let n = (c - a).cross(b - a).normalize_or_zero().to_array();
            normals.extend_from_slice(&[n, n, n]);
        }
        normals
    }
}

/// Duplicates the last entry when `indices` has odd length.
pub fn pad_to_even<T: Copy>(indices: &mut Vec<T>) {
    if indices.len() % 2 != 0 {
        if let Some(&last) = indices.last() {
            indices.push(last);
        }
    }
}

/// Upper bound on grid resolution whose mesh still fits 16-bit indices.
pub fn max_u16_resolution() -> u32 {
    // 6 vertices per cell, highest index = 6 * cells - 1
    let max_cells = (u16::MAX as u32 + 1) / 6;
    (max_cells as f64).sqrt().floor() as u32 + 1
}

/// Fails if a grid of `resolution` would overflow a 16-bit index buffer.
///
/// Lets callers reject a mesh before any generation or export work.
pub fn check_u16_resolution(resolution: u32) -> Result<(), MeshError> {
    let max = max_u16_resolution();
    if resolution > max {
        return Err(MeshError::ResolutionTooLarge { resolution, max });
    }
    Ok(())
}
