//! Terrain meshing.
//!
//! Turns an elevation grid into an unshared triangle list with barycentric
//! markers for wireframe shading, plus the buffer views a renderer uploads.

mod buffers;
mod builder;

pub use buffers::{
    check_u16_resolution, max_u16_resolution, pad_to_even, Mesh, MeshError, VertexAttribute,
    WireframeVertex, BARYCENTRIC_ATTRIBUTE, INDEX_STRIDE, POSITION_ATTRIBUTE,
};
pub use builder::{triangulate, MeshBuilder, BARYCENTRIC_MARKERS};
