//! Procedural mountain terrain generator.
//!
//! This crate builds a heightfield from layered 2D gradient noise, with
//! slope-sensitive detail, and triangulates it into a triangle list carrying
//! barycentric markers for wireframe rendering.

pub mod export;
pub mod mesh;
pub mod noise;
pub mod terrain;

pub use mesh::{triangulate, Mesh, MeshBuilder};
pub use noise::{generate_elevation, LayerSpec, LayeredNoiseGenerator, NoiseField, NoiseFieldFactory};
pub use terrain::ElevationGrid;
