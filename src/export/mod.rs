//! Export module for saving terrain data to disk.
//!
//! Heightmaps go out as 16-bit PNG or RAW for game engines; meshes are
//! dumped as the raw vertex and index streams a renderer uploads.

mod mesh;
mod png;
mod raw;

pub use mesh::{export_mesh_buffers, MeshExportError, MeshFiles};
pub use png::{export_grid_png, PngExportError, PngExportOptions};
pub use raw::{export_grid_raw, expected_file_size, RawExportError, RawFormat};
