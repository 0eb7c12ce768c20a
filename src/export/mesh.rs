//! Binary dumps of mesh buffers, laid out exactly as they are uploaded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::mesh::{Mesh, MeshError};

/// Errors that can occur during mesh buffer export.
#[derive(Error, Debug)]
pub enum MeshExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),
}

/// Paths written by [`export_mesh_buffers`].
#[derive(Debug, Clone)]
pub struct MeshFiles {
    pub positions: PathBuf,
    pub barycentric: PathBuf,
    pub indices: PathBuf,
}

/// Writes the position, barycentric and 16-bit index streams of `mesh`.
///
/// Files are named `{base_name}_positions.bin`, `{base_name}_barycentric.bin`
/// and `{base_name}_indices.bin`. Floats and indices are little-endian; the
/// index stream is padded to an even count.
pub fn export_mesh_buffers(
    mesh: &Mesh,
    output_dir: &Path,
    base_name: &str,
) -> Result<MeshFiles, MeshExportError> {
    // Fail before touching the filesystem if indices do not fit
    let indices = mesh.index_buffer_u16()?;

    std::fs::create_dir_all(output_dir)?;

    let files = MeshFiles {
        positions: output_dir.join(format!("{}_positions.bin", base_name)),
        barycentric: output_dir.join(format!("{}_barycentric.bin", base_name)),
        indices: output_dir.join(format!("{}_indices.bin", base_name)),
    };

    write_f32_stream(&files.positions, mesh.position_floats())?;
    write_f32_stream(&files.barycentric, bytemuck::cast_slice(mesh.barycentric()))?;

    let mut writer = BufWriter::new(File::create(&files.indices)?);
    for index in &indices {
        writer.write_all(&index.to_le_bytes())?;
    }
    writer.flush()?;

    info!(
        vertices = mesh.vertex_count(),
        indices = indices.len(),
        dir = %output_dir.display(),
        "exported mesh buffers"
    );

    Ok(files)
}

fn write_f32_stream(path: &Path, values: &[f32]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()
}
