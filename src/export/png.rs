//! PNG export functionality for heightmaps.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::ElevationGrid;

/// Span given to a flat grid by [`PngExportOptions::auto_range`].
const FLAT_RANGE_EPSILON: f32 = 1e-6;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Elevation mapped to black.
    pub min_height: f32,
    /// Elevation mapped to white.
    pub max_height: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: -1.0,
            max_height: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options spanning the grid's own height range.
    ///
    /// A flat grid gets a minimal non-empty range so it still exports.
    pub fn auto_range(grid: &ElevationGrid) -> Self {
        let (min, max) = grid.height_range();
        let max = if max > min { max } else { min + FLAT_RANGE_EPSILON };
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Exports an elevation grid as a 16-bit grayscale PNG.
///
/// Row `z` of the grid becomes image row `z`.
///
/// # Arguments
/// * `grid` - The elevations to export
/// * `path` - Output file path
/// * `options` - Height range for normalization and encoder settings
pub fn export_grid_png(
    grid: &ElevationGrid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let resolution = grid.resolution();
    let range = max - min;

    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(resolution, resolution);

    for (x, z) in grid.coords() {
        let normalized = ((grid.get(x, z) - min) / range).clamp(0.0, 1.0);
        let value = (normalized * 65535.0) as u16;
        img.put_pixel(x, z, Luma([value]));
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());

    encoder.write_image(
        byte_slice,
        resolution,
        resolution,
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ramp(resolution: u32) -> ElevationGrid {
        let span = (2 * (resolution - 1)) as f32;
        ElevationGrid::from_fn(resolution, |x, z| (x + z) as f32 / span * 2.0 - 1.0).unwrap()
    }

    #[test]
    fn test_export_grid_png() {
        let grid = ramp(64);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        export_grid_png(&grid, &path, &PngExportOptions::default()).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.dimensions(), (64, 64));
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(63, 63).0[0], 65535);
    }

    #[test]
    fn test_rows_follow_z() {
        let mut grid = ElevationGrid::new(4).unwrap();
        grid.set(1, 3, 1.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("row.png");

        export_grid_png(&grid, &path, &PngExportOptions::default()).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert_eq!(img.get_pixel(1, 3).0[0], 65535);
        assert_eq!(img.get_pixel(3, 1).0[0], 32767);
    }

    #[test]
    fn test_invalid_height_range() {
        let grid = ElevationGrid::new(16).unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let options = PngExportOptions {
            min_height: 1.0,
            max_height: -1.0,
            ..Default::default()
        };

        let result = export_grid_png(&grid, &path, &options);
        assert!(matches!(result, Err(PngExportError::InvalidHeightRange(_, _))));
        assert!(!path.exists());
    }

    #[test]
    fn test_auto_range() {
        let mut grid = ElevationGrid::new(16).unwrap();
        grid.set(0, 0, -0.5);
        grid.set(15, 15, 0.75);

        let options = PngExportOptions::auto_range(&grid);
        assert_eq!(options.min_height, -0.5);
        assert_eq!(options.max_height, 0.75);
    }

    #[test]
    fn test_auto_range_on_flat_grid_exports() {
        let grid = ElevationGrid::from_values(4, vec![-1.0; 16]).unwrap();
        let options = PngExportOptions::auto_range(&grid);
        assert!(options.max_height > options.min_height);

        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.png");
        export_grid_png(&grid, &path, &options).unwrap();

        let img = image::open(&path).unwrap().to_luma16();
        assert!(img.pixels().all(|p| p.0[0] == 0));
    }
}
