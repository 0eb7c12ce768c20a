//! Square elevation grid produced by the layered noise generator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing an [`ElevationGrid`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid resolution must be at least 2, got {0}")]
    ResolutionTooSmall(u32),
    #[error("Expected {expected} values for the grid, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// A `resolution × resolution` grid of elevations.
///
/// Values are stored row-major: `z` selects the row and `x` the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct ElevationGrid {
    resolution: u32,
    values: Vec<f32>,
}

/// Unchecked serialized form, validated on the way into [`ElevationGrid`].
#[derive(Deserialize)]
struct GridData {
    resolution: u32,
    values: Vec<f32>,
}

impl TryFrom<GridData> for ElevationGrid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        Self::from_values(data.resolution, data.values)
    }
}

impl ElevationGrid {
    /// Creates a flat grid with every elevation set to 0.0.
    pub fn new(resolution: u32) -> Result<Self, GridError> {
        let len = checked_len(resolution)?;
        Ok(Self {
            resolution,
            values: vec![0.0; len],
        })
    }

    /// Wraps existing row-major values.
    pub fn from_values(resolution: u32, values: Vec<f32>) -> Result<Self, GridError> {
        let expected = checked_len(resolution)?;
        if values.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { resolution, values })
    }

    /// Builds a grid by evaluating `f(x, z)` at every point.
    pub fn from_fn<F>(resolution: u32, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(u32, u32) -> f32,
    {
        let len = checked_len(resolution)?;
        let mut values = Vec::with_capacity(len);
        for z in 0..resolution {
            for x in 0..resolution {
                values.push(f(x, z));
            }
        }
        Ok(Self { resolution, values })
    }

    /// Wraps values already known to match a validated resolution.
    pub(crate) fn from_raw(resolution: u32, values: Vec<f32>) -> Self {
        debug_assert!(resolution >= 2);
        debug_assert_eq!(values.len(), (resolution as usize) * (resolution as usize));
        Self { resolution, values }
    }

    /// Points per axis.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Returns the elevation at column `x`, row `z`.
    ///
    /// # Panics
    /// Panics if `x` or `z` is out of bounds.
    pub fn get(&self, x: u32, z: u32) -> f32 {
        debug_assert!(x < self.resolution && z < self.resolution);
        self.values[self.index(x, z)]
    }

    /// Sets the elevation at column `x`, row `z`.
    ///
    /// # Panics
    /// Panics if `x` or `z` is out of bounds.
    pub fn set(&mut self, x: u32, z: u32, value: f32) {
        debug_assert!(x < self.resolution && z < self.resolution);
        let i = self.index(x, z);
        self.values[i] = value;
    }

    /// Row-major view of all elevations.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consumes the grid, returning its row-major values.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }

    /// Total number of grid points.
    pub fn point_count(&self) -> usize {
        self.values.len()
    }

    /// Number of quads between grid points.
    pub fn cell_count(&self) -> usize {
        let cells = (self.resolution - 1) as usize;
        cells * cells
    }

    /// Returns the minimum elevation.
    pub fn min_height(&self) -> f32 {
        self.values.iter().cloned().fold(f32::MAX, f32::min)
    }

    /// Returns the maximum elevation.
    pub fn max_height(&self) -> f32 {
        self.values.iter().cloned().fold(f32::MIN, f32::max)
    }

    /// Returns (min, max) elevation.
    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height(), self.max_height())
    }

    /// Iterates over all `(x, z)` coordinates in storage order.
    pub fn coords(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let res = self.resolution;
        (0..res).flat_map(move |z| (0..res).map(move |x| (x, z)))
    }

    fn index(&self, x: u32, z: u32) -> usize {
        (z as usize) * (self.resolution as usize) + x as usize
    }
}

fn checked_len(resolution: u32) -> Result<usize, GridError> {
    if resolution < 2 {
        return Err(GridError::ResolutionTooSmall(resolution));
    }
    Ok((resolution as usize) * (resolution as usize))
}
