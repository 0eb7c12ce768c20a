//! Terrain data structures.

mod grid;

pub use grid::{ElevationGrid, GridError};
