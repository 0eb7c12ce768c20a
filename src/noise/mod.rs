//! Noise generation module for terrain synthesis.
//!
//! A [`NoiseField`] samples 2D gradient noise from its own permutation table;
//! [`LayeredNoiseGenerator`] stacks several of them into an elevation grid.

mod config;
mod layered;
mod perlin;

pub use config::{ConfigLoadError, LayerSpec, LayerSpecError};
pub use layered::{
    generate_elevation, redistribute, slope_modifier, GenerateError, LayeredNoiseGenerator,
    EDGE_DERIVATIVE,
};
pub use perlin::{fade, grad, lerp, NoiseError, NoiseField, NoiseFieldFactory};
