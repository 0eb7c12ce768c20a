//! Parameters for layered heightfield generation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Precondition violations in a [`LayerSpec`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerSpecError {
    #[error("Resolution must be at least 2, got {0}")]
    ResolutionTooSmall(u32),
    #[error("Size must be a positive finite number, got {0}")]
    InvalidSize(f32),
    #[error("Frequency must be a positive finite number, got {0}")]
    InvalidFrequency(f32),
    #[error("Layer count must be at least 1")]
    NoLayers,
    #[error("Redistribution exponent must be a non-negative finite number, got {0}")]
    InvalidRedistribution(f32),
}

/// Errors that can occur while loading a [`LayerSpec`] from disk.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] LayerSpecError),
}

/// Configuration for layered gradient-noise terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSpec {
    /// Grid points per axis (at least 2).
    pub resolution: u32,
    /// World-space extent sampled by the noise, centered on the origin.
    pub size: f32,
    /// Base sampling frequency of the first layer.
    pub frequency: f32,
    /// Number of noise layers combined (at least 1).
    pub layers: u32,
    /// Power applied to the normalized elevation. Below 1 lifts mid
    /// elevations, above 1 pushes values toward the extremes.
    pub redistribution: f32,
}

impl Default for LayerSpec {
    fn default() -> Self {
        Self {
            resolution: 64,
            size: 1.0,
            frequency: 4.0,
            layers: 4,
            redistribution: 1.0,
        }
    }
}

impl LayerSpec {
    /// Creates a single-layer configuration with no redistribution.
    pub fn single_layer(resolution: u32, size: f32, frequency: f32) -> Self {
        Self {
            resolution,
            size,
            frequency,
            layers: 1,
            redistribution: 1.0,
        }
    }

    /// Soft, low-frequency terrain with lifted valleys.
    pub fn rolling_hills() -> Self {
        Self {
            frequency: 2.0,
            layers: 3,
            redistribution: 0.8,
            ..Default::default()
        }
    }

    /// Jagged, high-detail terrain with pronounced peaks.
    pub fn alpine() -> Self {
        Self {
            resolution: 100,
            frequency: 6.0,
            layers: 8,
            redistribution: 2.2,
            ..Default::default()
        }
    }

    /// Checks every precondition the generator relies on.
    pub fn validate(&self) -> Result<(), LayerSpecError> {
        if self.resolution < 2 {
            return Err(LayerSpecError::ResolutionTooSmall(self.resolution));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(LayerSpecError::InvalidSize(self.size));
        }
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(LayerSpecError::InvalidFrequency(self.frequency));
        }
        if self.layers == 0 {
            return Err(LayerSpecError::NoLayers);
        }
        if !self.redistribution.is_finite() || self.redistribution < 0.0 {
            return Err(LayerSpecError::InvalidRedistribution(self.redistribution));
        }
        Ok(())
    }

    /// Distance between neighbouring grid points in world units.
    ///
    /// Only meaningful once [`validate`](Self::validate) has passed.
    pub fn step(&self) -> f32 {
        self.size / (self.resolution - 1) as f32
    }

    /// Parses and validates a JSON configuration. Missing fields take their
    /// default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        let spec: LayerSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
