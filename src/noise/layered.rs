//! Layered gradient noise with slope-sensitive detail.
//!
//! Every layer samples its own [`NoiseField`], so octaves stay uncorrelated.
//! Higher layers are damped where the terrain accumulated so far is steep,
//! which keeps detail on flat ground and leaves steep faces smooth.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::config::{LayerSpec, LayerSpecError};
use super::perlin::{NoiseField, NoiseFieldFactory};
use crate::terrain::ElevationGrid;

/// Slope assigned to a derivative that has no forward neighbour
/// (last row or last column).
pub const EDGE_DERIVATIVE: f32 = 1.0;

/// Errors that can occur during heightfield generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error("Invalid layer specification: {0}")]
    InvalidSpec(#[from] LayerSpecError),
}

/// Combines independent noise fields into an elevation grid.
#[derive(Debug, Clone)]
pub struct LayeredNoiseGenerator {
    spec: LayerSpec,
}

impl LayeredNoiseGenerator {
    /// Creates a generator after checking the specification's preconditions.
    pub fn new(spec: LayerSpec) -> Result<Self, GenerateError> {
        spec.validate()?;
        Ok(Self { spec })
    }

    /// The validated specification.
    pub fn spec(&self) -> &LayerSpec {
        &self.spec
    }

    /// Generates a grid, drawing one fresh field per layer from `factory`.
    ///
    /// # Returns
    /// Elevations in `[-1, 1]`.
    pub fn generate<R: Rng>(&self, factory: &mut NoiseFieldFactory<R>) -> ElevationGrid {
        let spec = &self.spec;
        let (accumulated, amplitude_sum) = accumulate_layers(spec, factory);

        let mut raw_min = f32::MAX;
        let mut raw_max = f32::MIN;
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        let values: Vec<f32> = accumulated
            .into_iter()
            .map(|raw| {
                raw_min = raw_min.min(raw);
                raw_max = raw_max.max(raw);
                let value = redistribute(raw, amplitude_sum, spec.redistribution);
                min = min.min(value);
                max = max.max(value);
                value
            })
            .collect();

        debug!(
            resolution = spec.resolution,
            layers = spec.layers,
            amplitude_sum,
            raw_min,
            raw_max,
            min,
            max,
            "generated elevation grid"
        );

        ElevationGrid::from_raw(spec.resolution, values)
    }
}

/// Generates an elevation grid from a seed.
///
/// Convenience wrapper around [`LayeredNoiseGenerator`] with a ChaCha8-seeded
/// [`NoiseFieldFactory`].
pub fn generate_elevation(spec: &LayerSpec, seed: u64) -> Result<ElevationGrid, GenerateError> {
    let generator = LayeredNoiseGenerator::new(spec.clone())?;
    let mut factory = NoiseFieldFactory::seeded(seed);
    Ok(generator.generate(&mut factory))
}

/// Weight applied to a higher layer at a point with the given slope.
///
/// A slope exactly equal to [`EDGE_DERIVATIVE`] means both forward
/// differences fell off the grid, and the layer is added undamped.
pub fn slope_modifier(gradient: f32) -> f32 {
    if gradient == EDGE_DERIVATIVE {
        1.0
    } else {
        1.0 / (1.0 + gradient)
    }
}

/// Maps an accumulated value into `[-1, 1]`.
///
/// The value is normalized by the amplitude sum into `[0, 1]`, raised to
/// `exponent`, then stretched to the signed range.
pub fn redistribute(raw: f32, amplitude_sum: f32, exponent: f32) -> f32 {
    let normalized = (raw / amplitude_sum).clamp(0.0, 1.0);
    normalized.powf(exponent) * 2.0 - 1.0
}

/// Sums all layers into a row-major buffer, returning it with the total
/// amplitude used.
fn accumulate_layers<R: Rng>(
    spec: &LayerSpec,
    factory: &mut NoiseFieldFactory<R>,
) -> (Vec<f32>, f32) {
    let resolution = spec.resolution as usize;
    let step = spec.step();

    let base = factory.next_field();
    let mut accumulated = sample_layer(&base, spec, spec.frequency);
    let mut amplitude_sum = 1.0f32;

    for layer in 1..spec.layers {
        let field = factory.next_field();
        let amplitude = 1.0 / layer as f32;
        let frequency = spec.frequency * layer as f32;

        let detail = sample_layer(&field, spec, frequency);
        let modifiers = slope_modifiers(&accumulated, resolution, step);

        for ((value, &d), &m) in accumulated.iter_mut().zip(&detail).zip(&modifiers) {
            *value += amplitude * d * m;
        }
        amplitude_sum += amplitude;
    }

    (accumulated, amplitude_sum)
}

/// World coordinate of grid index `i` along either axis.
fn axis_coordinate(spec: &LayerSpec, i: u32) -> f32 {
    -spec.size / 2.0 + i as f32 * spec.step()
}

/// Samples `field` over the grid at `frequency`, row-major.
fn sample_layer(field: &NoiseField, spec: &LayerSpec, frequency: f32) -> Vec<f32> {
    let resolution = spec.resolution;
    let mut out = Vec::with_capacity((resolution as usize) * (resolution as usize));
    for z in 0..resolution {
        let pz = axis_coordinate(spec, z) * frequency;
        for x in 0..resolution {
            let px = axis_coordinate(spec, x) * frequency;
            out.push(field.sample(px, pz));
        }
    }
    out
}

/// Per-point slope modifiers from forward finite differences of `grid`.
fn slope_modifiers(grid: &[f32], resolution: usize, step: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(grid.len());
    for r in 0..resolution {
        for c in 0..resolution {
            let here = grid[r * resolution + c];
            let z_deriv = if r + 1 < resolution {
                (here - grid[(r + 1) * resolution + c]).abs() / step
            } else {
                EDGE_DERIVATIVE
            };
            let x_deriv = if c + 1 < resolution {
                (here - grid[r * resolution + c + 1]).abs() / step
            } else {
                EDGE_DERIVATIVE
            };
            out.push(slope_modifier((x_deriv + z_deriv) / 2.0));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_spec() {
        let spec = LayerSpec {
            resolution: 1,
            ..Default::default()
        };
        assert_eq!(
            LayeredNoiseGenerator::new(spec).unwrap_err(),
            GenerateError::InvalidSpec(LayerSpecError::ResolutionTooSmall(1))
        );

        let spec = LayerSpec {
            layers: 0,
            ..Default::default()
        };
        assert!(generate_elevation(&spec, 1).is_err());
    }

    #[test]
    fn test_single_layer_matches_one_field() {
        let spec = LayerSpec::single_layer(17, 3.0, 2.5);
        let grid = generate_elevation(&spec, 77).unwrap();

        let field = NoiseFieldFactory::seeded(77).next_field();
        for (x, z) in grid.coords() {
            let px = axis_coordinate(&spec, x) * spec.frequency;
            let pz = axis_coordinate(&spec, z) * spec.frequency;
            let expected = field.sample(px, pz) * 2.0 - 1.0;
            assert!(
                (grid.get(x, z) - expected).abs() < 1e-6,
                "mismatch at ({}, {}): {} vs {}",
                x,
                z,
                grid.get(x, z),
                expected
            );
        }
    }

    #[test]
    fn test_output_range_for_any_exponent() {
        for exponent in [0.0, 0.35, 1.0, 2.0, 4.5] {
            let spec = LayerSpec {
                resolution: 24,
                size: 2.0,
                frequency: 3.0,
                layers: 6,
                redistribution: exponent,
            };
            let grid = generate_elevation(&spec, 2024).unwrap();
            let (min, max) = grid.height_range();
            assert!(
                min >= -1.0 && max <= 1.0,
                "exponent {} produced range [{}, {}]",
                exponent,
                min,
                max
            );
        }
    }

    #[test]
    fn test_redistribute_is_monotonic() {
        for exponent in [0.0, 0.5, 1.0, 3.0] {
            let mut previous = f32::MIN;
            for i in 0..=100 {
                let raw = i as f32 / 100.0 * 2.5;
                let value = redistribute(raw, 2.5, exponent);
                assert!(value >= previous);
                previous = value;
            }
        }
    }

    #[test]
    fn test_redistribute_normalizes_before_exponent() {
        // Normalizing first keeps the result in [-1, 1] for exponents above 1.
        // Raising 2n/A instead would send the peak to 2^2 - 1 = 3.
        assert_eq!(redistribute(2.5, 2.5, 2.0), 1.0);
        assert!((redistribute(1.25, 2.5, 2.0) + 0.5).abs() < 1e-6);
        assert_eq!(redistribute(0.0, 2.5, 2.0), -1.0);
        // Unit exponent reduces to n / (A * 0.5) - 1
        assert!((redistribute(1.0, 2.5, 1.0) - (1.0 / 1.25 - 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_three_layers_match_hand_accumulation() {
        let spec = LayerSpec {
            resolution: 5,
            size: 2.0,
            frequency: 1.5,
            layers: 3,
            redistribution: 1.0,
        };
        let grid = generate_elevation(&spec, 3).unwrap();

        let mut factory = NoiseFieldFactory::seeded(3);
        let base = factory.next_field();
        let second = factory.next_field();
        let third = factory.next_field();
        let step = spec.step();

        let mut expected = sample_layer(&base, &spec, 1.5);

        // Layer 1: full amplitude, base frequency
        let detail = sample_layer(&second, &spec, 1.5);
        let modifiers = slope_modifiers(&expected, 5, step);
        for i in 0..expected.len() {
            expected[i] += detail[i] * modifiers[i];
        }

        // Layer 2: half amplitude, double frequency, slopes from the updated grid
        let detail = sample_layer(&third, &spec, 3.0);
        let modifiers = slope_modifiers(&expected, 5, step);
        for i in 0..expected.len() {
            expected[i] += 0.5 * detail[i] * modifiers[i];
        }

        for (i, (&actual, &raw)) in grid.values().iter().zip(&expected).enumerate() {
            let want = (raw / 2.5).clamp(0.0, 1.0) * 2.0 - 1.0;
            assert!(
                (actual - want).abs() < 1e-5,
                "cell {}: {} vs {}",
                i,
                actual,
                want
            );
        }
    }

    #[test]
    fn test_unit_exponent_preserves_order() {
        let spec = LayerSpec::single_layer(12, 1.0, 6.0);
        let grid = generate_elevation(&spec, 5).unwrap();
        let field = NoiseFieldFactory::seeded(5).next_field();

        let raw: Vec<f32> = grid
            .coords()
            .map(|(x, z)| {
                field.sample(
                    axis_coordinate(&spec, x) * spec.frequency,
                    axis_coordinate(&spec, z) * spec.frequency,
                )
            })
            .collect();

        for i in 0..raw.len() {
            for j in 0..raw.len() {
                if raw[i] > raw[j] {
                    assert!(grid.values()[i] >= grid.values()[j]);
                }
            }
        }
    }

    #[test]
    fn test_slope_modifier_edge_case_uses_equality() {
        assert_eq!(slope_modifier(EDGE_DERIVATIVE), 1.0);
        assert_eq!(slope_modifier(0.0), 1.0);
        assert_eq!(slope_modifier(3.0), 0.25);
        assert!((slope_modifier(0.5) - 1.0 / 1.5).abs() < 1e-6);
        // Steeper ground gets less detail
        assert!(slope_modifier(2.0) < slope_modifier(0.2));
    }

    #[test]
    fn test_slope_modifiers_on_known_grid() {
        // 2x2 grid, step 1:
        //   row 0: 0.0  0.5
        //   row 1: 0.25 1.0
        let grid = [0.0, 0.5, 0.25, 1.0];
        let modifiers = slope_modifiers(&grid, 2, 1.0);

        let expected = [
            1.0 / (1.0 + (0.5 + 0.25) / 2.0),
            1.0 / (1.0 + (1.0 + 0.5) / 2.0),
            1.0 / (1.0 + (0.75 + 1.0) / 2.0),
            1.0,
        ];
        for (m, e) in modifiers.iter().zip(expected.iter()) {
            assert!((m - e).abs() < 1e-6, "{} vs {}", m, e);
        }
        // Only the corner with no forward neighbours escapes dampening
        assert!(modifiers[..3].iter().all(|&m| m < 1.0));
    }

    #[test]
    fn test_flat_terrain_gets_full_detail() {
        let grid = vec![0.4; 9];
        let modifiers = slope_modifiers(&grid, 3, 0.5);
        assert_eq!(modifiers[0], 1.0);
        assert_eq!(modifiers[4], 1.0);
    }

    #[test]
    fn test_layer_count_is_not_capped() {
        let spec = LayerSpec {
            resolution: 8,
            layers: 16,
            ..Default::default()
        };
        let generator = LayeredNoiseGenerator::new(spec).unwrap();
        let mut factory = NoiseFieldFactory::seeded(9);
        let grid = generator.generate(&mut factory);
        assert_eq!(factory.issued(), 16);
        assert_eq!(grid.resolution(), 8);
    }

    #[test]
    fn test_generation_reproducibility() {
        let spec = LayerSpec::default();
        let a = generate_elevation(&spec, 31337).unwrap();
        let b = generate_elevation(&spec, 31337).unwrap();
        assert_eq!(a, b);

        let c = generate_elevation(&spec, 31338).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_minimal_grid() {
        let spec = LayerSpec::single_layer(2, 1.0, 1.0);
        let grid = generate_elevation(&spec, 0).unwrap();
        assert_eq!(grid.resolution(), 2);
        assert_eq!(grid.point_count(), 4);
        let (min, max) = grid.height_range();
        assert!(min >= -1.0 && max <= 1.0);
    }
}
