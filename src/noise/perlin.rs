//! 2D gradient noise ("Improved Noise" style) backed by a shuffled permutation table.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Number of distinct lattice hashes.
const TABLE_SIZE: usize = 256;

/// Errors that can occur when building a noise field from an explicit table.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NoiseError {
    #[error("Permutation table is missing value {0}")]
    NotAPermutation(u8),
}

/// A single gradient-noise source.
///
/// Owns one permutation of `[0, 255]`, stored twice back to back so that
/// corner lookups at `X + 1` and `Z + 1` never wrap. The table is fixed at
/// construction; sampling never mutates the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseField {
    permutation: [u8; TABLE_SIZE * 2],
}

impl NoiseField {
    /// Builds a field whose permutation is a Fisher–Yates shuffle driven by `rng`.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut p = [0u8; TABLE_SIZE];
        for (i, slot) in p.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for i in (1..TABLE_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            p.swap(i, j);
        }
        Self::doubled(p)
    }

    /// Builds a field from an explicit permutation of `[0, 255]`.
    ///
    /// # Returns
    /// An error naming the first value that does not appear in `permutation`.
    pub fn from_permutation(permutation: [u8; TABLE_SIZE]) -> Result<Self, NoiseError> {
        let mut seen = [false; TABLE_SIZE];
        for &value in &permutation {
            seen[value as usize] = true;
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(NoiseError::NotAPermutation(missing as u8));
        }
        Ok(Self::doubled(permutation))
    }

    fn doubled(p: [u8; TABLE_SIZE]) -> Self {
        let mut permutation = [0u8; TABLE_SIZE * 2];
        permutation[..TABLE_SIZE].copy_from_slice(&p);
        permutation[TABLE_SIZE..].copy_from_slice(&p);
        Self { permutation }
    }

    /// Returns the full 512-entry lookup table.
    pub fn permutation(&self) -> &[u8; TABLE_SIZE * 2] {
        &self.permutation
    }

    /// Samples the field at `(x, z)`.
    ///
    /// # Returns
    /// A value in `[0, 1]`. The raw gradient noise lives in `[-1, 1]` and is
    /// remapped here, so callers never see the signed range.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let p = &self.permutation;

        let x_floor = x.floor();
        let z_floor = z.floor();
        let xi = (x_floor as i32 & 255) as usize;
        let zi = (z_floor as i32 & 255) as usize;

        let xf = x - x_floor;
        let zf = z - z_floor;

        let u = fade(xf);
        let v = fade(zf);

        // Hash the four cell corners
        let a = p[xi + p[zi] as usize];
        let b = p[xi + p[zi + 1] as usize];
        let c = p[xi + 1 + p[zi] as usize];
        let d = p[xi + 1 + p[zi + 1] as usize];

        let x1 = lerp(grad(a, xf, zf), grad(c, xf - 1.0, zf), u);
        let x2 = lerp(grad(b, xf, zf - 1.0), grad(d, xf - 1.0, zf - 1.0), u);
        let value = lerp(x1, x2, v);

        ((value + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
pub fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Blends `a` toward `b` by weight `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Picks one of four diagonal gradients from the low two bits of `hash`
/// and dots it with the corner offset.
pub fn grad(hash: u8, dx: f32, dz: f32) -> f32 {
    let h = hash & 3;
    let u = if h < 2 { dx } else { -dx };
    let v = if h & 1 == 1 { dz } else { -dz };
    u + v
}

/// Hands out independent noise fields, one per request.
///
/// Each field draws a fresh permutation from the same random stream, so a
/// seeded factory reproduces the same sequence of fields.
#[derive(Debug, Clone)]
pub struct NoiseFieldFactory<R = ChaCha8Rng> {
    rng: R,
    issued: usize,
}

impl NoiseFieldFactory<ChaCha8Rng> {
    /// Creates a factory backed by a ChaCha8 stream seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseFieldFactory<R> {
    /// Creates a factory that shuffles permutations with `rng`.
    pub fn from_rng(rng: R) -> Self {
        Self { rng, issued: 0 }
    }

    /// Builds the next field in the sequence.
    pub fn next_field(&mut self) -> NoiseField {
        self.issued += 1;
        NoiseField::new(&mut self.rng)
    }

    /// Number of fields handed out so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}
