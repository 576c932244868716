//! Layered lattice noise with a radial island falloff.

use glam::Vec2;
use ::noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::error::{check_grid_size, ConfigError};
use crate::terrain::HeightGrid;

/// Fixed permutation seed for the lattice. The user seed shifts the sample
/// coordinates instead, so identical inputs always hit identical lattice cells.
const LATTICE_SEED: u32 = 0;

/// Sum of the per-octave maximum contributions of the two-octave baseline.
/// Kept constant for every octave count so heights stay in a stable range.
pub const HEIGHT_SCALE_DIVISOR: f32 = 8.0;

/// Octave multipliers beyond 2^23 exceed f32 integer precision.
pub const MAX_OCTAVES: u32 = 24;

/// Configuration for island heightmap generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandNoiseConfig {
    /// Grid side length in cells (>= 5).
    pub size: usize,
    /// Coordinate offset applied to every sample.
    pub seed: i32,
    /// Number of noise octaves (>= 1).
    pub octaves: u32,
}

impl Default for IslandNoiseConfig {
    fn default() -> Self {
        Self {
            size: 257,
            seed: 0,
            octaves: 2,
        }
    }
}

impl IslandNoiseConfig {
    /// Creates a new configuration with the given seed.
    pub fn with_seed(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Rejects sizes and octave counts the generator cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_grid_size(self.size)?;
        if self.octaves == 0 {
            return Err(ConfigError::NoOctaves);
        }
        if self.octaves > MAX_OCTAVES {
            return Err(ConfigError::TooManyOctaves(self.octaves));
        }
        Ok(())
    }
}

/// Smooth lattice noise remapped to [0, 1].
pub struct ValueNoise {
    perlin: Perlin,
}

impl Default for ValueNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueNoise {
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(LATTICE_SEED),
        }
    }

    /// Samples the noise field. Integer lattice points return exactly 0.5.
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f32 {
        let n = self.perlin.get([x, y]);
        ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}

/// Generates an island heightmap.
///
/// Each cell accumulates `1/m + noise((x + seed) * m / (size/2), ...)` for
/// octave multipliers `m = 1, 2, 4, ...`, subtracts its distance to the grid
/// center divided by `size`, then divides by [`HEIGHT_SCALE_DIVISOR`].
///
/// # Errors
/// Returns [`ConfigError`] if `size < 5`, `octaves == 0` or `octaves` is
/// above [`MAX_OCTAVES`].
pub fn generate(size: usize, seed: i32, octaves: u32) -> Result<HeightGrid, ConfigError> {
    generate_island(&IslandNoiseConfig { size, seed, octaves })
}

/// Config-driven form of [`generate`].
pub fn generate_island(config: &IslandNoiseConfig) -> Result<HeightGrid, ConfigError> {
    config.validate()?;

    let size = config.size;
    let half = (size / 2) as f64;
    let center = Vec2::splat((size / 2) as f32);
    let noise = ValueNoise::new();
    let multipliers: Vec<f64> = (0..config.octaves).map(|o| (1u64 << o) as f64).collect();
    let seed = config.seed as i64;

    let grid = HeightGrid::from_fn(size, |x, y| {
        let sx = (x as i64 + seed) as f64;
        let sy = (y as i64 + seed) as f64;

        let mut value = 0.0f32;
        for &m in &multipliers {
            value += (1.0 / m) as f32 + noise.sample(sx * m / half, sy * m / half);
        }

        // Island falloff
        let pos = Vec2::new(x as f32, y as f32);
        value -= (center - pos).length() / size as f32;

        value / HEIGHT_SCALE_DIVISOR
    });

    log::debug!(
        "Generated {0}x{0} island (seed {1}, {2} octaves)",
        size,
        config.seed,
        config.octaves
    );
    Ok(grid)
}
