//! Configuration errors shared by the generator, erosion and pipeline layers.

use thiserror::Error;

/// Smallest grid side the sampling clamp policy can operate on.
pub const MIN_GRID_SIZE: usize = 5;

/// Misuse of the public API detected before any grid is touched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Grid size {0} is too small (minimum {min})", min = MIN_GRID_SIZE)]
    GridTooSmall(usize),
    #[error("Octave count must be at least 1")]
    NoOctaves,
    #[error("Octave count {0} overflows the octave multiplier")]
    TooManyOctaves(u32),
    #[error("Iterations per particle must be at least 1")]
    NoIterations,
    #[error("Minimum sediment capacity {0} must lie in [0, 1]")]
    InvalidMinCapacity(f32),
    #[error("Parameter '{0}' must be finite and non-negative, got {1}")]
    InvalidParameter(&'static str, f32),
    #[error("Grid side {actual} does not match configured size {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Checks a grid side length against [`MIN_GRID_SIZE`].
pub fn check_grid_size(size: usize) -> Result<(), ConfigError> {
    if size < MIN_GRID_SIZE {
        return Err(ConfigError::GridTooSmall(size));
    }
    Ok(())
}
