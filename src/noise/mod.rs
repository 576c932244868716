//! Island terrain synthesis.
//!
//! Uses Perlin lattice noise from the `noise` crate, layered over octave
//! multipliers and shaped by a radial falloff.

mod island;

pub use island::{generate, generate_island, IslandNoiseConfig, ValueNoise, HEIGHT_SCALE_DIVISOR, MAX_OCTAVES};
