//! Island heightmap generator with particle-based hydraulic erosion.
//!
//! This crate generates a square heightmap from layered lattice noise with an
//! island falloff, erodes it by simulating water droplets one at a time, and
//! optionally smooths the result with a box or Gaussian filter.

pub mod error;
pub mod terrain;
pub mod noise;
pub mod erosion;
pub mod smoothing;
pub mod pipeline;
pub mod export;

pub use error::ConfigError;
pub use terrain::HeightGrid;
pub use crate::noise::{generate, IslandNoiseConfig};
pub use erosion::{run, ErosionCampaign, ErosionConfig, ErosionStats};
pub use smoothing::{smooth, SmoothingKind};
pub use pipeline::{ErosionStage, GenerationStage, HeightmapStage, Pipeline, SmoothingStage, StageConfig};
