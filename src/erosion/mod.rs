//! Particle-based hydraulic erosion.
//!
//! Droplets are simulated strictly one after another on the caller's grid.
//! [`run`] is the one-shot entry point; [`ErosionCampaign`] spreads the same
//! particle budget over several calls.

mod config;
pub mod campaign;
pub mod droplet;

pub use campaign::{run, run_with_config, ErosionCampaign, ErosionStats};
pub use config::ErosionConfig;
pub use droplet::{Droplet, DropletReport, StepOutcome, StepTrace, TerminationReason};
