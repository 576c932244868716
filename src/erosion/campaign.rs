//! Sequential droplet campaigns over a height grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::erosion::droplet::{Droplet, DropletReport, TerminationReason};
use crate::erosion::ErosionConfig;
use crate::error::{check_grid_size, ConfigError};
use crate::terrain::HeightGrid;

/// Aggregate statistics of one or more campaign runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErosionStats {
    /// Droplets simulated.
    pub particles: u32,
    /// Completed droplet steps.
    pub steps: u64,
    /// Total material removed from the grid.
    pub total_eroded: f64,
    /// Total material added to the grid.
    pub total_deposited: f64,
    /// Largest single-step height change.
    pub max_step_change: f32,
    /// Droplet count per [`TerminationReason`], indexed by `TerminationReason::index`.
    pub terminations: [u32; 5],
}

impl ErosionStats {
    /// Folds one droplet's report into the totals.
    pub fn record(&mut self, report: &DropletReport) {
        self.particles += 1;
        self.steps += report.steps as u64;
        self.total_eroded += report.eroded as f64;
        self.total_deposited += report.deposited as f64;
        self.max_step_change = self.max_step_change.max(report.max_change);
        self.terminations[report.reason.index()] += 1;
    }

    /// Adds another run's totals to this one.
    pub fn merge(&mut self, other: &ErosionStats) {
        self.particles += other.particles;
        self.steps += other.steps;
        self.total_eroded += other.total_eroded;
        self.total_deposited += other.total_deposited;
        self.max_step_change = self.max_step_change.max(other.max_step_change);
        for (a, b) in self.terminations.iter_mut().zip(other.terminations.iter()) {
            *a += b;
        }
    }

    /// Droplets that ended for `reason`.
    pub fn terminated_by(&self, reason: TerminationReason) -> u32 {
        self.terminations[reason.index()]
    }

    /// Net height added to the grid (negative when erosion dominates).
    pub fn net_change(&self) -> f64 {
        self.total_deposited - self.total_eroded
    }

    /// Mean completed steps per droplet.
    pub fn mean_steps(&self) -> f64 {
        if self.particles == 0 {
            0.0
        } else {
            self.steps as f64 / self.particles as f64
        }
    }
}

/// Runs `particle_count` droplets with default tunables.
///
/// Each droplet starts at a uniformly random position in `[1, size - 1)` and
/// runs for at most `iterations_per_particle` steps. The grid is mutated in
/// place; a fixed random sequence always produces the same grid.
///
/// # Errors
/// Returns [`ConfigError`] before touching the grid if `grid.size() < 5` or
/// `iterations_per_particle == 0`.
pub fn run<R: Rng + ?Sized>(
    grid: &mut HeightGrid,
    particle_count: u32,
    iterations_per_particle: u32,
    rng: &mut R,
) -> Result<ErosionStats, ConfigError> {
    let config = ErosionConfig::with_particles(particle_count, iterations_per_particle);
    run_with_config(grid, &config, rng)
}

/// Runs `config.particle_count` droplets with explicit tunables.
pub fn run_with_config<R: Rng + ?Sized>(
    grid: &mut HeightGrid,
    config: &ErosionConfig,
    rng: &mut R,
) -> Result<ErosionStats, ConfigError> {
    config.validate()?;
    check_grid_size(grid.size())?;

    let stats = simulate_particles(grid, config, config.particle_count, rng);
    log::debug!(
        "Eroded {} particles: {} steps, eroded {:.6}, deposited {:.6}",
        stats.particles,
        stats.steps,
        stats.total_eroded,
        stats.total_deposited
    );
    Ok(stats)
}

fn simulate_particles<R: Rng + ?Sized>(
    grid: &mut HeightGrid,
    config: &ErosionConfig,
    count: u32,
    rng: &mut R,
) -> ErosionStats {
    let mut stats = ErosionStats::default();
    for _ in 0..count {
        let mut droplet = Droplet::spawn(grid.size(), config, rng);
        let report = droplet.run(grid, config, rng);
        stats.record(&report);
    }
    stats
}

/// A campaign that can be advanced in batches.
///
/// Owns its seeded RNG and particle counter, so calling [`run_batch`] with
/// small counts until [`is_finished`] yields exactly the grid a single run of
/// `config.particle_count` droplets would.
///
/// [`run_batch`]: ErosionCampaign::run_batch
/// [`is_finished`]: ErosionCampaign::is_finished
#[derive(Debug, Clone)]
pub struct ErosionCampaign {
    config: ErosionConfig,
    grid_size: usize,
    rng: ChaCha8Rng,
    completed: u32,
    stats: ErosionStats,
}

impl ErosionCampaign {
    /// Creates a campaign bound to grids of side `grid_size`.
    pub fn new(grid_size: usize, config: ErosionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        check_grid_size(grid_size)?;
        Ok(Self {
            config,
            grid_size,
            rng: ChaCha8Rng::seed_from_u64(seed),
            completed: 0,
            stats: ErosionStats::default(),
        })
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Droplets simulated so far.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    /// Droplets still to simulate.
    pub fn remaining(&self) -> u32 {
        self.config.particle_count - self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Fraction of the particle budget completed, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.config.particle_count == 0 {
            1.0
        } else {
            self.completed as f32 / self.config.particle_count as f32
        }
    }

    /// Totals accumulated across all batches.
    pub fn stats(&self) -> &ErosionStats {
        &self.stats
    }

    /// Simulates up to `max_particles` of the remaining droplets.
    ///
    /// # Errors
    /// Returns [`ConfigError::SizeMismatch`] if the grid does not have the
    /// side length the campaign was created for.
    pub fn run_batch(&mut self, grid: &mut HeightGrid, max_particles: u32) -> Result<ErosionStats, ConfigError> {
        if grid.size() != self.grid_size {
            return Err(ConfigError::SizeMismatch {
                expected: self.grid_size,
                actual: grid.size(),
            });
        }

        let count = max_particles.min(self.remaining());
        let batch = simulate_particles(grid, &self.config, count, &mut self.rng);
        self.completed += count;
        self.stats.merge(&batch);
        Ok(batch)
    }

    /// Simulates every remaining droplet.
    pub fn run_to_completion(&mut self, grid: &mut HeightGrid) -> Result<ErosionStats, ConfigError> {
        let remaining = self.remaining();
        self.run_batch(grid, remaining)
    }
}
