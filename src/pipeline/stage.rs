//! Generation stage trait and pipeline orchestration.

use thiserror::Error;

use crate::erosion::{ErosionCampaign, ErosionConfig, ErosionStats};
use crate::error::ConfigError;
use crate::noise::{generate_island, IslandNoiseConfig};
use crate::smoothing::{smooth, SmoothingKind};
use crate::terrain::HeightGrid;

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Island heightmap from layered noise.
    Heightmap,
    /// Droplet erosion campaign.
    Erosion,
    /// Post-process smoothing.
    Smoothing,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Heightmap => "heightmap",
            StageId::Erosion => "erosion",
            StageId::Smoothing => "smoothing",
        }
    }
}

/// Configuration shared by every stage.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    /// Declared grid size, seed and octaves of the terrain.
    pub noise: IslandNoiseConfig,
}

impl StageConfig {
    /// Creates a new configuration with the given noise settings.
    pub fn with_noise(noise: IslandNoiseConfig) -> Self {
        Self { noise }
    }

    /// Side length every stage expects.
    pub fn size(&self) -> usize {
        self.noise.size
    }
}

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Stage '{0}' failed: {1}")]
    StageFailed(String, String),
    #[error("Missing dependency: stage '{0}' requires '{1}'")]
    MissingDependency(String, String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// What a stage produced besides its grid changes.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput {
    /// The grid was (re)written.
    Heights,
    /// An erosion campaign ran.
    Erosion(ErosionStats),
}

/// Trait for implementing generation stages.
///
/// Each stage transforms the grid in place, building upon previous stages.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must be executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the stage, modifying the grid in place.
    fn execute(&self, grid: &mut HeightGrid, config: &StageConfig) -> Result<StageOutput, PipelineError>;

    /// Optional progress callback for long-running stages.
    ///
    /// # Arguments
    /// * `progress` - Value from 0.0 to 1.0 indicating completion
    fn on_progress(&self, _progress: f32) {
        // Default: do nothing
    }
}

/// Outputs collected from a pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// Names of the stages that completed, in order.
    pub completed: Vec<String>,
    /// Statistics of every erosion stage, merged.
    pub erosion: Option<ErosionStats>,
}

/// Orchestrates multiple generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    config: StageConfig,
}

impl Pipeline {
    /// Creates a new empty pipeline with the given configuration.
    pub fn new(config: StageConfig) -> Self {
        Self {
            stages: Vec::new(),
            config,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Creates a grid of the configured size and runs every stage on it.
    pub fn generate(&self) -> Result<(HeightGrid, PipelineReport), PipelineError> {
        self.generate_with_callbacks(|_, _, _| {}, |_, _, _| {})
    }

    /// [`generate`](Pipeline::generate) with progress callbacks.
    pub fn generate_with_callbacks<F1, F2>(
        &self,
        on_stage_start: F1,
        on_stage_complete: F2,
    ) -> Result<(HeightGrid, PipelineReport), PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        self.config.noise.validate()?;
        let mut grid = HeightGrid::new(self.config.size());
        let report = self.run_with_callbacks(&mut grid, on_stage_start, on_stage_complete)?;
        Ok((grid, report))
    }

    /// Executes all stages in order on the given grid.
    pub fn run(&self, grid: &mut HeightGrid) -> Result<PipelineReport, PipelineError> {
        self.run_with_callbacks(grid, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with progress callbacks.
    ///
    /// # Arguments
    /// * `grid` - The grid to transform
    /// * `on_stage_start` - Called when each stage begins
    /// * `on_stage_complete` - Called when each stage finishes
    pub fn run_with_callbacks<F1, F2>(
        &self,
        grid: &mut HeightGrid,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<PipelineReport, PipelineError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        if grid.size() != self.config.size() {
            return Err(ConfigError::SizeMismatch {
                expected: self.config.size(),
                actual: grid.size(),
            }
            .into());
        }

        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();
        let mut report = PipelineReport::default();

        for (i, stage) in self.stages.iter().enumerate() {
            on_stage_start(stage.name(), i, total);

            // Check dependencies
            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(PipelineError::MissingDependency(
                        stage.name().to_string(),
                        dep.name().to_string(),
                    ));
                }
            }

            match stage.execute(grid, &self.config)? {
                StageOutput::Heights => {}
                StageOutput::Erosion(stats) => {
                    report.erosion.get_or_insert_with(ErosionStats::default).merge(&stats);
                }
            }
            completed.push(stage.id());
            report.completed.push(stage.name().to_string());

            on_stage_complete(stage.name(), i, total);
        }

        Ok(report)
    }
}

/// Island heightmap generation stage.
pub struct HeightmapStage;

impl GenerationStage for HeightmapStage {
    fn id(&self) -> StageId {
        StageId::Heightmap
    }

    fn name(&self) -> &str {
        "Heightmap Generation"
    }

    fn execute(&self, grid: &mut HeightGrid, config: &StageConfig) -> Result<StageOutput, PipelineError> {
        if grid.size() != config.noise.size {
            return Err(ConfigError::SizeMismatch {
                expected: config.noise.size,
                actual: grid.size(),
            }
            .into());
        }
        *grid = generate_island(&config.noise)?;
        Ok(StageOutput::Heights)
    }
}

/// Droplet erosion stage.
pub struct ErosionStage {
    pub config: ErosionConfig,
    /// Seed of the campaign's random source.
    pub seed: u64,
    /// Droplets per progress report.
    pub batch_size: u32,
}

impl ErosionStage {
    pub fn new(config: ErosionConfig, seed: u64) -> Self {
        let batch_size = (config.particle_count / 10).max(1);
        Self {
            config,
            seed,
            batch_size,
        }
    }
}

impl GenerationStage for ErosionStage {
    fn id(&self) -> StageId {
        StageId::Erosion
    }

    fn name(&self) -> &str {
        "Droplet Erosion"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, grid: &mut HeightGrid, _config: &StageConfig) -> Result<StageOutput, PipelineError> {
        let mut campaign = ErosionCampaign::new(grid.size(), self.config.clone(), self.seed)?;
        while !campaign.is_finished() {
            campaign.run_batch(grid, self.batch_size.max(1))?;
            self.on_progress(campaign.progress());
        }

        if !grid.is_finite() {
            return Err(PipelineError::StageFailed(
                self.name().to_string(),
                "erosion produced non-finite heights".to_string(),
            ));
        }
        Ok(StageOutput::Erosion(campaign.stats().clone()))
    }

    fn on_progress(&self, progress: f32) {
        log::debug!("{}: {:.0}%", self.name(), progress * 100.0);
    }
}

/// Post-process smoothing stage.
pub struct SmoothingStage {
    pub kind: SmoothingKind,
}

impl SmoothingStage {
    pub fn new(kind: SmoothingKind) -> Self {
        Self { kind }
    }
}

impl GenerationStage for SmoothingStage {
    fn id(&self) -> StageId {
        StageId::Smoothing
    }

    fn name(&self) -> &str {
        "Smoothing"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Heightmap]
    }

    fn execute(&self, grid: &mut HeightGrid, _config: &StageConfig) -> Result<StageOutput, PipelineError> {
        *grid = smooth(grid, self.kind);
        Ok(StageOutput::Heights)
    }
}
