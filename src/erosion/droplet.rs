//! Single water droplet state machine.
//!
//! A droplet walks down the interpolated flow field one step at a time,
//! eroding the cell it leaves while under capacity and depositing into it
//! while over capacity. Every write touches exactly one cell and is visible
//! to the next step and to later droplets.

use std::collections::HashSet;

use glam::{IVec2, Vec2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::erosion::ErosionConfig;
use crate::terrain::{sample_bilinear, sample_flow_direction, HeightGrid};

/// Why a droplet stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The step started inside the one-cell outer margin.
    EdgeMargin,
    /// Flat ground: the flow direction was the zero vector.
    NoFlow,
    /// The move carried the droplet outside the grid.
    LeftGrid,
    /// The droplet entered a cell it had already visited.
    Revisited,
    /// The step budget ran out.
    StepsExhausted,
}

impl TerminationReason {
    pub const ALL: [TerminationReason; 5] = [
        TerminationReason::EdgeMargin,
        TerminationReason::NoFlow,
        TerminationReason::LeftGrid,
        TerminationReason::Revisited,
        TerminationReason::StepsExhausted,
    ];

    /// Dense index into [`TerminationReason::ALL`].
    pub fn index(self) -> usize {
        match self {
            TerminationReason::EdgeMargin => 0,
            TerminationReason::NoFlow => 1,
            TerminationReason::LeftGrid => 2,
            TerminationReason::Revisited => 3,
            TerminationReason::StepsExhausted => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TerminationReason::EdgeMargin => "edge margin",
            TerminationReason::NoFlow => "no flow",
            TerminationReason::LeftGrid => "left grid",
            TerminationReason::Revisited => "revisited cell",
            TerminationReason::StepsExhausted => "steps exhausted",
        }
    }
}

/// What one completed step did to the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepTrace {
    /// Cell the droplet left, which received the height change.
    pub cell: IVec2,
    /// Signed height change written to `cell` (negative = erosion).
    pub height_change: f32,
    /// Carried sediment after the step.
    pub sediment: f32,
}

/// Result of [`Droplet::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    Flowing(StepTrace),
    Terminated(TerminationReason),
}

/// Summary of a droplet run to termination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropletReport {
    pub reason: TerminationReason,
    /// Completed steps.
    pub steps: u32,
    /// Total material removed from the grid.
    pub eroded: f32,
    /// Total material added to the grid.
    pub deposited: f32,
    /// Largest single-step change magnitude.
    pub max_change: f32,
}

/// A simulated water particle.
#[derive(Debug, Clone)]
pub struct Droplet {
    /// Continuous grid-space position.
    pub position: Vec2,
    /// Direction of the last move; its length is not the speed.
    pub velocity: Vec2,
    pub speed: f32,
    pub sediment: f32,
    pub remaining_steps: u32,
    visited: HashSet<IVec2>,
}

impl Droplet {
    /// Creates a droplet with an empty load and no visited cells.
    pub fn new(position: Vec2, iterations: u32, initial_speed: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            speed: initial_speed,
            sediment: 0.0,
            remaining_steps: iterations,
            visited: HashSet::new(),
        }
    }

    /// Spawns a droplet at a uniformly random interior position.
    ///
    /// Both coordinates are drawn from `[1, size - 1)`.
    ///
    /// # Panics
    /// Panics if `size < 3`, where that interval is empty. Campaigns reject
    /// such grids before spawning.
    pub fn spawn<R: Rng + ?Sized>(size: usize, config: &ErosionConfig, rng: &mut R) -> Self {
        let hi = (size - 1) as f32;
        let x = rng.random_range(1.0..hi);
        let y = rng.random_range(1.0..hi);
        Self::new(Vec2::new(x, y), config.iterations_per_particle, config.initial_speed)
    }

    /// Cells entered so far.
    pub fn visited(&self) -> &HashSet<IVec2> {
        &self.visited
    }

    /// Advances the droplet by one step.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        grid: &mut HeightGrid,
        config: &ErosionConfig,
        rng: &mut R,
    ) -> StepOutcome {
        if self.remaining_steps == 0 {
            return StepOutcome::Terminated(TerminationReason::StepsExhausted);
        }

        let size = grid.size();
        let current_cell = self.position.floor().as_ivec2();
        if in_margin(current_cell, size) {
            return StepOutcome::Terminated(TerminationReason::EdgeMargin);
        }

        let direction = sample_flow_direction(grid, self.position, rng);
        if direction == Vec2::ZERO {
            return StepOutcome::Terminated(TerminationReason::NoFlow);
        }

        self.velocity = direction;
        self.position += self.velocity * self.speed;

        let extent = size as f32;
        if !(self.position.x >= 0.0
            && self.position.y >= 0.0
            && self.position.x < extent
            && self.position.y < extent)
        {
            return StepOutcome::Terminated(TerminationReason::LeftGrid);
        }

        let new_cell = self.position.floor().as_ivec2();
        if !self.visited.insert(new_cell) {
            return StepOutcome::Terminated(TerminationReason::Revisited);
        }

        let old_height = sample_bilinear(grid, current_cell.as_vec2());
        let new_height = sample_bilinear(grid, self.position);
        // Positive when moving downhill.
        let delta_height = old_height - new_height;

        let capacity = (-delta_height * self.speed).max(config.min_sediment_capacity);

        let height_change = if self.sediment < capacity {
            let amount = (capacity - self.sediment)
                .min((-delta_height).max(0.0))
                .min(config.max_step_change);
            self.sediment += amount;
            -amount
        } else {
            let excess = if delta_height > 0.0 {
                delta_height.min(self.sediment)
            } else {
                self.sediment - capacity
            };
            let amount = excess.min(config.max_step_change);
            self.sediment -= amount;
            amount
        };

        // current_cell is outside the margin, so both coordinates are in [1, size - 1).
        let (cx, cy) = (current_cell.x as usize, current_cell.y as usize);
        if height_change != 0.0 {
            grid.add(cx, cy, height_change);
            log::trace!("Changed ({}, {}) by {}", cx, cy, height_change);
        }

        let energy = self.speed * self.speed + delta_height * config.gravity;
        self.speed = energy.max(0.0).sqrt();

        self.remaining_steps -= 1;

        StepOutcome::Flowing(StepTrace {
            cell: current_cell,
            height_change,
            sediment: self.sediment,
        })
    }

    /// Steps until the droplet terminates.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        grid: &mut HeightGrid,
        config: &ErosionConfig,
        rng: &mut R,
    ) -> DropletReport {
        let mut steps = 0u32;
        let mut eroded = 0.0f32;
        let mut deposited = 0.0f32;
        let mut max_change = 0.0f32;

        loop {
            match self.step(grid, config, rng) {
                StepOutcome::Flowing(trace) => {
                    steps += 1;
                    if trace.height_change < 0.0 {
                        eroded -= trace.height_change;
                    } else {
                        deposited += trace.height_change;
                    }
                    max_change = max_change.max(trace.height_change.abs());
                }
                StepOutcome::Terminated(reason) => {
                    return DropletReport {
                        reason,
                        steps,
                        eroded,
                        deposited,
                        max_change,
                    };
                }
            }
        }
    }
}

/// True if `cell` lies in the outermost one-cell ring or beyond.
#[inline]
fn in_margin(cell: IVec2, size: usize) -> bool {
    let last = size as i32 - 1;
    cell.x < 1 || cell.y < 1 || cell.x >= last || cell.y >= last
}
