//! Bilinear height and flow sampling at continuous grid positions.
//!
//! Both samplers share the same edge policy: a position whose cell lies
//! within two cells of any edge never reads the outer ring. Heights fall back
//! to the nearest cell in `[2, size - 3]` (clamped per axis) and flow falls
//! back to a random unit direction.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::grid::HeightGrid;

/// Cells closer than this to an edge are sampled through the fallback path.
pub const EDGE_CLAMP: usize = 2;

/// The four corner heights around a position plus its fractional offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    pub fx: f32,
    pub fy: f32,
    pub tl: f32,
    pub tr: f32,
    pub bl: f32,
    pub br: f32,
    /// True if either axis had to be clamped away from the edge.
    pub clamped: bool,
}

impl CellSample {
    /// Bilinear blend of the corner heights.
    #[inline]
    pub fn height(&self) -> f32 {
        let (fx, fy) = (self.fx, self.fy);
        self.tl * (1.0 - fx) * (1.0 - fy)
            + self.tr * fx * (1.0 - fy)
            + self.bl * (1.0 - fx) * fy
            + self.br * fx * fy
    }

    /// Uphill gradient from bilinear-interpolated finite differences.
    #[inline]
    pub fn gradient(&self) -> Vec2 {
        let (fx, fy) = (self.fx, self.fy);
        let dx = (self.tr - self.tl) * (1.0 - fy) + (self.br - self.bl) * fy;
        let dy = (self.bl - self.tl) * (1.0 - fx) + (self.br - self.tr) * fx;
        Vec2::new(dx, dy)
    }
}

/// Clamps one axis to `[EDGE_CLAMP, size - 1 - EDGE_CLAMP]`.
///
/// Returns the cell index, the fractional offset inside it and whether the
/// axis was clamped. A clamped axis samples the cell corner exactly.
#[inline]
fn clamp_axis(coord: f32, size: usize) -> (usize, f32, bool) {
    let floor = coord.floor();
    let cell = floor as isize;
    let lo = EDGE_CLAMP as isize;
    let hi = size as isize - 1 - EDGE_CLAMP as isize;

    if cell < lo {
        (lo as usize, 0.0, true)
    } else if cell > hi {
        (hi as usize, 0.0, true)
    } else {
        (cell as usize, coord - floor, false)
    }
}

/// Gathers the cell containing `pos` (after the edge clamp).
pub fn cell_sample(grid: &HeightGrid, pos: Vec2) -> CellSample {
    let size = grid.size();
    let (x, fx, cx) = clamp_axis(pos.x, size);
    let (y, fy, cy) = clamp_axis(pos.y, size);

    CellSample {
        fx,
        fy,
        tl: grid.get(x, y),
        tr: grid.get(x + 1, y),
        bl: grid.get(x, y + 1),
        br: grid.get(x + 1, y + 1),
        clamped: cx || cy,
    }
}

/// Bilinearly interpolated height at a continuous position.
pub fn sample_bilinear(grid: &HeightGrid, pos: Vec2) -> f32 {
    cell_sample(grid, pos).height()
}

/// Normalized downhill direction at a continuous position.
///
/// Near the edges a random unit vector is returned so droplets keep moving.
/// On flat ground the result is `Vec2::ZERO`, which callers treat as "no flow".
pub fn sample_flow_direction<R: Rng + ?Sized>(grid: &HeightGrid, pos: Vec2, rng: &mut R) -> Vec2 {
    let sample = cell_sample(grid, pos);
    if sample.clamped {
        return random_direction(rng);
    }

    (-sample.gradient()).try_normalize().unwrap_or(Vec2::ZERO)
}

/// Uniformly distributed unit vector.
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.random_range(0.0..TAU))
}
