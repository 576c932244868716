//! Box and Gaussian smoothing passes.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::kernel::{FilterKernel, GAUSSIAN_7};
use crate::terrain::HeightGrid;

/// Post-process filter applied after erosion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum SmoothingKind {
    /// Leave heights untouched.
    #[default]
    None,
    /// 3x3 mean over interior cells; the outer ring is copied.
    BoxAverage,
    /// Separable 7-tap Gaussian over every cell.
    Gaussian,
}

impl SmoothingKind {
    pub fn name(&self) -> &'static str {
        match self {
            SmoothingKind::None => "none",
            SmoothingKind::BoxAverage => "box average",
            SmoothingKind::Gaussian => "gaussian",
        }
    }
}

/// Returns a smoothed copy of `grid`. The input is never modified.
pub fn smooth(grid: &HeightGrid, kind: SmoothingKind) -> HeightGrid {
    let out = match kind {
        SmoothingKind::None => grid.clone(),
        SmoothingKind::BoxAverage => box_average(grid),
        SmoothingKind::Gaussian => gaussian_blur(grid),
    };
    log::debug!("Smoothed {0}x{0} grid ({1})", grid.size(), kind.name());
    out
}

/// Replaces each interior cell with the mean of its 3x3 neighbourhood.
///
/// The outermost ring is copied from the source unchanged.
pub fn box_average(grid: &HeightGrid) -> HeightGrid {
    let size = grid.size();
    let mut out = grid.clone();

    for y in 1..size.saturating_sub(1) {
        for x in 1..size - 1 {
            let mut sum = 0.0f32;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    sum += grid.get(nx, ny);
                }
            }
            out.set(x, y, sum / 9.0);
        }
    }

    out
}

/// Two-pass separable Gaussian blur with [`GAUSSIAN_7`].
pub fn gaussian_blur(grid: &HeightGrid) -> HeightGrid {
    separable_blur(grid, &GAUSSIAN_7)
}

/// Convolves rows into a temporary grid, then columns of that grid.
pub fn separable_blur(grid: &HeightGrid, kernel: &FilterKernel) -> HeightGrid {
    let size = grid.size();

    let horizontal = HeightGrid::from_fn(size, |x, y| {
        let row = grid.row(y);
        kernel.apply(x, size, |i| row[i])
    });

    HeightGrid::from_fn(size, |x, y| kernel.apply(y, size, |i| horizontal.get(x, i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interior_plateau(size: usize) -> HeightGrid {
        HeightGrid::from_fn(size, |x, y| {
            if x == 0 || y == 0 || x == size - 1 || y == size - 1 {
                0.0
            } else {
                1.0
            }
        })
    }

    fn bumpy(size: usize) -> HeightGrid {
        HeightGrid::from_fn(size, |x, y| ((x * 7 + y * 13) % 5) as f32 * 0.1)
    }

    #[test]
    fn test_kind_parses_from_cli_names() {
        assert_eq!(SmoothingKind::from_str("none", false), Ok(SmoothingKind::None));
        assert_eq!(SmoothingKind::from_str("box-average", false), Ok(SmoothingKind::BoxAverage));
        assert_eq!(SmoothingKind::from_str("Gaussian", true), Ok(SmoothingKind::Gaussian));
        assert!(SmoothingKind::from_str("median", false).is_err());
    }

    #[test]
    fn test_none_is_identity() {
        let grid = bumpy(9);
        assert_eq!(smooth(&grid, SmoothingKind::None), grid);
    }

    #[test]
    fn test_dimensions_preserved() {
        let grid = bumpy(13);
        for kind in [SmoothingKind::None, SmoothingKind::BoxAverage, SmoothingKind::Gaussian] {
            let out = smooth(&grid, kind);
            assert_eq!(out.size(), 13);
            assert_eq!(out.cell_count(), 169);
        }
    }

    #[test]
    fn test_box_average_keeps_boundary_ring() {
        let grid = bumpy(11);
        let out = box_average(&grid);
        for (x, y) in grid.cell_coords().filter(|&(x, y)| grid.is_boundary(x, y)) {
            assert_eq!(out.get(x, y), grid.get(x, y));
        }
    }

    #[test]
    fn test_box_average_plateau() {
        let grid = interior_plateau(9);
        let out = box_average(&grid);

        for (x, y) in out.cell_coords() {
            if grid.is_boundary(x, y) {
                assert_eq!(out.get(x, y), 0.0);
            } else if (2..7).contains(&x) && (2..7).contains(&y) {
                // Window entirely inside the plateau.
                assert!((out.get(x, y) - 1.0).abs() < 1e-6);
            }
        }
        // Cells next to the ring average in their zero neighbours.
        assert!((out.get(1, 1) - 4.0 / 9.0).abs() < 1e-6);
        assert!((out.get(4, 1) - 6.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_box_average_mean() {
        let grid = HeightGrid::from_fn(5, |x, y| (x + y * 5) as f32);
        let out = box_average(&grid);
        // Linear field: the 3x3 mean equals the center value.
        assert!((out.get(2, 2) - 12.0).abs() < 1e-5);
        assert!((out.get(1, 3) - 16.0).abs() < 1e-5);
    }

    #[test]
    fn test_input_unmodified() {
        let grid = bumpy(9);
        let copy = grid.clone();
        let _ = smooth(&grid, SmoothingKind::BoxAverage);
        let _ = smooth(&grid, SmoothingKind::Gaussian);
        assert_eq!(grid, copy);
    }

    #[test]
    fn test_gaussian_preserves_constant_field() {
        let grid = HeightGrid::filled(16, 0.75);
        let out = gaussian_blur(&grid);
        for &h in out.heights() {
            assert!((h - 0.75).abs() < 1e-5);
        }
    }

    #[test]
    fn test_gaussian_spreads_impulse() {
        let mut grid = HeightGrid::new(15);
        grid.set(7, 7, 1.0);
        let out = gaussian_blur(&grid);

        let center = out.get(7, 7);
        let w0 = GAUSSIAN_7.taps()[3].1;
        assert!((center - w0 * w0).abs() < 1e-6);
        assert!(out.get(6, 7) < center && out.get(6, 7) > 0.0);
        assert!((out.get(6, 7) - out.get(8, 7)).abs() < 1e-7);
        assert!((out.get(7, 5) - out.get(5, 7)).abs() < 1e-7);
        assert_eq!(out.get(3, 7), 0.0);
        // Interior mass is conserved when no tap crosses the edge.
        let total: f32 = out.heights().iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_gaussian_reduces_variation() {
        let grid = bumpy(17);
        let out = gaussian_blur(&grid);
        let spread = |g: &HeightGrid| {
            let (lo, hi) = g.height_range();
            hi - lo
        };
        assert!(spread(&out) < spread(&grid));
    }
}
