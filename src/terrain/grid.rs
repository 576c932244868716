//! Square height grid storage.

use serde::{Deserialize, Serialize};

/// Square grid of terrain heights.
///
/// Heights are stored row-major: the cell at column `x`, row `y` lives at
/// `heights[y * size + x]`. Every accessor takes `(x, y)` in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightGrid {
    /// Side length in cells.
    size: usize,
    /// Height values stored in row-major order.
    heights: Vec<f32>,
}

impl HeightGrid {
    /// Creates a grid with every height set to 0.0.
    pub fn new(size: usize) -> Self {
        Self::filled(size, 0.0)
    }

    /// Creates a grid with every height set to `value`.
    pub fn filled(size: usize, value: f32) -> Self {
        Self {
            size,
            heights: vec![value; size * size],
        }
    }

    /// Wraps an existing row-major buffer.
    ///
    /// Returns `None` if `heights.len() != size * size`.
    pub fn from_vec(size: usize, heights: Vec<f32>) -> Option<Self> {
        if heights.len() != size * size {
            return None;
        }
        Some(Self { size, heights })
    }

    /// Builds a grid from a closure evaluated at every `(x, y)`.
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut heights = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                heights.push(f(x, y));
            }
        }
        Self { size, heights }
    }

    /// Side length in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.heights.len()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size, "({x}, {y}) outside {0}x{0}", self.size);
        y * self.size + x
    }

    /// Returns the height at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.heights[self.index(x, y)]
    }

    /// Sets the height at column `x`, row `y`.
    ///
    /// # Panics
    /// Panics if x or y is out of bounds.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, height: f32) {
        let i = self.index(x, y);
        self.heights[i] = height;
    }

    /// Adds `delta` to a single cell in place.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, delta: f32) {
        let i = self.index(x, y);
        self.heights[i] += delta;
    }

    /// Row `y` as a slice.
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.size;
        &self.heights[start..start + self.size]
    }

    /// Raw row-major heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// True if `(x, y)` lies on the outermost one-cell ring.
    pub fn is_boundary(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.size || y + 1 == self.size
    }

    /// Returns the minimum height value.
    pub fn min_height(&self) -> f32 {
        self.heights.iter().cloned().fold(f32::MAX, f32::min)
    }

    /// Returns the maximum height value.
    pub fn max_height(&self) -> f32 {
        self.heights.iter().cloned().fold(f32::MIN, f32::max)
    }

    /// Returns (min, max) height range.
    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height(), self.max_height())
    }

    /// Sum of all heights, accumulated in f64.
    pub fn total_height(&self) -> f64 {
        self.heights.iter().map(|&h| h as f64).sum()
    }

    /// True if every height is finite.
    pub fn is_finite(&self) -> bool {
        self.heights.iter().all(|h| h.is_finite())
    }

    /// Returns an iterator over all (x, y) cell coordinates in storage order.
    pub fn cell_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = HeightGrid::new(9);
        assert_eq!(grid.size(), 9);
        assert_eq!(grid.cell_count(), 81);
        assert!(grid.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_row_major_layout() {
        let mut grid = HeightGrid::new(4);
        grid.set(3, 1, 2.5);
        assert_eq!(grid.heights()[1 * 4 + 3], 2.5);
        assert_eq!(grid.row(1)[3], 2.5);
        assert_eq!(grid.get(3, 1), 2.5);
        assert_eq!(grid.get(1, 3), 0.0);
    }

    #[test]
    fn test_from_fn_matches_get() {
        let grid = HeightGrid::from_fn(5, |x, y| (x * 10 + y) as f32);
        assert_eq!(grid.get(2, 4), 24.0);
        assert_eq!(grid.get(4, 2), 42.0);
    }

    #[test]
    fn test_from_vec_length_check() {
        assert!(HeightGrid::from_vec(3, vec![0.0; 9]).is_some());
        assert!(HeightGrid::from_vec(3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn test_add_in_place() {
        let mut grid = HeightGrid::filled(5, 1.0);
        grid.add(2, 2, -0.25);
        grid.add(2, 2, 0.5);
        assert_eq!(grid.get(2, 2), 1.25);
    }

    #[test]
    fn test_height_range() {
        let mut grid = HeightGrid::new(8);
        grid.set(0, 0, -0.5);
        grid.set(7, 7, 1.5);
        assert_eq!(grid.height_range(), (-0.5, 1.5));
    }

    #[test]
    fn test_boundary_ring() {
        let grid = HeightGrid::new(5);
        let ring = grid.cell_coords().filter(|&(x, y)| grid.is_boundary(x, y)).count();
        assert_eq!(ring, 16);
        assert!(!grid.is_boundary(1, 1));
        assert!(grid.is_boundary(4, 2));
    }

    #[test]
    fn test_cell_coords_iterator() {
        let grid = HeightGrid::new(4);
        let coords: Vec<_> = grid.cell_coords().collect();
        assert_eq!(coords.len(), 16);
        assert_eq!(coords[1], (1, 0));
        assert_eq!(coords[4], (0, 1));
        assert_eq!(coords[15], (3, 3));
    }
}
