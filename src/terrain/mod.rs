//! Height grid storage and continuous-position sampling.
//!
//! The grid is indexed `(x, y)` = (column, row) everywhere and stored
//! row-major, so `heights[y * size + x]` is the cell at column `x`, row `y`.

mod grid;
pub mod sampling;

pub use grid::HeightGrid;
pub use sampling::{cell_sample, sample_bilinear, sample_flow_direction, CellSample};
