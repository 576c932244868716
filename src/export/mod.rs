//! Export module for saving height grids to disk.
//!
//! Supports 16-bit PNG for universal compatibility and RAW formats
//! for game engine imports.

mod png;
mod raw;

pub use png::{export_grid_png, PngExportError, PngExportOptions};
pub use raw::{expected_file_size, export_grid_raw, RawExportError, RawFormat};
