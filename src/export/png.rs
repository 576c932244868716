//! 16-bit grayscale PNG export for height grids.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::HeightGrid;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid height range: min ({0}) >= max ({1})")]
    InvalidHeightRange(f32, f32),
    #[error("Grid size {0} does not fit a PNG dimension")]
    GridTooLarge(usize),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Height mapped to black.
    pub min_height: f32,
    /// Height mapped to white.
    pub max_height: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_height: -1.0,
            max_height: 2.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options spanning the grid's own height range.
    ///
    /// A perfectly flat grid gets a tiny non-empty range so export still succeeds.
    pub fn auto_range(grid: &HeightGrid) -> Self {
        let (min, max) = grid.height_range();
        let max = if max > min { max } else { min + (min.abs() * 1e-6).max(1e-6) };
        Self {
            min_height: min,
            max_height: max,
            ..Default::default()
        }
    }
}

/// Exports a height grid as a 16-bit PNG.
///
/// Row `y` of the grid becomes image row `y`.
pub fn export_grid_png(
    grid: &HeightGrid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_height;
    let max = options.max_height;

    if min >= max {
        return Err(PngExportError::InvalidHeightRange(min, max));
    }

    let side = u32::try_from(grid.size()).map_err(|_| PngExportError::GridTooLarge(grid.size()))?;
    let range = max - min;

    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::new(side, side);
    for (x, y) in grid.cell_coords() {
        // Normalize to [0, 1] then scale to u16
        let normalized = ((grid.get(x, y) - min) / range).clamp(0.0, 1.0);
        let value = (normalized * 65535.0) as u16;
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // Convert u16 slice to bytes for the encoder
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());
    encoder.write_image(byte_slice, side, side, image::ExtendedColorType::L16)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_export_grid_png() {
        let grid = HeightGrid::from_fn(33, |x, y| (x as f32 + y as f32) / 64.0);
        let dir = tempdir().unwrap();
        let path = dir.path().join("island.png");

        export_grid_png(&grid, &path, &PngExportOptions::auto_range(&grid)).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 33);
        assert_eq!(img.height(), 33);
        let luma = img.to_luma16();
        assert_eq!(luma.get_pixel(0, 0).0[0], 0);
        assert_eq!(luma.get_pixel(32, 32).0[0], 65535);
    }

    #[test]
    fn test_invalid_height_range() {
        let grid = HeightGrid::new(9);
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.png");

        let options = PngExportOptions {
            min_height: 1.0,
            max_height: -1.0,
            ..Default::default()
        };

        let result = export_grid_png(&grid, &path, &options);
        assert!(matches!(result, Err(PngExportError::InvalidHeightRange(_, _))));
    }

    #[test]
    fn test_auto_range() {
        let mut grid = HeightGrid::new(16);
        grid.set(0, 0, -0.5);
        grid.set(15, 15, 0.75);

        let options = PngExportOptions::auto_range(&grid);
        assert_eq!(options.min_height, -0.5);
        assert_eq!(options.max_height, 0.75);

        let flat = PngExportOptions::auto_range(&HeightGrid::new(5));
        assert!(flat.max_height > flat.min_height);
    }
}
