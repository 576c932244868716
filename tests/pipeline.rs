use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

use hydro_terrain::erosion::{self, Droplet, ErosionConfig, TerminationReason};
use hydro_terrain::export::{export_grid_png, export_grid_raw, expected_file_size, PngExportOptions, RawFormat};
use hydro_terrain::noise::generate;
use hydro_terrain::pipeline::{ErosionStage, HeightmapStage, Pipeline, SmoothingStage, StageConfig};
use hydro_terrain::smoothing::{box_average, gaussian_blur, smooth, SmoothingKind};
use hydro_terrain::{ConfigError, HeightGrid, IslandNoiseConfig};

fn bits(grid: &HeightGrid) -> Vec<u32> {
    grid.heights().iter().map(|h| h.to_bits()).collect()
}

#[test]
fn test_small_island_peaks_in_center() {
    let grid = generate(9, 0, 1).unwrap();
    let center = grid.get(4, 4);
    for (x, y) in grid.cell_coords() {
        if grid.is_boundary(x, y) {
            assert!(center > grid.get(x, y), "ring cell ({x}, {y}) not below center");
        }
    }
}

#[test]
fn test_flat_grid_droplet_stops_without_writes() {
    let mut grid = HeightGrid::new(9);
    let config = ErosionConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    let mut droplet = Droplet::new(Vec2::new(4.0, 4.0), 200, 1.0);
    let report = droplet.run(&mut grid, &config, &mut rng);

    assert_eq!(report.reason, TerminationReason::NoFlow);
    assert_eq!(report.steps, 0);
    assert!(grid.heights().iter().all(|&h| h == 0.0));
}

#[test]
fn test_box_average_plateau_end_to_end() {
    let grid = HeightGrid::from_fn(9, |x, y| {
        if (2..=6).contains(&x) && (2..=6).contains(&y) {
            1.0
        } else {
            0.0
        }
    });
    let out = box_average(&grid);

    for (x, y) in out.cell_coords() {
        if out.is_boundary(x, y) {
            assert_eq!(out.get(x, y), 0.0);
        }
    }
    for (x, y) in [(3, 3), (4, 4), (5, 5), (3, 5)] {
        assert!((out.get(x, y) - 1.0).abs() < 1e-6);
    }
    assert!((out.get(1, 1) - 1.0 / 9.0).abs() < 1e-6);
}

#[test]
fn test_campaign_is_deterministic() {
    let run_once = || {
        let mut grid = generate(65, 5, 2).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        erosion::run(&mut grid, 1000, 200, &mut rng).unwrap();
        grid
    };

    assert_eq!(bits(&run_once()), bits(&run_once()));
}

#[test]
fn test_generate_erode_smooth() {
    let mut grid = generate(65, 21, 3).unwrap();
    let original = grid.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(77);

    let stats = erosion::run(&mut grid, 500, 100, &mut rng).unwrap();
    assert_eq!(stats.particles, 500);
    assert!(grid.is_finite());
    assert_ne!(grid, original);

    for kind in [SmoothingKind::BoxAverage, SmoothingKind::Gaussian] {
        let smoothed = smooth(&grid, kind);
        assert_eq!(smoothed.size(), 65);
        assert!(smoothed.is_finite());
        let (min, max) = grid.height_range();
        let (smin, smax) = smoothed.height_range();
        assert!(smin >= min - 1e-6 && smax <= max + 1e-6);
    }

    let gauss = gaussian_blur(&grid);
    assert_eq!(gauss, smooth(&grid, SmoothingKind::Gaussian));
}

#[test]
fn test_pipeline_matches_manual_calls() {
    let noise = IslandNoiseConfig {
        size: 33,
        seed: 4,
        octaves: 2,
    };
    let mut pipeline = Pipeline::new(StageConfig::with_noise(noise));
    pipeline
        .add_stage(HeightmapStage)
        .add_stage(SmoothingStage::new(SmoothingKind::BoxAverage));

    let (grid, report) = pipeline.generate().unwrap();
    let expected = box_average(&generate(33, 4, 2).unwrap());

    assert_eq!(grid, expected);
    assert_eq!(report.completed.len(), 2);
}

#[test]
fn test_pipeline_erosion_report() {
    let mut pipeline = Pipeline::new(StageConfig::with_noise(IslandNoiseConfig {
        size: 33,
        seed: 9,
        octaves: 2,
    }));
    pipeline
        .add_stage(HeightmapStage)
        .add_stage(ErosionStage::new(ErosionConfig::with_particles(200, 60), 3));

    let (_, report) = pipeline.generate().unwrap();
    let stats = report.erosion.unwrap();
    assert_eq!(stats.particles, 200);
    assert_eq!(stats.terminations.iter().sum::<u32>(), 200);
}

#[test]
fn test_invalid_inputs_rejected() {
    assert_eq!(generate(3, 0, 2), Err(ConfigError::GridTooSmall(3)));

    let mut grid = generate(17, 0, 2).unwrap();
    let before = grid.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    assert_eq!(
        erosion::run(&mut grid, 10, 0, &mut rng),
        Err(ConfigError::NoIterations)
    );
    assert_eq!(grid, before);
}

#[test]
fn test_export_eroded_island() {
    let dir = tempdir().unwrap();
    let mut grid = generate(33, 2, 2).unwrap();
    erosion::run(&mut grid, 100, 50, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();

    let options = PngExportOptions::auto_range(&grid);
    let png_path = dir.path().join("island.png");
    export_grid_png(&grid, &png_path, &options).unwrap();
    let img = image::open(&png_path).unwrap();
    assert_eq!((img.width(), img.height()), (33, 33));

    let raw_path = dir.path().join("island.raw");
    export_grid_raw(&grid, &raw_path, RawFormat::R32Float, options.min_height, options.max_height).unwrap();
    let len = std::fs::metadata(&raw_path).unwrap().len();
    assert_eq!(len, expected_file_size(33, RawFormat::R32Float));
}
