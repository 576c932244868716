//! hydro_terrain CLI - Island heightmap generator.
//!
//! Generate an island heightmap from layered noise, erode it with water
//! droplets, smooth it and export it for game engines.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use hydro_terrain::erosion::{ErosionConfig, TerminationReason};
use hydro_terrain::error::MIN_GRID_SIZE;
use hydro_terrain::export::{
    expected_file_size, export_grid_png, export_grid_raw, PngExportOptions, RawFormat,
};
use hydro_terrain::noise::{IslandNoiseConfig, MAX_OCTAVES};
use hydro_terrain::pipeline::{ErosionStage, HeightmapStage, Pipeline, SmoothingStage, StageConfig};
use hydro_terrain::smoothing::SmoothingKind;

/// Island heightmap generator with droplet erosion.
#[derive(Parser)]
#[command(name = "hydro_terrain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, erode and export an island heightmap.
    Generate(GenerateArgs),

    /// Display information about a grid size.
    Info {
        /// Grid side length in cells.
        #[arg(short, long, default_value = "257")]
        size: usize,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Grid side length in cells (e.g., 129, 257, 513).
    #[arg(long, default_value = "257")]
    size: usize,

    /// Random seed for reproducible generation.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of noise octaves.
    #[arg(long, default_value = "2")]
    octaves: u32,

    /// Number of erosion droplets (0 skips erosion).
    #[arg(short, long, default_value = "1000")]
    particles: u32,

    /// Step budget of each droplet.
    #[arg(short, long, default_value = "200")]
    iterations: u32,

    /// Floor of the sediment capacity (0-1).
    #[arg(long, default_value = "0.01")]
    min_capacity: f32,

    /// Largest height change per droplet step.
    #[arg(long, default_value = "0.001")]
    max_step_change: f32,

    /// Gravity factor converting height drop into speed.
    #[arg(long, default_value = "4.0")]
    gravity: f32,

    /// Post-process smoothing filter.
    #[arg(long, default_value = "none")]
    smoothing: SmoothingKind,

    /// Export format.
    #[arg(short, long, default_value = "png")]
    format: ExportFormat,

    /// Output directory for generated files.
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,

    /// Base name for output files.
    #[arg(short, long, default_value = "island")]
    name: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 32-bit float RAW (high precision).
    RawFloat,
    /// 16-bit RAW little-endian (Unity).
    Raw16,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Info { size } => run_info(size),
    }
}

fn run_generate(args: GenerateArgs) {
    // Validate parameters
    if args.size < MIN_GRID_SIZE || args.size > 8193 {
        eprintln!("Error: Size must be between {} and 8193", MIN_GRID_SIZE);
        std::process::exit(1);
    }

    if args.octaves < 1 || args.octaves > MAX_OCTAVES {
        eprintln!("Error: Octaves must be between 1 and {}", MAX_OCTAVES);
        std::process::exit(1);
    }

    if args.iterations == 0 {
        eprintln!("Error: Iterations must be at least 1");
        std::process::exit(1);
    }

    // Generate seed if not provided
    let seed = args.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });

    println!("hydro_terrain - Island Heightmap Generator");
    println!("==========================================");
    println!("Size: {}x{}", args.size, args.size);
    println!("Seed: {}", seed);
    println!("Output: {}", args.output.display());

    let start = Instant::now();

    let noise_config = IslandNoiseConfig {
        size: args.size,
        seed: seed as i32,
        octaves: args.octaves,
    };

    println!("\nRunning generation pipeline...");
    let mut pipeline = Pipeline::new(StageConfig::with_noise(noise_config));
    pipeline.add_stage(HeightmapStage);

    if args.particles > 0 {
        let erosion_config = ErosionConfig {
            particle_count: args.particles,
            iterations_per_particle: args.iterations,
            min_sediment_capacity: args.min_capacity,
            max_step_change: args.max_step_change,
            gravity: args.gravity,
            ..Default::default()
        };
        pipeline.add_stage(ErosionStage::new(erosion_config, seed));
        println!(
            "Erosion enabled: {} particles x {} steps",
            args.particles, args.iterations
        );
    } else {
        println!("Erosion: SKIPPED");
    }

    let smoothing = args.smoothing;
    if smoothing != SmoothingKind::None {
        pipeline.add_stage(SmoothingStage::new(smoothing));
        println!("Smoothing enabled: {}", smoothing.name());
    } else {
        println!("Smoothing: SKIPPED");
    }

    let (grid, report) = pipeline
        .generate_with_callbacks(
            |name, i, total| {
                println!("  [{}/{}] Starting: {}", i + 1, total, name);
            },
            |name, i, total| {
                println!("  [{}/{}] Completed: {}", i + 1, total, name);
            },
        )
        .unwrap_or_else(|e| {
            eprintln!("Error during generation: {}", e);
            std::process::exit(1);
        });

    let gen_time = start.elapsed();
    println!("Generation completed in {:.2?}", gen_time);

    if let Some(stats) = &report.erosion {
        println!("\nErosion statistics:");
        println!("  Particles:  {}", stats.particles);
        println!("  Steps:      {} ({:.1} per particle)", stats.steps, stats.mean_steps());
        println!("  Eroded:     {:.6}", stats.total_eroded);
        println!("  Deposited:  {:.6}", stats.total_deposited);
        println!("  Net change: {:+.6}", stats.net_change());
        for reason in TerminationReason::ALL {
            println!("  {:<16} {}", format!("{}:", reason.name()), stats.terminated_by(reason));
        }
    }

    let (min_h, max_h) = grid.height_range();
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    // Export
    println!("\nExporting heightmap...");
    let export_start = Instant::now();

    std::fs::create_dir_all(&args.output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    let options = PngExportOptions::auto_range(&grid);
    match args.format {
        ExportFormat::Png => {
            let path = args.output.join(format!("{}.png", args.name));
            export_grid_png(&grid, &path, &options).unwrap_or_else(|e| {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            });
            println!("  Exported PNG: {}", path.display());
        }
        ExportFormat::RawFloat | ExportFormat::Raw16 => {
            let raw_format = match args.format {
                ExportFormat::RawFloat => RawFormat::R32Float,
                _ => RawFormat::R16LittleEndian,
            };
            let path = args.output.join(format!("{}.raw", args.name));
            export_grid_raw(&grid, &path, raw_format, options.min_height, options.max_height)
                .unwrap_or_else(|e| {
                    eprintln!("Error exporting RAW: {}", e);
                    std::process::exit(1);
                });
            println!("  Exported RAW ({:?}): {}", raw_format, path.display());
        }
    }

    let export_time = export_start.elapsed();
    println!("Export completed in {:.2?}", export_time);
    println!("\nTotal time: {:.2?}", start.elapsed());
}

fn run_info(size: usize) {
    let cells = (size as u64) * (size as u64);
    let bytes_heights = cells * 4; // f32
    let bytes_png = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r16 = expected_file_size(size, RawFormat::R16LittleEndian);
    let bytes_raw_r32 = expected_file_size(size, RawFormat::R32Float);
    let erosion = ErosionConfig::default();
    let noise = IslandNoiseConfig::default();

    println!("hydro_terrain - Grid Configuration Info");
    println!("=======================================");
    println!();
    println!("Size: {}x{}", size, size);
    if size < MIN_GRID_SIZE {
        println!("  Too small: grids need at least {} cells per side", MIN_GRID_SIZE);
    }
    println!("Cells: {:>12}", cells);
    println!("Droplet spawn area: [1, {})", size.saturating_sub(1));
    println!();
    println!("Memory usage (in-memory):");
    println!("  Heights:      {:>12} bytes ({:.2} MB)", bytes_heights, bytes_heights as f64 / 1024.0 / 1024.0);
    println!("  Smoothing:    {:>12} bytes ({:.2} MB)", bytes_heights * 2, (bytes_heights * 2) as f64 / 1024.0 / 1024.0);
    println!();
    println!("Export file sizes:");
    println!("  PNG (16-bit): {:>12} bytes ({:.2} MB) uncompressed", bytes_png, bytes_png as f64 / 1024.0 / 1024.0);
    println!("  RAW (R16):    {:>12} bytes ({:.2} MB)", bytes_raw_r16, bytes_raw_r16 as f64 / 1024.0 / 1024.0);
    println!("  RAW (R32):    {:>12} bytes ({:.2} MB)", bytes_raw_r32, bytes_raw_r32 as f64 / 1024.0 / 1024.0);
    println!();
    println!("Defaults:");
    println!("  Octaves:             {}", noise.octaves);
    println!("  Particles:           {}", erosion.particle_count);
    println!("  Steps per particle:  {}", erosion.iterations_per_particle);
    println!("  Min capacity:        {}", erosion.min_sediment_capacity);
    println!("  Max step change:     {}", erosion.max_step_change);
    println!("  Gravity:             {}", erosion.gravity);
    println!();

    // Engine compatibility notes
    println!("Engine compatibility notes:");
    if size > 1 && is_power_of_two(size - 1) {
        println!("  Unity:    OK (power of 2 + 1)");
        println!("  Unreal:   OK (power of 2 + 1)");
    } else {
        println!("  Unity:    Heightmaps expect power-of-2 + 1 sizes");
        println!("  Unreal:   Recommended sizes are power-of-2 + 1");
    }
}

fn is_power_of_two(n: usize) -> bool {
    n > 0 && (n & (n - 1)) == 0
}
