//! Mountaingen CLI - procedural mountain terrain generator.
//!
//! Generates a layered-noise heightfield, exports it as a heightmap, and
//! optionally dumps the wireframe-ready triangle mesh.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use mountaingen::export::{
    export_grid_png, export_grid_raw, export_mesh_buffers, PngExportOptions, RawFormat,
};
use mountaingen::mesh::{
    check_u16_resolution, max_u16_resolution, triangulate, INDEX_STRIDE, POSITION_ATTRIBUTE,
};
use mountaingen::noise::{LayerSpec, LayeredNoiseGenerator, NoiseFieldFactory};

/// Procedural mountain terrain generator.
#[derive(Parser)]
#[command(name = "mountaingen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a heightmap and, optionally, its mesh buffers.
    Generate {
        /// Grid points per axis (at least 2).
        #[arg(short, long, default_value = "64")]
        resolution: u32,

        /// World-space extent sampled by the noise.
        #[arg(long, default_value = "1.0")]
        size: f32,

        /// Base noise frequency.
        #[arg(long, default_value = "4.0")]
        frequency: f32,

        /// Number of noise layers.
        #[arg(short, long, default_value = "4")]
        layers: u32,

        /// Redistribution exponent (<1 lifts valleys, >1 sharpens peaks).
        #[arg(long, default_value = "1.0")]
        redistribution: f32,

        /// Use a built-in parameter preset instead of the flags above.
        #[arg(long)]
        preset: Option<Preset>,

        /// Load parameters from a JSON file instead of the flags above.
        #[arg(short, long, conflicts_with = "preset")]
        config: Option<PathBuf>,

        /// Random seed for reproducible generation.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output directory for generated files.
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// Base name for output files.
        #[arg(short, long, default_value = "terrain")]
        name: String,

        /// Heightmap export format.
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Also write position, barycentric and index buffers.
        #[arg(long)]
        mesh: bool,
    },

    /// Display buffer sizes for a grid resolution.
    Info {
        /// Grid points per axis.
        #[arg(short, long, default_value = "64")]
        resolution: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    /// 16-bit PNG (universal compatibility).
    Png,
    /// 16-bit RAW little-endian (Unity).
    Raw,
    /// 32-bit float RAW (high precision).
    RawFloat,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    /// Soft, low-frequency terrain.
    RollingHills,
    /// Jagged, high-detail peaks.
    Alpine,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            resolution,
            size,
            frequency,
            layers,
            redistribution,
            preset,
            config,
            seed,
            output,
            name,
            format,
            mesh,
        } => {
            let spec = match (config, preset) {
                (Some(path), _) => LayerSpec::load(&path).unwrap_or_else(|e| {
                    eprintln!("Error loading {}: {}", path.display(), e);
                    std::process::exit(1);
                }),
                (None, Some(Preset::RollingHills)) => LayerSpec::rolling_hills(),
                (None, Some(Preset::Alpine)) => LayerSpec::alpine(),
                (None, None) => LayerSpec {
                    resolution,
                    size,
                    frequency,
                    layers,
                    redistribution,
                },
            };
            run_generate(spec, seed, output, name, format, mesh);
        }
        Commands::Info { resolution } => {
            run_info(resolution);
        }
    }
}

fn run_generate(
    spec: LayerSpec,
    seed: Option<u64>,
    output: PathBuf,
    name: String,
    format: ExportFormat,
    mesh: bool,
) {
    let generator = LayeredNoiseGenerator::new(spec).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let spec = generator.spec();

    if mesh {
        if let Err(e) = check_u16_resolution(spec.resolution) {
            eprintln!("Error: cannot export --mesh: {}", e);
            std::process::exit(1);
        }
    }

    // Generate seed if not provided
    let seed = seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    });

    println!("Mountaingen - Procedural Terrain Generator");
    println!("==========================================");
    println!("Resolution: {}x{}", spec.resolution, spec.resolution);
    println!("Size: {}  Frequency: {}", spec.size, spec.frequency);
    println!("Layers: {}  Redistribution: {}", spec.layers, spec.redistribution);
    println!("Seed: {}", seed);
    println!("Output: {}", output.display());

    let start = Instant::now();

    println!("\nGenerating elevation grid...");
    let mut factory = NoiseFieldFactory::seeded(seed);
    let grid = generator.generate(&mut factory);

    let (min_h, max_h) = grid.height_range();
    println!("Generation completed in {:.2?}", start.elapsed());
    println!("Height range: [{:.4}, {:.4}]", min_h, max_h);

    std::fs::create_dir_all(&output).unwrap_or_else(|e| {
        eprintln!("Error creating output directory: {}", e);
        std::process::exit(1);
    });

    let options = PngExportOptions::auto_range(&grid);
    let (min_h, max_h) = (options.min_height, options.max_height);

    println!("\nExporting heightmap...");
    let export_start = Instant::now();

    match format {
        ExportFormat::Png => {
            let path = output.join(format!("{}.png", name));
            export_grid_png(&grid, &path, &options).unwrap_or_else(|e| {
                eprintln!("Error exporting PNG: {}", e);
                std::process::exit(1);
            });
            println!("  Exported PNG: {}", path.display());
        }
        ExportFormat::Raw => {
            let path = output.join(format!("{}.raw", name));
            export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, min_h, max_h)
                .unwrap_or_else(|e| {
                    eprintln!("Error exporting RAW: {}", e);
                    std::process::exit(1);
                });
            println!("  Exported RAW (R16): {}", path.display());
        }
        ExportFormat::RawFloat => {
            let path = output.join(format!("{}.raw", name));
            export_grid_raw(&grid, &path, RawFormat::R32Float, min_h, max_h).unwrap_or_else(
                |e| {
                    eprintln!("Error exporting RAW: {}", e);
                    std::process::exit(1);
                },
            );
            println!("  Exported RAW (R32 float): {}", path.display());
        }
    }

    if mesh {
        let terrain_mesh = triangulate(&grid);
        println!(
            "Triangulated {} triangles ({} vertices)",
            terrain_mesh.triangle_count(),
            terrain_mesh.vertex_count()
        );
        let files = export_mesh_buffers(&terrain_mesh, &output, &name).unwrap_or_else(|e| {
            eprintln!("Error exporting mesh buffers: {}", e);
            std::process::exit(1);
        });
        println!("  Exported positions: {}", files.positions.display());
        println!("  Exported barycentric: {}", files.barycentric.display());
        println!("  Exported indices: {}", files.indices.display());
    }

    println!("Export completed in {:.2?}", export_start.elapsed());
    println!("\nTotal time: {:.2?}", start.elapsed());
    println!("Done!");
}

fn run_info(resolution: u32) {
    if resolution < 2 {
        eprintln!("Error: Resolution must be at least 2");
        std::process::exit(1);
    }

    let points = (resolution as u64) * (resolution as u64);
    let cells = (resolution as u64 - 1) * (resolution as u64 - 1);
    let triangles = cells * 2;
    let vertices = triangles * 3;
    let indices = vertices + vertices % 2;

    let bytes_grid = points * 4; // f32
    let bytes_positions = vertices * POSITION_ATTRIBUTE.stride;
    let bytes_barycentric = bytes_positions;
    let bytes_indices = indices * INDEX_STRIDE;

    println!("Mountaingen - Mesh Configuration Info");
    println!("=====================================");
    println!();
    println!("Resolution: {}x{}", resolution, resolution);
    println!("Grid points: {:>12}", points);
    println!("Cells:       {:>12}", cells);
    println!("Triangles:   {:>12}", triangles);
    println!("Vertices:    {:>12}", vertices);
    println!();
    println!("Memory usage:");
    println!("  Elevations:  {:>12} bytes ({:.2} MB)", bytes_grid, bytes_grid as f64 / 1024.0 / 1024.0);
    println!("  Positions:   {:>12} bytes ({:.2} MB)", bytes_positions, bytes_positions as f64 / 1024.0 / 1024.0);
    println!("  Barycentric: {:>12} bytes ({:.2} MB)", bytes_barycentric, bytes_barycentric as f64 / 1024.0 / 1024.0);
    println!("  Indices:     {:>12} bytes ({:.2} MB)", bytes_indices, bytes_indices as f64 / 1024.0 / 1024.0);
    println!();

    let limit = max_u16_resolution();
    if resolution <= limit {
        println!("16-bit index buffer: OK");
    } else {
        println!(
            "16-bit index buffer: too many vertices (maximum resolution is {})",
            limit
        );
    }
}
