//! threedb-export - 3DB model export tool
//!
//! Converts legacy 3DB keyframed models to glTF/GLB with morph target animation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use threedb_export::weights::{is_valid_frame_rate, MIN_FRAME_RATE};
use threedb_export::{convert_file, manifest, ExportOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "threedb-export")]
#[command(about = "3DB model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single .3db file
    Convert {
        /// Input .3db file
        input: PathBuf,

        /// Output directory (default: input file's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Glb)]
        format: OutputFormat,

        /// Texture directory, highest priority first (repeatable, default: m256 then m128)
        #[arg(short = 't', long = "texture-dir")]
        texture_dirs: Vec<PathBuf>,

        /// Keyframes per second (default: 10)
        #[arg(long)]
        frame_rate: Option<f32>,
    },

    /// Convert models selected by a manifest file
    Build {
        /// Path to threedb.toml manifest
        #[arg(default_value = "threedb.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without converting
    Check {
        /// Path to threedb.toml manifest
        #[arg(default_value = "threedb.toml")]
        manifest: PathBuf,
    },

    /// Print the contents of a .3db file
    Info {
        /// Input .3db file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            texture_dirs,
            frame_rate,
        } => {
            let mut options = ExportOptions {
                output_dir: output.unwrap_or_else(|| {
                    input
                        .parent()
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from("."))
                }),
                format,
                ..Default::default()
            };
            if !texture_dirs.is_empty() {
                options.texture_dirs = texture_dirs;
            }
            if let Some(rate) = frame_rate {
                if !is_valid_frame_rate(rate) {
                    anyhow::bail!(
                        "Invalid frame rate {} (must be finite and at least {})",
                        rate,
                        MIN_FRAME_RATE
                    );
                }
                options.frame_rate = rate;
            }

            tracing::info!("Converting {:?} -> {:?}", input, options.output_dir);
            let report = convert_file(&input, &options)?;
            tracing::info!(
                "Done! {} nodes, {} meshes, {} morph targets, {} animations",
                report.stats.nodes,
                report.stats.meshes,
                report.stats.morph_targets,
                report.stats.animations
            );
        }

        Commands::Build { manifest, output } => {
            tracing::info!("Building models from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            let reports = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! {} model(s) converted", reports.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            let inputs = manifest::select_inputs(&config)?;
            tracing::info!("Manifest is valid! {} model(s) selected", inputs.len());
        }

        Commands::Info { input } => {
            let model = threedb::decode_file(&input)
                .with_context(|| format!("Failed to decode {:?}", input))?;
            print_info(&model);
        }
    }

    Ok(())
}

fn print_info(model: &threedb::Model) {
    let summary = model.summary();

    println!("Model: {} ({})", model.name, model.db_version);
    println!("  Materials: {}", summary.materials);
    for material in &model.materials {
        println!("    {} ({})", material.name, material.texture_path);
    }
    println!(
        "  Keyframes: {} ({} meshes each)",
        summary.keyframes, summary.meshes_per_keyframe
    );
    println!("  Objects: {}", summary.objects);
    for object in &model.objects {
        let names: Vec<&str> = object
            .animations
            .iter()
            .filter_map(|&i| model.animations.get(i as usize))
            .map(|a| a.name.as_str())
            .collect();
        println!("    {}: [{}]", object.name, names.join(", "));
    }
    println!("  Animations: {}", summary.animations);
    for animation in &model.animations {
        println!("    {}: {} keyframes", animation.name, animation.keyframes.len());
    }
    println!(
        "  Pools: {} triangles, {} texture coordinates, {} vertices, {} brightness",
        summary.triangle_pool,
        summary.texture_coordinate_pool,
        summary.vertex_pool,
        summary.brightness_pool
    );
}
