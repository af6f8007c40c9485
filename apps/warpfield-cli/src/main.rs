use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use warpfield_common::WarpConfig;
use warpfield_input::Pointer;
use warpfield_render::{DebugTextRenderer, GlowTexture, Renderer, Scene};

#[derive(Parser)]
#[command(name = "warpfield-cli", about = "Headless tool for the warpfield starfield")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; missing keys keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Advance the scene without a GPU and report its state
    Simulate {
        /// Number of ticks to run
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// RNG seed for star placement
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Override the star count
        #[arg(long)]
        stars: Option<usize>,
        /// Pointer x in [-1, 1], held for the whole run
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pointer_x: f32,
        /// Pointer y in [-1, 1], held for the whole run
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pointer_y: f32,
    },
    /// Print the glow sprite as character art
    Glow {
        /// Characters per row
        #[arg(long, default_value = "32")]
        cols: u32,
    },
    /// Print the effective configuration as YAML
    Config,
}

/// Result of a headless run.
struct SimulationReport {
    total_recycled: u64,
    state_hash: u64,
    summary: String,
}

fn simulate(config: &WarpConfig, ticks: u64, seed: u64, pointer: Pointer) -> SimulationReport {
    let mut scene = Scene::new(config, seed);
    let mut total_recycled = 0;
    for _ in 0..ticks {
        total_recycled += scene.tick(pointer) as u64;
    }
    tracing::debug!("simulated {ticks} ticks, {total_recycled} stars recycled");
    SimulationReport {
        total_recycled,
        state_hash: scene.stars.field.state_hash(),
        summary: DebugTextRenderer::new().render(&scene),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config =
        WarpConfig::load_or_default(cli.config.as_deref()).context("failed to load config")?;

    match cli.command {
        Commands::Info => {
            println!("warpfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", warpfield_common::crate_info());
            println!("kernel: {}", warpfield_kernel::crate_info());
            println!("input: {}", warpfield_input::crate_info());
            println!("render: {}", warpfield_render::crate_info());
        }
        Commands::Simulate {
            ticks,
            seed,
            stars,
            pointer_x,
            pointer_y,
        } => {
            if let Some(stars) = stars {
                config.stars.count = stars;
            }
            config.validate()?;
            let pointer = Pointer::new(pointer_x, pointer_y);
            println!(
                "Simulating {} stars for {ticks} ticks: seed={seed}, pointer=({:.2}, {:.2})",
                config.stars.count, pointer.x, pointer.y
            );
            let report = simulate(&config, ticks, seed, pointer);
            print!("{}", report.summary);
            println!("Recycled total: {}", report.total_recycled);
            println!("State hash: {:#018x}", report.state_hash);
        }
        Commands::Glow { cols } => {
            let glow = GlowTexture::generate(config.scene.glow_size);
            print!("{}", glow.ascii_preview(cols));
        }
        Commands::Config => {
            print!("{}", config.to_yaml_string()?);
        }
    }

    Ok(())
}
