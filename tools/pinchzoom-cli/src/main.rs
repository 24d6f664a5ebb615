//! PinchZoom CLI: drive the pinch-to-zoom loop without a browser.
//!
//! Usage:
//!   pinchzoom run [OPTIONS]        Run the render loop on the synthetic camera
//!   pinchzoom estimate [OPTIONS]   Compute one zoom step from fingertip positions
//!   pinchzoom config [--write]     Show or save the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pinchzoom_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "pinchzoom",
    about = "Zoom a live camera view by pinching thumb and index finger",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the render loop
    Run {
        /// Stop after this many rendered frames (default: until Ctrl+C)
        #[arg(long)]
        frames: Option<u64>,

        /// Replay detections from a JSONL log instead of the scripted pinch
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Directory for PNG snapshots
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds between snapshots
        #[arg(long, default_value = "1.0")]
        snapshot_every: f64,

        /// Write a JSONL frame report here
        #[arg(long)]
        report: Option<PathBuf>,

        /// Disable the horizontal mirror
        #[arg(long)]
        no_mirror: bool,

        /// Do not draw the hand overlay
        #[arg(long)]
        no_landmarks: bool,

        /// Fingertip pixels per unit of zoom
        #[arg(long)]
        sensitivity: Option<f64>,
    },

    /// Compute one zoom step
    Estimate {
        /// Thumb tip as normalized X,Y (omit both tips for "no hand")
        #[arg(long, value_parser = commands::estimate::parse_point, requires = "index")]
        thumb: Option<(f64, f64)>,

        /// Index fingertip as normalized X,Y
        #[arg(long, value_parser = commands::estimate::parse_point, requires = "thumb")]
        index: Option<(f64, f64)>,

        /// Intrinsic frame width in pixels
        #[arg(long, default_value = "640")]
        frame_width: u32,

        /// Intrinsic frame height in pixels
        #[arg(long, default_value = "480")]
        frame_height: u32,

        /// Zoom before this step (default: minimum zoom)
        #[arg(long)]
        previous: Option<f64>,
    },

    /// Show the effective configuration
    Config {
        /// Save it to the standard config location
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    pinchzoom_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Run {
            frames,
            replay,
            output,
            snapshot_every,
            report,
            no_mirror,
            no_landmarks,
            sensitivity,
        } => {
            if no_mirror {
                config.display.mirror = false;
            }
            if no_landmarks {
                config.display.draw_landmarks = false;
            }
            if let Some(sensitivity) = sensitivity {
                config.zoom.sensitivity = sensitivity;
            }
            commands::run::run(
                config,
                commands::run::RunOptions {
                    frames,
                    replay,
                    output,
                    snapshot_every,
                    report,
                },
            )
            .await
        }
        Commands::Estimate {
            thumb,
            index,
            frame_width,
            frame_height,
            previous,
        } => commands::estimate::run(
            &config,
            thumb.zip(index),
            frame_width,
            frame_height,
            previous,
        ),
        Commands::Config { write } => commands::config::run(&config, write),
    }
}
