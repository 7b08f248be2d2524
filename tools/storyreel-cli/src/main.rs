//! StoryReel CLI: render scenes, assemble projects, and burn captions.
//!
//! Usage:
//!   storyreel check                       Check ffmpeg and the registered backends
//!   storyreel styles [--category <CAT>]   List caption styles
//!   storyreel render-scene <IMAGE>        Turn a still image into a clip
//!   storyreel assemble <MANIFEST>         Assemble a project manifest into a video
//!   storyreel captions <VIDEO>            Burn captions into a video

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storyreel_common::config::{AppConfig, LoggingConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "storyreel",
    about = "Media rendering for narrated short videos",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check ffmpeg and report which backends can render
    Check,

    /// List the caption style catalog
    Styles {
        /// Only show one category (basic, styled, word, effect)
        #[arg(short, long)]
        category: Option<String>,

        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a still image into a clip with pan/zoom motion
    RenderScene {
        /// Source image
        image: PathBuf,

        /// Clip length in seconds
        #[arg(short, long, default_value = "5")]
        duration: f64,

        /// Motion type (zoom_in, pan_left, kenburns_out, static, ...)
        #[arg(short, long)]
        motion: Option<String>,

        /// Motion speed in [0, 1]
        #[arg(long, default_value = "0.5")]
        speed: f64,

        /// Output width (defaults to the configured width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height (defaults to the configured height)
        #[arg(long)]
        height: Option<u32>,

        /// Output FPS (defaults to the configured FPS)
        #[arg(long)]
        fps: Option<u32>,

        /// Output file
        #[arg(short, long, default_value = "scene.mp4")]
        output: PathBuf,
    },

    /// Assemble a project manifest (JSON) into a finished video
    Assemble {
        /// Path to the manifest
        manifest: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Rendering backend id
        #[arg(short, long, default_value = "ffmpeg")]
        backend: String,

        /// Fill missing transitions with varied picks
        #[arg(long)]
        vary: bool,

        /// Seed for varied picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Burn captions into an existing video
    Captions {
        /// Source video
        video: PathBuf,

        /// Caption segments (JSON array)
        #[arg(short, long)]
        segments: PathBuf,

        /// Caption style id
        #[arg(long, default_value = "none")]
        style: String,

        /// Output file
        #[arg(short, long, default_value = "captioned.mp4")]
        output: PathBuf,

        /// Also write the segments as a sidecar file (.srt or .vtt)
        #[arg(long)]
        sidecar: Option<PathBuf>,

        /// Print the generated caption script instead of rendering
        #[arg(long)]
        dump_script: bool,

        /// Video width for caption layout (read from the video when unset)
        #[arg(long)]
        width: Option<u32>,

        /// Video height for caption layout (read from the video when unset)
        #[arg(long)]
        height: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    config.logging = LoggingConfig {
        level: if cli.verbose { "debug" } else { "info" }.to_string(),
        ..config.logging
    };
    storyreel_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Check => commands::check::run(&config).await,
        Commands::Styles { category, json } => commands::styles::run(category.as_deref(), json),
        Commands::RenderScene {
            image,
            duration,
            motion,
            speed,
            width,
            height,
            fps,
            output,
        } => {
            commands::render_scene::run(
                &config,
                commands::render_scene::SceneArgs {
                    image,
                    duration,
                    motion,
                    speed,
                    width,
                    height,
                    fps,
                    output,
                },
            )
            .await
        }
        Commands::Assemble {
            manifest,
            output,
            backend,
            vary,
            seed,
        } => commands::assemble::run(&config, manifest, output, &backend, vary, seed).await,
        Commands::Captions {
            video,
            segments,
            style,
            output,
            sidecar,
            dump_script,
            width,
            height,
        } => {
            commands::captions::run(
                &config,
                commands::captions::CaptionArgs {
                    video,
                    segments,
                    style,
                    output,
                    sidecar,
                    dump_script,
                    size: width.zip(height),
                },
            )
            .await
        }
    }
}
