//! Render a single still image into a clip.

use std::path::PathBuf;

use storyreel_common::config::AppConfig;
use storyreel_media_model::{MediaSource, MotionSpec, MotionType, RenderSceneRequest};
use storyreel_render_engine::FfmpegBackend;

use super::progress_printer;

pub struct SceneArgs {
    pub image: PathBuf,
    pub duration: f64,
    pub motion: Option<String>,
    pub speed: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    pub output: PathBuf,
}

pub async fn run(config: &AppConfig, args: SceneArgs) -> anyhow::Result<()> {
    let motion = match args.motion.as_deref() {
        Some(name) => {
            let kind = MotionType::parse(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown motion type: {name}"))?;
            Some(MotionSpec::new(kind, args.speed))
        }
        None => None,
    };

    let scene_id = args
        .image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string());

    let request = RenderSceneRequest {
        scene_id,
        source: MediaSource::Path(args.image.clone()),
        duration: args.duration,
        motion,
        width: args.width,
        height: args.height,
        fps: args.fps,
    };

    println!("Rendering scene from: {}", args.image.display());
    println!(
        "  Motion: {}",
        motion.map(|m| m.kind.as_str()).unwrap_or("none")
    );
    println!("  Duration: {:.2}s", args.duration);
    println!("  Output: {}", args.output.display());

    let backend = FfmpegBackend::new(config);
    let clip = backend
        .render_scene_with_progress(&request, Some(progress_printer()))
        .await
        .map_err(|e| anyhow::anyhow!("\nScene render failed: {e}"))?;

    std::fs::write(&args.output, &clip.video)?;
    println!(
        "\nScene complete: {} ({}x{}, {:.2}s, {} bytes)",
        args.output.display(),
        clip.width,
        clip.height,
        clip.duration,
        clip.video.len()
    );

    Ok(())
}
