//! Check the media toolchain and backend availability.

use storyreel_common::config::AppConfig;
use storyreel_render_engine::{BackendRegistry, FfmpegTool, RenderingBackend};

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("StoryReel System Check");
    println!("{}", "=".repeat(50));

    let tool = FfmpegTool::new(&config.ffmpeg, config.timeouts.probe());
    match tool.version().await {
        Ok(version) => println!("[OK] ffmpeg: {version}"),
        Err(e) => println!("[FAIL] ffmpeg ({}): {e}", tool.binary().display()),
    }
    println!(
        "     Defaults: {}x{} @ {}fps, {}k video / {}k audio",
        config.render.width,
        config.render.height,
        config.render.fps,
        config.render.video_bitrate_kbps,
        config.render.audio_bitrate_kbps
    );

    let registry = BackendRegistry::with_defaults(config);
    let available: Vec<String> = registry
        .get_available()
        .await
        .iter()
        .map(|b| b.id().to_string())
        .collect();

    println!();
    println!("Backends:");
    for id in registry.ids() {
        let status = if available.contains(&id) { "OK" } else { "--" };
        println!("  [{status}] {id}");
    }

    println!();
    if available.is_empty() {
        println!("No backend can render. Install ffmpeg or set STORYREEL_FFMPEG.");
    } else {
        println!("StoryReel is ready ({} backend(s) available).", available.len());
    }

    Ok(())
}
