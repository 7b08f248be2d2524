//! Burn captions into an existing video.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use storyreel_captions::{save_subtitles, CaptionEngine};
use storyreel_common::config::AppConfig;
use storyreel_media_model::{CaptionOptions, CaptionRequest, MediaSource, SubtitleSegment};
use storyreel_render_engine::{FfmpegBackend, FfmpegTool};

/// A captions file: either a bare segment list or segments with options.
#[derive(Deserialize)]
#[serde(untagged)]
enum CaptionsFile {
    Request(CaptionRequest),
    Segments(Vec<SubtitleSegment>),
}

pub struct CaptionArgs {
    pub video: PathBuf,
    pub segments: PathBuf,
    pub style: String,
    pub output: PathBuf,
    pub sidecar: Option<PathBuf>,
    pub dump_script: bool,
    /// Explicit layout size; read from the video when absent.
    pub size: Option<(u32, u32)>,
}

pub async fn run(config: &AppConfig, args: CaptionArgs) -> anyhow::Result<()> {
    let CaptionArgs {
        video,
        segments: segments_path,
        style,
        output,
        sidecar,
        dump_script,
        size,
    } = args;

    let content = std::fs::read_to_string(&segments_path).map_err(|e| {
        anyhow::anyhow!("Failed to read segments {}: {e}", segments_path.display())
    })?;
    let (segments, options) = match serde_json::from_str::<CaptionsFile>(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse segments: {e}"))?
    {
        CaptionsFile::Request(request) => (request.segments, request.options),
        CaptionsFile::Segments(segments) => (segments, CaptionOptions::default()),
    };
    let (video_width, video_height) = match size {
        Some(size) => size,
        None => video_size(config, &video).await,
    };
    let options = CaptionOptions {
        animation_style: style.clone(),
        video_width,
        video_height,
        ..options
    };

    if let Some(path) = &sidecar {
        save_subtitles(&segments, path)?;
        println!("Subtitles written: {}", path.display());
    }

    if dump_script {
        let plan = CaptionEngine::new().render(&segments, &options)?;
        println!("{}", plan.to_filter_text());
        return Ok(());
    }

    let resolved = CaptionEngine::resolve_style(&style);
    println!("Burning captions into: {}", video.display());
    println!("  Segments: {}", segments.len());
    println!("  Style: {} ({})", resolved.id, resolved.name);
    println!("  Output: {}", output.display());

    let backend = FfmpegBackend::new(config);
    let captioned = backend
        .embed_captions(&MediaSource::Path(video), &segments, &options)
        .await
        .map_err(|e| anyhow::anyhow!("Caption burn failed: {e}"))?;

    std::fs::write(&output, &captioned)?;
    println!("Captions complete: {} ({} bytes)", output.display(), captioned.len());

    Ok(())
}

/// Size of the input video, or the configured output size when ffprobe
/// cannot read it.
async fn video_size(config: &AppConfig, video: &Path) -> (u32, u32) {
    let tool = FfmpegTool::new(&config.ffmpeg, config.timeouts.probe());
    match tool.video_dimensions(video).await {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(
                video = %video.display(),
                error = %e,
                "Could not read video size, using configured size"
            );
            (config.render.width, config.render.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_segment_list() {
        let file: CaptionsFile =
            serde_json::from_str(r#"[{"text": "Hello", "start_time": 0.0, "end_time": 1.0}]"#).unwrap();
        assert!(matches!(file, CaptionsFile::Segments(ref s) if s.len() == 1));
    }

    #[test]
    fn test_request_with_options() {
        let file: CaptionsFile = serde_json::from_str(
            r#"{"segments": [{"text": "Hi", "start_time": 0.0, "end_time": 1.0}],
                "options": {"fontSize": 48}}"#,
        )
        .unwrap();
        match file {
            CaptionsFile::Request(request) => {
                assert_eq!(request.options.font_size, 48);
                assert_eq!(request.segments[0].text, "Hi");
            }
            CaptionsFile::Segments(_) => panic!("expected a caption request"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_video_uses_configured_size() {
        let mut config = AppConfig::default();
        config.ffmpeg.ffprobe_binary = PathBuf::from("/nonexistent/storyreel-ffprobe");
        config.render.width = 720;
        config.render.height = 1280;

        let size = video_size(&config, Path::new("/nonexistent/input.mp4")).await;
        assert_eq!(size, (720, 1280));
    }
}
