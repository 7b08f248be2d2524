//! Narration and background-music mixing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use storyreel_common::error::StoryreelResult;
use storyreel_media_model::{validate_volume, MediaSource, MusicBed};

use crate::filter_graph::{Filter, FilterChain, FilterGraph};
use crate::runner::FfmpegTool;
use crate::scratch::ScratchSpace;

/// Output label of the mixed audio.
pub const MIX_OUTPUT: &str = "aout";

#[derive(Debug, Clone, PartialEq)]
pub struct AudioMixRequest {
    pub narration: MediaSource,
    pub music: Option<MediaSource>,
    /// Narration volume, percent.
    pub narration_volume: f64,
    /// Music volume, percent.
    pub music_volume: f64,
    /// Lower music under speech. Accepted but not applied.
    pub ducking: bool,
}

impl AudioMixRequest {
    /// Narration alone at full volume.
    pub fn narration_only(narration: MediaSource) -> Self {
        Self {
            narration,
            music: None,
            narration_volume: 100.0,
            music_volume: 0.0,
            ducking: false,
        }
    }

    /// Narration under a project music bed.
    pub fn with_music_bed(narration: MediaSource, bed: &MusicBed) -> Self {
        Self {
            narration,
            music: Some(bed.source.clone()),
            narration_volume: bed.narration_volume,
            music_volume: bed.volume,
            ducking: bed.ducking,
        }
    }
}

/// Volume percentage as an ffmpeg `volume` factor.
fn gain(percent: f64) -> String {
    let rendered = format!("{:.3}", percent / 100.0);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Mix graph over input 0 (narration) and, when present, input 1 (music).
///
/// Narration decides the output length; looped music is cut when it ends.
pub fn build_audio_graph(request: &AudioMixRequest) -> StoryreelResult<FilterGraph> {
    validate_volume("narration", request.narration_volume)?;
    validate_volume("music", request.music_volume)?;

    if request.ducking {
        tracing::debug!("Ducking requested; mixing at fixed volumes");
    }

    let narration = Filter::new("volume").arg(gain(request.narration_volume));
    if request.music.is_none() {
        return Ok(FilterGraph::new().chain(
            FilterChain::new().input("0:a").then(narration).output(MIX_OUTPUT),
        ));
    }

    Ok(FilterGraph::new()
        .chain(FilterChain::new().input("0:a").then(narration).output("narration"))
        .chain(
            FilterChain::new()
                .input("1:a")
                .then(Filter::new("volume").arg(gain(request.music_volume)))
                .output("music"),
        )
        .chain(
            FilterChain::new()
                .input("narration")
                .input("music")
                .then(
                    Filter::new("amix")
                        .opt("inputs", 2)
                        .opt("duration", "first")
                        .opt("dropout_transition", 0),
                )
                .output(MIX_OUTPUT),
        ))
}

/// ffmpeg arguments mixing `narration` (and looped `music`) into `output`.
pub fn mix_args(
    narration: &Path,
    music: Option<&Path>,
    graph: &FilterGraph,
    audio_bitrate_kbps: u32,
    output: &Path,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), narration.display().to_string()];
    if let Some(music) = music {
        args.extend([
            "-stream_loop".to_string(),
            "-1".to_string(),
            "-i".to_string(),
            music.display().to_string(),
        ]);
    }
    args.extend([
        "-filter_complex".to_string(),
        graph.to_string(),
        "-map".to_string(),
        format!("[{MIX_OUTPUT}]"),
        "-vn".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", audio_bitrate_kbps.max(64)),
        output.display().to_string(),
    ]);
    args
}

/// Mix `request` into `<scratch>/<output_name>` (AAC in an `.m4a`).
pub async fn mix_audio(
    tool: &FfmpegTool,
    scratch: &ScratchSpace,
    request: &AudioMixRequest,
    output_name: &str,
    audio_bitrate_kbps: u32,
    timeout: Duration,
) -> StoryreelResult<PathBuf> {
    let graph = build_audio_graph(request)?;

    let mut sources = vec![("narration.audio".to_string(), &request.narration)];
    if let Some(music) = &request.music {
        sources.push(("music.audio".to_string(), music));
    }
    let inputs = scratch.materialize_all(&sources).await?;

    let output = scratch.file(output_name);
    let args = mix_args(&inputs[0], inputs.get(1).map(|p| p.as_path()), &graph, audio_bitrate_kbps, &output);
    tool.run("mix audio", &args, timeout, None).await?;

    tracing::info!(
        music = request.music.is_some(),
        narration_volume = request.narration_volume,
        music_volume = request.music_volume,
        "Audio mixed"
    );
    Ok(output)
}
