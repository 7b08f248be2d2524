//! Scene assembly and transitions.
//!
//! Assembly runs in three steps:
//!
//! ```text
//! scene clips + narration ──► merge (per scene, -c:v copy)
//!                                   │
//!                  ┌────────────────┼─────────────────┐
//!              1 scene        all `none`        any transition
//!                  │                │                 │
//!              ScaleOnly      concat demuxer     xfade/acrossfade chain
//!                  │                │                 │
//!                  └────────► scale + watermark + encode ◄┘
//! ```
//!
//! Planning is pure: [`plan_timeline`] decides the topology and transition
//! offsets, and the graph/argument builders below only format what it
//! decided.

use std::path::{Path, PathBuf};

use storyreel_captions::color::hex_to_ffmpeg_alpha;
use storyreel_captions::drawtext::DrawText;
use storyreel_captions::layout::{block_top, estimate_text_width, line_height, line_left};
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_common::timecode::format_secs;
use storyreel_media_model::{validate_duration, CaptionOptions, OutputFormat, TransitionKind, TransitionSpec, Watermark};

use crate::filter_graph::{Filter, FilterChain, FilterGraph};

/// Output label of the final video stream.
pub const VIDEO_OUTPUT: &str = "vout";

/// Sample format every scene's audio is brought to before crossfading.
const AUDIO_SAMPLE_RATE: u32 = 44_100;

/// One clip on the assembly timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub duration: f64,
    /// Transition into the following entry.
    pub transition: TransitionSpec,
}

impl TimelineEntry {
    pub fn new(duration: f64, transition: Option<TransitionSpec>) -> Self {
        Self {
            duration,
            transition: transition.unwrap_or_else(TransitionSpec::none),
        }
    }
}

/// How the merged clips are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// A single clip: only the final scale/encode.
    ScaleOnly,
    /// Concat demuxer, streams copied, then the final scale/encode.
    Concat,
    /// One `xfade`/`acrossfade` chain over every clip.
    Crossfade,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTransition {
    pub kind: TransitionKind,
    /// Capped duration actually used.
    pub duration: f64,
    /// Timeline position where the blend starts.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePlan {
    pub topology: Topology,
    /// One per adjacent pair on the crossfade path, empty otherwise.
    pub transitions: Vec<PlannedTransition>,
    pub total_duration: f64,
}

/// Decide topology and transition offsets for `entries`.
pub fn plan_timeline(entries: &[TimelineEntry]) -> StoryreelResult<TimelinePlan> {
    plan(entries, true)
}

/// Like [`plan_timeline`], but never picks the stream-copy concat path.
///
/// Used when the clips may differ in size or codec (intro/outro clips), so
/// every join goes through the normalizing crossfade chain.
pub fn plan_timeline_reencoded(entries: &[TimelineEntry]) -> StoryreelResult<TimelinePlan> {
    plan(entries, false)
}

fn plan(entries: &[TimelineEntry], allow_concat: bool) -> StoryreelResult<TimelinePlan> {
    if entries.is_empty() {
        return Err(StoryreelError::validation("assembly needs at least one scene"));
    }
    for entry in entries {
        validate_duration(entry.duration)?;
    }

    if entries.len() == 1 {
        return Ok(TimelinePlan {
            topology: Topology::ScaleOnly,
            transitions: Vec::new(),
            total_duration: entries[0].duration,
        });
    }

    let joins = &entries[..entries.len() - 1];
    if allow_concat && joins.iter().all(|e| e.transition.kind.is_none()) {
        return Ok(TimelinePlan {
            topology: Topology::Concat,
            transitions: Vec::new(),
            total_duration: entries.iter().map(|e| e.duration).sum(),
        });
    }

    let mut cumulative = entries[0].duration;
    let mut transitions = Vec::with_capacity(joins.len());
    for pair in entries.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        let duration = current.transition.capped_duration(current.duration, next.duration);
        let offset = cumulative - duration;
        transitions.push(PlannedTransition {
            kind: current.transition.kind,
            duration,
            offset,
        });
        cumulative = offset + next.duration;
    }

    Ok(TimelinePlan {
        topology: Topology::Crossfade,
        transitions,
        total_duration: cumulative,
    })
}

/// Final output parameters shared by every topology.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub format: OutputFormat,
    pub video_bitrate_kbps: u32,
    pub audio_bitrate_kbps: u32,
    pub watermark: Option<Watermark>,
}

/// Merge one scene's picture with its narration, or with silence.
///
/// Audio is always resampled to 44.1 kHz stereo so merged clips can be
/// joined with stream copy.
pub fn merge_args(
    video: &Path,
    audio: Option<&Path>,
    duration: f64,
    audio_codec: &str,
    audio_bitrate_kbps: u32,
    output: &Path,
) -> Vec<String> {
    let mut args = vec!["-i".to_string(), video.display().to_string()];
    match audio {
        Some(audio) => args.extend(["-i".to_string(), audio.display().to_string()]),
        None => args.extend([
            "-f".to_string(),
            "lavfi".to_string(),
            "-t".to_string(),
            format_secs(duration),
            "-i".to_string(),
            format!("anullsrc=channel_layout=stereo:sample_rate={AUDIO_SAMPLE_RATE}"),
        ]),
    }
    args.extend([
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        audio_codec.to_string(),
        "-ar".to_string(),
        AUDIO_SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        "2".to_string(),
        "-b:a".to_string(),
        format!("{}k", audio_bitrate_kbps.max(64)),
        "-shortest".to_string(),
        output.display().to_string(),
    ]);
    args
}

/// Concat demuxer list, one `file '<path>'` line per clip.
pub fn concat_manifest(clips: &[PathBuf]) -> String {
    let mut manifest = String::new();
    for clip in clips {
        let escaped = clip.display().to_string().replace('\'', "'\\''");
        manifest.push_str(&format!("file '{escaped}'\n"));
    }
    manifest
}

/// Join clips listed in `manifest` without re-encoding.
pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
    vec![
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-i".to_string(),
        manifest.display().to_string(),
        "-c".to_string(),
        "copy".to_string(),
        output.display().to_string(),
    ]
}

/// Letterbox `input` into the output frame at the output frame rate.
fn fit_to_frame(chain: FilterChain, spec: &OutputSpec) -> FilterChain {
    chain
        .then(
            Filter::new("scale")
                .arg(spec.width)
                .arg(spec.height)
                .opt("force_original_aspect_ratio", "decrease"),
        )
        .then(
            Filter::new("pad")
                .arg(spec.width)
                .arg(spec.height)
                .arg("(ow-iw)/2")
                .arg("(oh-ih)/2"),
        )
        .then(Filter::new("setsar").arg(1))
        .then(Filter::new("fps").arg(spec.fps))
        .then(Filter::new("format").arg("yuv420p"))
}

/// `drawtext` for a watermark placed inside the output frame.
pub fn watermark_filter(watermark: &Watermark, width: u32, height: u32) -> Filter {
    let font = CaptionOptions::default().font;
    let size = watermark.font_size.max(1);
    let x = line_left(watermark.position, estimate_text_width(&watermark.text, size), width);
    let y = block_top(watermark.position, line_height(size), height);
    let color = hex_to_ffmpeg_alpha(&watermark.color, watermark.opacity.clamp(0.0, 1.0));
    let overlay = DrawText::new(watermark.text.clone(), &font, size, color).at(x, y);
    Filter::from_rendered(&overlay.to_filter())
}

fn append_watermark(mut chain: FilterChain, spec: &OutputSpec) -> FilterChain {
    if let Some(watermark) = spec.watermark.as_ref().filter(|w| !w.text.trim().is_empty()) {
        chain.push(watermark_filter(watermark, spec.width, spec.height));
    }
    chain
}

/// Final pass over a single input: fit to frame, watermark.
pub fn scale_graph(spec: &OutputSpec) -> FilterGraph {
    let chain = fit_to_frame(FilterChain::new().input("0:v"), spec);
    FilterGraph::new().chain(append_watermark(chain, spec).output(VIDEO_OUTPUT))
}

/// Crossfade graph over `plan.transitions.len() + 1` inputs.
///
/// Returns the graph and the label carrying the blended audio.
pub fn crossfade_graph(plan: &TimelinePlan, spec: &OutputSpec) -> (FilterGraph, String) {
    let inputs = plan.transitions.len() + 1;
    let mut graph = FilterGraph::new();

    for i in 0..inputs {
        graph.push(fit_to_frame(FilterChain::new().input(format!("{i}:v")), spec).output(format!("v{i}")));
        graph.push(
            FilterChain::new()
                .input(format!("{i}:a"))
                .then(
                    Filter::new("aformat")
                        .opt("sample_rates", AUDIO_SAMPLE_RATE)
                        .opt("channel_layouts", "stereo"),
                )
                .then(Filter::new("asetpts").arg("PTS-STARTPTS"))
                .output(format!("a{i}")),
        );
    }

    let mut video = "v0".to_string();
    let mut audio = "a0".to_string();
    for (k, transition) in plan.transitions.iter().enumerate() {
        let next = k + 1;
        let (video_out, audio_out) = (format!("vx{next}"), format!("ax{next}"));
        graph.push(
            FilterChain::new()
                .input(video.as_str())
                .input(format!("v{next}"))
                .then(
                    Filter::new("xfade")
                        .opt("transition", transition.kind.xfade_name())
                        .secs("duration", transition.duration)
                        .secs("offset", transition.offset),
                )
                .output(video_out.as_str()),
        );
        graph.push(
            FilterChain::new()
                .input(audio.as_str())
                .input(format!("a{next}"))
                .then(Filter::new("acrossfade").secs("d", transition.duration))
                .output(audio_out.as_str()),
        );
        video = video_out;
        audio = audio_out;
    }

    let tail = FilterChain::new()
        .input(video)
        .then(Filter::new("format").arg("yuv420p"));
    graph.push(append_watermark(tail, spec).output(VIDEO_OUTPUT));
    (graph, audio)
}

/// Encode `inputs` through `graph` into `output`.
///
/// `audio_map` is either a graph label (mapped as `[label]`) or a stream
/// specifier such as `0:a`.
pub fn encode_args(
    inputs: &[PathBuf],
    graph: &FilterGraph,
    audio_map: &str,
    spec: &OutputSpec,
    output: &Path,
) -> Vec<String> {
    let mut args = Vec::new();
    for input in inputs {
        args.extend(["-i".to_string(), input.display().to_string()]);
    }
    let audio_map = if audio_map.contains(':') {
        audio_map.to_string()
    } else {
        format!("[{audio_map}]")
    };
    args.extend([
        "-filter_complex".to_string(),
        graph.to_string(),
        "-map".to_string(),
        format!("[{VIDEO_OUTPUT}]"),
        "-map".to_string(),
        audio_map,
    ]);
    args.extend(spec.format.codec_args(spec.video_bitrate_kbps, spec.audio_bitrate_kbps));
    args.push(output.display().to_string());
    args
}

/// Replace the audio of `video` with `audio`, copying the picture.
pub fn replace_audio_args(video: &Path, audio: &Path, format: OutputFormat, audio_bitrate_kbps: u32, output: &Path) -> Vec<String> {
    let codec = match format {
        OutputFormat::Webm => "libopus",
        OutputFormat::Mp4H264 | OutputFormat::Mp4H265 => "aac",
    };
    vec![
        "-i".to_string(),
        video.display().to_string(),
        "-i".to_string(),
        audio.display().to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        "1:a:0".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        codec.to_string(),
        "-b:a".to_string(),
        format!("{}k", audio_bitrate_kbps.max(64)),
        "-shortest".to_string(),
        output.display().to_string(),
    ]
}
