//! The default backend: everything rendered by the `ffmpeg` binary.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use storyreel_captions::{offset_segments, CaptionEngine, CaptionPlan};
use storyreel_common::config::{AppConfig, RenderDefaults, RenderTimeouts};
use storyreel_common::error::StoryreelResult;
use storyreel_common::timecode::{format_secs, frame_count};
use storyreel_media_model::{
    validate_dimensions, validate_fps, validate_volume, AssembleProjectRequest, AssembledVideo, CaptionOptions,
    MediaSource, OutputFormat, RenderSceneRequest, RenderedClip, SubtitleSegment, TransitionSpec,
};

use crate::assembly::{
    concat_args, concat_manifest, crossfade_graph, encode_args, merge_args, plan_timeline,
    plan_timeline_reencoded, replace_audio_args, scale_graph, OutputSpec, TimelineEntry, TimelinePlan, Topology,
};
use crate::audio::{mix_audio, AudioMixRequest};
use crate::backend::RenderingBackend;
use crate::motion::{compile_motion, static_loop, MotionPlan};
use crate::runner::{FfmpegTool, ProgressCallback, ProgressWatch};
use crate::scratch::ScratchSpace;

pub const FFMPEG_BACKEND_ID: &str = "ffmpeg";

/// Container of per-scene clips.
const CLIP_FORMAT: &str = "mp4";

pub struct FfmpegBackend {
    tool: FfmpegTool,
    defaults: RenderDefaults,
    timeouts: RenderTimeouts,
    scratch_parent: Option<PathBuf>,
    captions: Mutex<CaptionEngine>,
}

impl FfmpegBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            tool: FfmpegTool::new(&config.ffmpeg, config.timeouts.probe()),
            defaults: config.render.clone(),
            timeouts: config.timeouts.clone(),
            scratch_parent: config.scratch_dir.clone(),
            captions: Mutex::new(CaptionEngine::new()),
        }
    }

    /// Use a seeded caption engine so styles with random variety repeat.
    pub fn with_caption_seed(self, seed: u64) -> Self {
        Self {
            captions: Mutex::new(CaptionEngine::with_seed(seed)),
            ..self
        }
    }

    pub fn tool(&self) -> &FfmpegTool {
        &self.tool
    }

    fn scratch(&self) -> StoryreelResult<ScratchSpace> {
        ScratchSpace::new(self.scratch_parent.as_deref())
    }

    fn caption_plan(
        &self,
        segments: &[SubtitleSegment],
        options: &CaptionOptions,
    ) -> StoryreelResult<CaptionPlan> {
        let mut engine = self.captions.lock().unwrap_or_else(PoisonError::into_inner);
        engine.render(segments, options)
    }

    /// [`RenderingBackend::render_scene`] with progress reports.
    pub async fn render_scene_with_progress(
        &self,
        request: &RenderSceneRequest,
        progress: Option<ProgressCallback>,
    ) -> StoryreelResult<RenderedClip> {
        let width = request.width.unwrap_or(self.defaults.width);
        let height = request.height.unwrap_or(self.defaults.height);
        let fps = request.fps.unwrap_or(self.defaults.fps);

        let still = !request.source.is_video();
        let plan = match &request.motion {
            Some(spec) if still => compile_motion(spec, request.duration, fps, width, height)?,
            Some(spec) => {
                tracing::debug!(
                    scene_id = %request.scene_id,
                    motion = spec.kind.as_str(),
                    "Video source, rendering without motion"
                );
                static_loop(request.duration, fps, width, height)?
            }
            None => static_loop(request.duration, fps, width, height)?,
        };
        self.tool.ensure_available().await?;

        let scratch = self.scratch()?;
        let input = scratch.materialize("scene.source", &request.source).await?;
        let output = scratch.file("clip.mp4");
        let args = clip_args(
            &input,
            &plan,
            still,
            request.duration,
            self.defaults.video_bitrate_kbps,
            &output,
        );

        let watch = progress.map(|cb| ProgressWatch::new(plan.output_duration(), plan.frame_count, cb));
        self.tool
            .run("render scene", &args, self.timeouts.clip(), watch.as_ref())
            .await?;
        let video = scratch.read("clip.mp4").await?;

        tracing::info!(
            scene_id = %request.scene_id,
            motion = request.motion.map(|m| m.kind.as_str()).unwrap_or("none"),
            frames = plan.frame_count,
            bytes = video.len(),
            "Scene rendered"
        );

        Ok(RenderedClip {
            scene_id: request.scene_id.clone(),
            video,
            duration: plan.output_duration(),
            format: CLIP_FORMAT.to_string(),
            width,
            height,
            rendered_at: Utc::now(),
        })
    }

    /// [`RenderingBackend::assemble_project`] with progress reports for the
    /// main encode.
    pub async fn assemble_project_with_progress(
        &self,
        request: &AssembleProjectRequest,
        progress: Option<ProgressCallback>,
    ) -> StoryreelResult<AssembledVideo> {
        let spec = OutputSpec {
            width: request.width.unwrap_or(self.defaults.width),
            height: request.height.unwrap_or(self.defaults.height),
            fps: request.fps.unwrap_or(self.defaults.fps),
            format: request.output_format.unwrap_or_default(),
            video_bitrate_kbps: self.defaults.video_bitrate_kbps,
            audio_bitrate_kbps: self.defaults.audio_bitrate_kbps,
            watermark: request.watermark.clone(),
        };
        validate_dimensions(spec.width, spec.height)?;
        validate_fps(spec.fps)?;
        let scene_entries: Vec<TimelineEntry> = request
            .scenes
            .iter()
            .map(|s| TimelineEntry::new(s.duration, s.transition))
            .collect();
        plan_timeline(&scene_entries)?;
        if let Some(bed) = &request.music {
            validate_volume("music", bed.volume)?;
            validate_volume("narration", bed.narration_volume)?;
        }
        let captions = request
            .captions
            .as_ref()
            .filter(|c| !c.segments.is_empty())
            .map(|c| {
                let options = CaptionOptions {
                    video_width: spec.width,
                    video_height: spec.height,
                    ..c.options.clone()
                };
                (c.segments.as_slice(), options)
            });
        if let Some((segments, options)) = &captions {
            CaptionEngine::validate(segments, options)?;
        }

        self.tool.ensure_available().await?;
        let scratch = self.scratch()?;

        let mut sources: Vec<(String, &MediaSource)> = Vec::new();
        for (i, scene) in request.scenes.iter().enumerate() {
            sources.push((format!("scene{i}.video"), &scene.video));
        }
        let audio_slots: Vec<Option<usize>> = request
            .scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                scene.audio.as_ref().map(|audio| {
                    sources.push((format!("scene{i}.audio"), audio));
                    sources.len() - 1
                })
            })
            .collect();
        let intro_slot = request.intro.as_ref().map(|intro| {
            sources.push(("intro.video".to_string(), intro));
            sources.len() - 1
        });
        let outro_slot = request.outro.as_ref().map(|outro| {
            sources.push(("outro.video".to_string(), outro));
            sources.len() - 1
        });
        let inputs = scratch.materialize_all(&sources).await?;

        // (video, audio, timeline entry) in playback order
        let mut timeline: Vec<(PathBuf, Option<PathBuf>, TimelineEntry)> = Vec::new();
        let mut intro_duration = 0.0;
        if let Some(slot) = intro_slot {
            intro_duration = self.tool.probe_duration(&inputs[slot]).await?;
            timeline.push((inputs[slot].clone(), None, TimelineEntry::new(intro_duration, None)));
        }
        let last_scene = request.scenes.len() - 1;
        for (i, scene) in request.scenes.iter().enumerate() {
            let transition = if i == last_scene && outro_slot.is_some() {
                Some(TransitionSpec::none())
            } else {
                scene.transition
            };
            let audio = audio_slots[i].map(|slot| inputs[slot].clone());
            timeline.push((inputs[i].clone(), audio, TimelineEntry::new(scene.duration, transition)));
        }
        if let Some(slot) = outro_slot {
            let duration = self.tool.probe_duration(&inputs[slot]).await?;
            timeline.push((inputs[slot].clone(), None, TimelineEntry::new(duration, None)));
        }

        let entries: Vec<TimelineEntry> = timeline.iter().map(|(_, _, e)| e.clone()).collect();
        // Intro/outro clips may differ in size and codec from the scenes.
        let plan = if intro_slot.is_some() || outro_slot.is_some() {
            plan_timeline_reencoded(&entries)?
        } else {
            plan_timeline(&entries)?
        };
        tracing::info!(
            project_id = %request.project_id,
            clips = entries.len(),
            topology = ?plan.topology,
            total_duration = plan.total_duration,
            "Assembly planned"
        );

        let mut merged = Vec::with_capacity(timeline.len());
        for (i, (video, audio, entry)) in timeline.iter().enumerate() {
            let output = scratch.file(&format!("merged{i}.mp4"));
            let args = merge_args(
                video,
                audio.as_deref(),
                entry.duration,
                &self.defaults.audio_codec,
                self.defaults.audio_bitrate_kbps,
                &output,
            );
            self.tool
                .run(&format!("merge clip {i}"), &args, self.timeouts.merge(), None)
                .await?;
            merged.push(output);
        }

        let extension = spec.format.extension();
        let assembled = scratch.file(&format!("assembled.{extension}"));
        let watch = progress.map(|cb| {
            ProgressWatch::new(
                plan.total_duration,
                frame_count(plan.total_duration, spec.fps),
                cb,
            )
        });
        self.join_clips(&scratch, &merged, &plan, &spec, &assembled, watch.as_ref())
            .await?;

        let mut current = assembled;
        if let Some(bed) = &request.music {
            let mix = AudioMixRequest::with_music_bed(MediaSource::Path(current.clone()), bed);
            let mixed = mix_audio(
                &self.tool,
                &scratch,
                &mix,
                "music_mix.m4a",
                spec.audio_bitrate_kbps,
                self.timeouts.audio_mix(),
            )
            .await?;
            let scored = scratch.file(&format!("scored.{extension}"));
            let args = replace_audio_args(&current, &mixed, spec.format, spec.audio_bitrate_kbps, &scored);
            self.tool.run("mux music", &args, self.timeouts.merge(), None).await?;
            current = scored;
        }

        if let Some((segments, options)) = &captions {
            let segments = caption_timeline(segments, intro_duration);
            let caption_plan = self.caption_plan(&segments, options)?;
            let captioned = scratch.file(&format!("captioned.{extension}"));
            self.burn_captions(&scratch, &current, &caption_plan, spec.format, &captioned)
                .await?;
            current = captioned;
        }

        let video = tokio::fs::read(&current).await?;
        tracing::info!(
            project_id = %request.project_id,
            bytes = video.len(),
            duration = plan.total_duration,
            "Project assembled"
        );

        Ok(AssembledVideo {
            project_id: request.project_id.clone(),
            size_bytes: video.len() as u64,
            video,
            duration: plan.total_duration,
            format: spec.format.label().to_string(),
            rendered_at: Utc::now(),
        })
    }

    async fn join_clips(
        &self,
        scratch: &ScratchSpace,
        merged: &[PathBuf],
        plan: &TimelinePlan,
        spec: &OutputSpec,
        output: &Path,
        progress: Option<&ProgressWatch>,
    ) -> StoryreelResult<()> {
        let args = match plan.topology {
            Topology::ScaleOnly => encode_args(&merged[..1], &scale_graph(spec), "0:a", spec, output),
            Topology::Concat => {
                let manifest = scratch.file("concat.txt");
                tokio::fs::write(&manifest, concat_manifest(merged)).await?;
                let joined = scratch.file("joined.mp4");
                self.tool
                    .run("concat clips", &concat_args(&manifest, &joined), self.timeouts.merge(), None)
                    .await?;
                encode_args(&[joined], &scale_graph(spec), "0:a", spec, output)
            }
            Topology::Crossfade => {
                let (graph, audio) = crossfade_graph(plan, spec);
                encode_args(merged, &graph, &audio, spec, output)
            }
        };
        self.tool
            .run("assemble project", &args, self.timeouts.assembly(), progress)
            .await
    }

    /// Burn `segments` into `video` with the style in `options`.
    ///
    /// The output is H.264 MP4 with the audio carried over.
    pub async fn embed_captions(
        &self,
        video: &MediaSource,
        segments: &[SubtitleSegment],
        options: &CaptionOptions,
    ) -> StoryreelResult<Vec<u8>> {
        let plan = self.caption_plan(segments, options)?;
        self.tool.ensure_available().await?;

        let scratch = self.scratch()?;
        let input = scratch.materialize("captions.source", video).await?;
        let output = scratch.file("captioned.mp4");
        self.burn_captions(&scratch, &input, &plan, OutputFormat::Mp4H264, &output)
            .await?;
        scratch.read("captioned.mp4").await
    }

    async fn burn_captions(
        &self,
        scratch: &ScratchSpace,
        input: &Path,
        plan: &CaptionPlan,
        format: OutputFormat,
        output: &Path,
    ) -> StoryreelResult<()> {
        let filter_args = match plan {
            CaptionPlan::SubtitleScript(script) => {
                let path = scratch.file("captions.ass");
                tokio::fs::write(&path, script).await?;
                vec!["-vf".to_string(), subtitles_filter(&path)]
            }
            CaptionPlan::Overlays(overlays) if overlays.is_empty() => {
                vec!["-vf".to_string(), "null".to_string()]
            }
            CaptionPlan::Overlays(_) => {
                let path = scratch.file("captions.filter");
                tokio::fs::write(&path, plan.to_filter_text()).await?;
                vec!["-filter_script:v".to_string(), path.display().to_string()]
            }
        };

        let mut args = vec!["-i".to_string(), input.display().to_string()];
        args.extend(filter_args);
        args.extend([
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "0:a?".to_string(),
        ]);
        args.extend(format.codec_args(self.defaults.video_bitrate_kbps, self.defaults.audio_bitrate_kbps));
        args.push(output.display().to_string());

        self.tool
            .run("burn captions", &args, self.timeouts.captions(), None)
            .await
    }

    /// Mix narration with optional music into AAC bytes.
    pub async fn mix_audio(&self, request: &AudioMixRequest) -> StoryreelResult<Vec<u8>> {
        crate::audio::build_audio_graph(request)?;
        self.tool.ensure_available().await?;
        let scratch = self.scratch()?;
        mix_audio(
            &self.tool,
            &scratch,
            request,
            "mix.m4a",
            self.defaults.audio_bitrate_kbps,
            self.timeouts.audio_mix(),
        )
        .await?;
        scratch.read("mix.m4a").await
    }
}

#[async_trait]
impl RenderingBackend for FfmpegBackend {
    fn id(&self) -> &str {
        FFMPEG_BACKEND_ID
    }

    fn name(&self) -> &str {
        "FFmpeg"
    }

    async fn render_scene(&self, request: &RenderSceneRequest) -> StoryreelResult<RenderedClip> {
        self.render_scene_with_progress(request, None).await
    }

    async fn assemble_project(&self, request: &AssembleProjectRequest) -> StoryreelResult<AssembledVideo> {
        self.assemble_project_with_progress(request, None).await
    }

    async fn is_available(&self) -> bool {
        self.tool.is_available().await
    }
}

/// Caption segments placed on the assembled timeline, after any intro.
pub fn caption_timeline(segments: &[SubtitleSegment], intro_duration: f64) -> Vec<SubtitleSegment> {
    if intro_duration > 0.0 {
        offset_segments(segments, intro_duration)
    } else {
        segments.to_vec()
    }
}

/// ffmpeg arguments turning `input` into a clip as described by `plan`.
///
/// `still` marks an image input. `zoompan` builds every frame from the first
/// input frame, so video inputs must use the static plan; they are trimmed
/// to `duration` instead of looped.
pub fn clip_args(
    input: &Path,
    plan: &MotionPlan,
    still: bool,
    duration: f64,
    video_bitrate_kbps: u32,
    output: &Path,
) -> Vec<String> {
    let mut args = Vec::new();
    if still && !plan.animated {
        args.extend(["-loop".to_string(), "1".to_string()]);
    }
    args.extend(["-i".to_string(), input.display().to_string()]);
    if !plan.animated {
        args.extend(["-t".to_string(), format_secs(duration)]);
    }
    args.extend([
        "-vf".to_string(),
        plan.filter.to_string(),
        "-frames:v".to_string(),
        plan.frame_count.to_string(),
        "-r".to_string(),
        plan.fps.to_string(),
        "-an".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "medium".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-b:v".to_string(),
        format!("{}k", video_bitrate_kbps.max(1000)),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output.display().to_string(),
    ]);
    args
}

/// `subtitles` filter reading an ASS file.
pub fn subtitles_filter(path: &Path) -> String {
    let escaped = path
        .display()
        .to_string()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'");
    format!("subtitles=filename='{escaped}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_common::error::ErrorKind;
    use storyreel_media_model::{MotionSpec, MotionType};

    fn offline_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.ffmpeg.binary = PathBuf::from("/nonexistent/storyreel-ffmpeg");
        config.ffmpeg.ffprobe_binary = PathBuf::from("/nonexistent/storyreel-ffprobe");
        config
    }

    #[test]
    fn test_clip_args_with_motion() {
        let plan = compile_motion(&MotionSpec::new(MotionType::ZoomIn, 0.5), 3.0, 30, 1080, 1920).unwrap();
        let args = clip_args(Path::new("scene.png"), &plan, true, 3.0, 6000, Path::new("clip.mp4"));
        let joined = args.join(" ");
        assert!(!joined.contains("-loop"));
        assert!(joined.contains("-frames:v 90 -r 30"));
        assert!(joined.contains("zoompan=z='1+0.12*on/90'"));
    }

    #[test]
    fn test_clip_args_static_loop() {
        let plan = static_loop(2.5, 30, 1080, 1920).unwrap();
        let args = clip_args(Path::new("scene.png"), &plan, true, 2.5, 6000, Path::new("clip.mp4"));
        assert_eq!(&args[..6], ["-loop", "1", "-i", "scene.png", "-t", "2.5"]);
    }

    #[test]
    fn test_clip_args_video_source_is_trimmed() {
        let plan = static_loop(2.5, 30, 1080, 1920).unwrap();
        let args = clip_args(Path::new("scene.mp4"), &plan, false, 2.5, 6000, Path::new("clip.mp4"));
        assert_eq!(&args[..4], ["-i", "scene.mp4", "-t", "2.5"]);
        assert!(!args.join(" ").contains("zoompan"));
    }

    #[test]
    fn test_subtitles_filter_escapes_path() {
        assert_eq!(
            subtitles_filter(Path::new("/tmp/a:b/captions.ass")),
            "subtitles=filename='/tmp/a\\:b/captions.ass'"
        );
    }

    #[test]
    fn test_captions_follow_the_intro() {
        let segments = vec![SubtitleSegment::new("after the intro", 0.5, 2.0)];
        let shifted = caption_timeline(&segments, 3.0);
        assert_eq!((shifted[0].start_time, shifted[0].end_time), (3.5, 5.0));
        assert_eq!(caption_timeline(&segments, 0.0), segments);
    }

    #[tokio::test]
    async fn test_validation_precedes_tool_check() {
        let backend = FfmpegBackend::new(&offline_config());
        let request = RenderSceneRequest {
            scene_id: "s1".to_string(),
            source: MediaSource::from_location("scene.png"),
            duration: 3.0,
            motion: None,
            width: Some(0),
            height: None,
            fps: None,
        };
        let err = backend.render_scene(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let request = RenderSceneRequest {
            width: None,
            ..request
        };
        let err = backend.render_scene(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
        assert!(!backend.is_available().await);
    }

    #[tokio::test]
    async fn test_empty_assembly_rejected() {
        let backend = FfmpegBackend::new(&offline_config());
        let request: AssembleProjectRequest =
            serde_json::from_str(r#"{"project_id": "p", "scenes": []}"#).unwrap();
        let err = backend.assemble_project(&request).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_embed_captions_needs_ffmpeg() {
        let backend = FfmpegBackend::new(&offline_config()).with_caption_seed(1);
        let segments = vec![SubtitleSegment::new("hello world", 0.0, 1.5)];
        let err = backend
            .embed_captions(&MediaSource::Bytes(vec![0; 8]), &segments, &CaptionOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
    }
}
