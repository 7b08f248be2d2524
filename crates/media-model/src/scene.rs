//! Scene render and project assembly requests and their outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::caption::{CaptionOptions, CaptionPosition, HorizontalAnchor, SubtitleSegment, VerticalAnchor};
use crate::media::{MediaSource, OutputFormat};
use crate::motion::MotionSpec;
use crate::transition::TransitionSpec;

/// Request to turn one scene asset into a clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSceneRequest {
    pub scene_id: String,

    /// Still image (or short video) the clip is built from.
    pub source: MediaSource,

    /// Clip length in seconds.
    pub duration: f64,

    /// Pan/zoom to apply. Absent means a static loop.
    #[serde(default)]
    pub motion: Option<MotionSpec>,

    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<u32>,
}

/// A rendered per-scene clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedClip {
    pub scene_id: String,

    /// Encoded video payload.
    #[serde(skip)]
    pub video: Vec<u8>,

    pub duration: f64,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub rendered_at: DateTime<Utc>,
}

/// One entry of the assembly timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyScene {
    /// Picture, typically a [`RenderedClip`] payload.
    pub video: MediaSource,

    /// Narration for this scene. Missing audio is replaced with silence.
    #[serde(default)]
    pub audio: Option<MediaSource>,

    /// Scene length in seconds, as placed on the timeline.
    pub duration: f64,

    /// Transition into the following scene; ignored on the last scene.
    #[serde(default)]
    pub transition: Option<TransitionSpec>,
}

/// Text watermark burned into the final output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watermark {
    pub text: String,
    pub font_size: u32,
    /// `#RRGGBB`.
    pub color: String,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    pub position: CaptionPosition,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 28,
            color: "#FFFFFF".to_string(),
            opacity: 0.6,
            position: CaptionPosition::new(VerticalAnchor::Bottom, HorizontalAnchor::Right),
        }
    }
}

/// Project-wide background music mixed under the assembled narration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicBed {
    pub source: MediaSource,

    /// Music volume, percent.
    #[serde(default = "default_music_volume")]
    pub volume: f64,

    /// Narration volume, percent.
    #[serde(default = "default_narration_volume")]
    pub narration_volume: f64,

    /// Lower music under speech. Accepted but not yet applied.
    #[serde(default)]
    pub ducking: bool,
}

fn default_music_volume() -> f64 {
    20.0
}

fn default_narration_volume() -> f64 {
    100.0
}

/// Captions to burn into an assembled project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRequest {
    pub segments: Vec<SubtitleSegment>,
    #[serde(default)]
    pub options: CaptionOptions,
}

/// Request to assemble a whole project from rendered scenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembleProjectRequest {
    pub project_id: String,
    pub scenes: Vec<AssemblyScene>,

    #[serde(default)]
    pub output_format: Option<OutputFormat>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub fps: Option<u32>,

    #[serde(default)]
    pub captions: Option<CaptionRequest>,
    #[serde(default)]
    pub watermark: Option<Watermark>,
    #[serde(default)]
    pub intro: Option<MediaSource>,
    #[serde(default)]
    pub outro: Option<MediaSource>,
    #[serde(default)]
    pub music: Option<MusicBed>,
}

/// The assembled project video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssembledVideo {
    pub project_id: String,

    #[serde(skip)]
    pub video: Vec<u8>,

    pub duration: f64,
    pub format: String,
    pub size_bytes: u64,
    pub rendered_at: DateTime<Utc>,
}
