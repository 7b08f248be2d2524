//! StoryReel Render Engine
//!
//! Turns scene assets into clips and clips into finished short videos,
//! driving `ffmpeg` as a subprocess.
//!
//! # Pipeline Architecture
//!
//! ```text
//! scene image ── motion compiler (zoompan) ──► scene clip
//!                                                  │
//! narration ───────────────────────────────────────┤ merge
//!                                                  ▼
//!                             timeline plan (scale-only / concat / crossfade)
//!                                                  │
//! music bed ── audio mixer ────────────────────────┤
//!                                                  │
//! segments ── caption engine (ASS / drawtext) ─────┤ burn-in
//!                                                  ▼
//!                                         output.mp4 / .webm
//! ```
//!
//! Backends sit behind [`RenderingBackend`] and are looked up by id in a
//! [`BackendRegistry`].

pub mod assembly;
pub mod audio;
pub mod backend;
pub mod composition_backend;
pub mod ffmpeg_backend;
pub mod filter_graph;
pub mod motion;
pub mod registry;
pub mod runner;
pub mod scratch;
pub mod variety;

pub use assembly::{plan_timeline, plan_timeline_reencoded, PlannedTransition, TimelineEntry, TimelinePlan, Topology};
pub use audio::{build_audio_graph, AudioMixRequest};
pub use backend::RenderingBackend;
pub use composition_backend::{CompositionBackend, COMPOSITION_BACKEND_ID};
pub use ffmpeg_backend::{FfmpegBackend, FFMPEG_BACKEND_ID};
pub use filter_graph::{Filter, FilterChain, FilterGraph};
pub use motion::{compile_motion, static_loop, MotionPlan};
pub use registry::BackendRegistry;
pub use runner::{parse_dimensions, FfmpegTool, ProgressCallback, RenderProgress, RenderStage};
pub use scratch::ScratchSpace;
pub use variety::VarietyPicker;
