//! StoryReel Captions
//!
//! Turns timed caption segments into burn-in instructions:
//! - **Registry:** the catalog of caption styles and their strategies
//! - **Timing:** word timings, synthesized when alignment is missing
//! - **Engine:** ASS scripts or `drawtext` overlay chains per style
//! - **Sidecar:** SRT/VTT export of the same segments

pub mod ass;
pub mod color;
pub mod drawtext;
pub mod engine;
pub mod layout;
pub mod registry;
pub mod sidecar;
pub mod styles;
pub mod timing;

pub use engine::{CaptionEngine, CaptionPlan};
pub use registry::*;
pub use sidecar::*;
pub use timing::*;
