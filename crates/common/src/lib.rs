//! StoryReel Common Utilities
//!
//! Shared infrastructure for all StoryReel crates:
//! - Error taxonomy and result aliases
//! - Timecode formatting and frame math
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
