//! StoryReel Media Model
//!
//! Defines the data contracts shared by the caption and render crates:
//! - **Scenes:** per-scene render requests and rendered clips
//! - **Timeline:** ordered assembly scenes joined by transitions
//! - **Motion:** pan/zoom settings for still images
//! - **Captions:** subtitle segments, word timings, and caption options
//! - **Bounds:** numeric limits enforced before any subprocess runs
//!
//! All times are `f64` seconds; all sizes are output pixels.

pub mod bounds;
pub mod caption;
pub mod media;
pub mod motion;
pub mod scene;
pub mod transition;

pub use bounds::*;
pub use caption::*;
pub use media::*;
pub use motion::*;
pub use scene::*;
pub use transition::*;
