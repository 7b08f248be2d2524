//! Rendering backend contract.

use async_trait::async_trait;
use storyreel_common::error::StoryreelResult;
use storyreel_media_model::{AssembleProjectRequest, AssembledVideo, RenderSceneRequest, RenderedClip};

/// A strategy for producing scene clips and assembled projects.
///
/// Implementations are shared across tasks through the
/// [`BackendRegistry`](crate::registry::BackendRegistry), so every method
/// takes `&self`.
#[async_trait]
pub trait RenderingBackend: Send + Sync {
    /// Stable identifier used for lookup (e.g. `ffmpeg`).
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Turn one scene asset into a clip.
    async fn render_scene(&self, request: &RenderSceneRequest) -> StoryreelResult<RenderedClip>;

    /// Join rendered scenes into the final project video.
    async fn assemble_project(&self, request: &AssembleProjectRequest) -> StoryreelResult<AssembledVideo>;

    /// Whether the backend can run in this environment right now.
    async fn is_available(&self) -> bool;
}
