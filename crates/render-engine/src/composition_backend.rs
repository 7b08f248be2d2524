//! Placeholder for a programmatic composition renderer.

use async_trait::async_trait;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_media_model::{AssembleProjectRequest, AssembledVideo, RenderSceneRequest, RenderedClip};

use crate::backend::RenderingBackend;

pub const COMPOSITION_BACKEND_ID: &str = "composition";

/// Registered so it can be listed and selected, but never available.
#[derive(Debug, Default, Clone)]
pub struct CompositionBackend;

impl CompositionBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RenderingBackend for CompositionBackend {
    fn id(&self) -> &str {
        COMPOSITION_BACKEND_ID
    }

    fn name(&self) -> &str {
        "Composition renderer"
    }

    async fn render_scene(&self, request: &RenderSceneRequest) -> StoryreelResult<RenderedClip> {
        tracing::warn!(scene_id = %request.scene_id, "Composition backend cannot render scenes");
        Err(StoryreelError::unsupported(
            "composition backend is not implemented; use the ffmpeg backend",
        ))
    }

    async fn assemble_project(&self, request: &AssembleProjectRequest) -> StoryreelResult<AssembledVideo> {
        tracing::warn!(project_id = %request.project_id, "Composition backend cannot assemble projects");
        Err(StoryreelError::unsupported(
            "composition backend is not implemented; use the ffmpeg backend",
        ))
    }

    async fn is_available(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_media_model::MediaSource;

    #[tokio::test]
    async fn test_stub_is_unavailable_and_unsupported() {
        let backend = CompositionBackend::new();
        assert_eq!(backend.id(), "composition");
        assert!(!backend.is_available().await);

        let request = RenderSceneRequest {
            scene_id: "s1".to_string(),
            source: MediaSource::from_location("scene.png"),
            duration: 3.0,
            motion: None,
            width: None,
            height: None,
            fps: None,
        };
        let err = backend.render_scene(&request).await.unwrap_err();
        assert!(matches!(err, StoryreelError::Unsupported { .. }));
    }
}
