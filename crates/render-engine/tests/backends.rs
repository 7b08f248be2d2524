use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use storyreel_common::config::AppConfig;
use storyreel_common::error::{ErrorKind, StoryreelError, StoryreelResult};
use storyreel_media_model::{AssembleProjectRequest, AssembledVideo, MediaSource, RenderSceneRequest, RenderedClip};
use storyreel_render_engine::{BackendRegistry, CompositionBackend, FfmpegBackend, RenderingBackend};

/// Backend that only reports a fixed name.
struct Named {
    id: &'static str,
    name: &'static str,
    available: bool,
}

#[async_trait]
impl RenderingBackend for Named {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn render_scene(&self, _request: &RenderSceneRequest) -> StoryreelResult<RenderedClip> {
        Err(StoryreelError::unsupported("test backend"))
    }

    async fn assemble_project(&self, _request: &AssembleProjectRequest) -> StoryreelResult<AssembledVideo> {
        Err(StoryreelError::unsupported("test backend"))
    }

    async fn is_available(&self) -> bool {
        self.available
    }
}

fn offline_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.ffmpeg.binary = PathBuf::from("/nonexistent/storyreel-ffmpeg");
    config.ffmpeg.ffprobe_binary = PathBuf::from("/nonexistent/storyreel-ffprobe");
    config
}

#[test]
fn reregistering_an_id_replaces_the_backend() {
    let registry = BackendRegistry::new();
    registry.register(Arc::new(Named { id: "gpu", name: "first", available: true }));
    registry.register(Arc::new(Named { id: "gpu", name: "second", available: true }));

    assert_eq!(registry.ids(), vec!["gpu".to_string()]);
    assert_eq!(registry.get("gpu").unwrap().name(), "second");
}

#[test]
fn unknown_backend_lists_registered_ids() {
    let registry = BackendRegistry::with_defaults(&offline_config());
    assert_eq!(registry.ids(), vec!["composition".to_string(), "ffmpeg".to_string()]);

    let err = registry.get("remotion").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::UnknownBackend);
    assert!(err.to_string().contains("[composition, ffmpeg]"));
}

#[tokio::test]
async fn only_available_backends_are_returned() {
    let registry = BackendRegistry::with_defaults(&offline_config());
    registry.register(Arc::new(Named { id: "cloud", name: "Cloud", available: true }));

    let available: Vec<String> = registry
        .get_available()
        .await
        .iter()
        .map(|b| b.id().to_string())
        .collect();
    assert_eq!(available, vec!["cloud".to_string()]);
}

#[tokio::test]
async fn composition_backend_is_unsupported() {
    let backend = CompositionBackend::new();
    let request: AssembleProjectRequest = serde_json::from_str(
        r#"{"project_id": "demo", "scenes": [{"video": {"path": "s1.mp4"}, "duration": 3.0}]}"#,
    )
    .unwrap();
    let err = backend.assemble_project(&request).await.unwrap_err();
    assert!(matches!(err, StoryreelError::Unsupported { .. }));

    let scene = RenderSceneRequest {
        scene_id: "s1".to_string(),
        source: MediaSource::from_location("s1.png"),
        duration: 2.0,
        motion: None,
        width: None,
        height: None,
        fps: None,
    };
    assert!(backend.render_scene(&scene).await.is_err());
}

#[tokio::test]
async fn assembly_inputs_are_validated_before_ffmpeg_is_needed() {
    let backend = FfmpegBackend::new(&offline_config());

    let quiet_music: AssembleProjectRequest = serde_json::from_str(
        r#"{"project_id": "p", "scenes": [{"video": {"path": "s1.mp4"}, "duration": 3.0}],
            "music": {"source": {"path": "bed.mp3"}, "volume": -50}}"#,
    )
    .unwrap();
    let err = backend.assemble_project(&quiet_music).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let bad_captions: AssembleProjectRequest = serde_json::from_str(
        r#"{"project_id": "p", "scenes": [{"video": {"path": "s1.mp4"}, "duration": 3.0}],
            "captions": {"segments": [{"text": "late", "start_time": 2.0, "end_time": 1.0}]}}"#,
    )
    .unwrap();
    let err = backend.assemble_project(&bad_captions).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let valid: AssembleProjectRequest = serde_json::from_str(
        r#"{"project_id": "p", "scenes": [{"video": {"path": "s1.mp4"}, "duration": 3.0}],
            "music": {"source": {"path": "bed.mp3"}, "volume": 15}}"#,
    )
    .unwrap();
    let err = backend.assemble_project(&valid).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
}
