//! Assemble a project manifest into a finished video.

use std::path::{Path, PathBuf};

use storyreel_common::config::AppConfig;
use storyreel_media_model::{AssembleProjectRequest, MediaSource};
use storyreel_render_engine::{BackendRegistry, RenderingBackend, VarietyPicker};

pub async fn run(
    config: &AppConfig,
    manifest: PathBuf,
    output: PathBuf,
    backend_id: &str,
    vary: bool,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&manifest)
        .map_err(|e| anyhow::anyhow!("Failed to read manifest {}: {e}", manifest.display()))?;
    let mut request: AssembleProjectRequest = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse manifest: {e}"))?;

    let base = manifest.parent().unwrap_or_else(|| Path::new("."));
    resolve_paths(&mut request, base);

    if vary {
        let mut picker = match seed {
            Some(seed) => VarietyPicker::with_seed(seed),
            None => VarietyPicker::new(),
        };
        picker.fill_missing(&mut request.scenes);
        tracing::debug!(seed = ?seed, "Missing transitions filled");
    }

    println!("Assembling project: {}", request.project_id);
    println!("  Scenes: {}", request.scenes.len());
    println!("  Backend: {backend_id}");
    println!("  Output: {}", output.display());

    let registry = BackendRegistry::with_defaults(config);
    let backend = registry.get(backend_id)?;
    let video = backend
        .assemble_project(&request)
        .await
        .map_err(|e| anyhow::anyhow!("Assembly failed: {e}"))?;

    std::fs::write(&output, &video.video)?;
    println!(
        "Assembly complete: {} ({:.2}s, {}, {} bytes)",
        output.display(),
        video.duration,
        video.format,
        video.size_bytes
    );

    Ok(())
}

/// Make relative manifest paths relative to the manifest's directory.
fn resolve_paths(request: &mut AssembleProjectRequest, base: &Path) {
    let sources = request
        .scenes
        .iter_mut()
        .flat_map(|scene| std::iter::once(&mut scene.video).chain(scene.audio.as_mut()))
        .chain(request.intro.as_mut())
        .chain(request.outro.as_mut())
        .chain(request.music.as_mut().map(|bed| &mut bed.source));

    for source in sources {
        if let MediaSource::Path(path) = source {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_follow_manifest() {
        let mut request: AssembleProjectRequest = serde_json::from_str(
            r#"{
                "project_id": "p1",
                "scenes": [
                    {"video": {"path": "clips/a.mp4"}, "audio": {"path": "/abs/a.wav"}, "duration": 3.0},
                    {"video": {"url": "https://cdn.example.com/b.mp4"}, "duration": 2.0}
                ],
                "outro": {"path": "outro.mp4"}
            }"#,
        )
        .unwrap();

        resolve_paths(&mut request, Path::new("/projects/demo"));

        assert_eq!(
            request.scenes[0].video,
            MediaSource::Path(PathBuf::from("/projects/demo/clips/a.mp4"))
        );
        assert_eq!(
            request.scenes[0].audio,
            Some(MediaSource::Path(PathBuf::from("/abs/a.wav")))
        );
        assert_eq!(
            request.scenes[1].video,
            MediaSource::Url("https://cdn.example.com/b.mp4".to_string())
        );
        assert_eq!(
            request.outro,
            Some(MediaSource::Path(PathBuf::from("/projects/demo/outro.mp4")))
        );
    }
}
