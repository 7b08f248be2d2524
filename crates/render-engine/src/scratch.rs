//! Per-operation scratch storage.
//!
//! Each render or assembly gets its own temporary directory. Byte payloads
//! are written into it so ffmpeg can read them as files; the directory and
//! everything in it is removed when the [`ScratchSpace`] is dropped, on
//! success and failure alike.

use std::path::{Path, PathBuf};

use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_media_model::MediaSource;
use tempfile::TempDir;
use tokio::task::JoinSet;

#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a scratch directory under `parent`, or the system temp dir.
    pub fn new(parent: Option<&Path>) -> StoryreelResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("storyreel-");
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        tracing::debug!(path = %dir.path().display(), "Scratch directory created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file named `name` inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Turn `sources` into ffmpeg inputs.
    ///
    /// Byte payloads are written to `<name>` in parallel; local paths must
    /// exist and are used in place; URLs are handed to ffmpeg unchanged.
    /// The returned inputs are in the same order as `sources`.
    pub async fn materialize_all(&self, sources: &[(String, &MediaSource)]) -> StoryreelResult<Vec<PathBuf>> {
        let mut inputs: Vec<Option<PathBuf>> = vec![None; sources.len()];
        let mut writes = JoinSet::new();

        for (index, (name, source)) in sources.iter().enumerate() {
            match source {
                MediaSource::Url(url) => inputs[index] = Some(PathBuf::from(url)),
                MediaSource::Path(path) => {
                    if !path.exists() {
                        return Err(StoryreelError::FileNotFound { path: path.clone() });
                    }
                    inputs[index] = Some(path.clone());
                }
                MediaSource::Bytes(bytes) => {
                    if bytes.is_empty() {
                        return Err(StoryreelError::validation(format!("input '{name}' is empty")));
                    }
                    let target = self.file(name);
                    let payload = bytes.clone();
                    writes.spawn(async move {
                        tokio::fs::write(&target, payload).await.map(|_| (index, target))
                    });
                }
            }
        }

        while let Some(joined) = writes.join_next().await {
            let (index, path) = joined
                .map_err(|e| StoryreelError::render(format!("scratch write task failed: {e}")))??;
            inputs[index] = Some(path);
        }

        let inputs: Vec<PathBuf> = inputs.into_iter().flatten().collect();
        if inputs.len() != sources.len() {
            return Err(StoryreelError::render("scratch materialization lost an input"));
        }
        tracing::debug!(count = inputs.len(), "Inputs materialized");
        Ok(inputs)
    }

    /// Single-source convenience over [`ScratchSpace::materialize_all`].
    pub async fn materialize(&self, name: &str, source: &MediaSource) -> StoryreelResult<PathBuf> {
        let mut inputs = self.materialize_all(&[(name.to_string(), source)]).await?;
        inputs
            .pop()
            .ok_or_else(|| StoryreelError::render("scratch materialization lost an input"))
    }

    /// Read a finished output back into memory.
    pub async fn read(&self, name: &str) -> StoryreelResult<Vec<u8>> {
        let path = self.file(name);
        let bytes = tokio::fs::read(&path).await?;
        if bytes.is_empty() {
            return Err(StoryreelError::render(format!(
                "ffmpeg produced an empty file: {}",
                path.display()
            )));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyreel_common::error::ErrorKind;

    #[tokio::test]
    async fn test_materialize_keeps_order() {
        let scratch = ScratchSpace::new(None).unwrap();
        let a = MediaSource::Bytes(b"first".to_vec());
        let b = MediaSource::Url("https://cdn.example.com/b.mp4".to_string());
        let c = MediaSource::Bytes(b"third".to_vec());

        let inputs = scratch
            .materialize_all(&[
                ("a.bin".to_string(), &a),
                ("b.mp4".to_string(), &b),
                ("c.bin".to_string(), &c),
            ])
            .await
            .unwrap();

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0], scratch.file("a.bin"));
        assert_eq!(inputs[1], PathBuf::from("https://cdn.example.com/b.mp4"));
        assert_eq!(std::fs::read(&inputs[2]).unwrap(), b"third");
    }

    #[tokio::test]
    async fn test_directory_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchSpace::new(Some(parent.path())).unwrap();
            let source = MediaSource::Bytes(vec![1, 2, 3]);
            scratch.materialize("clip.bin", &source).await.unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(parent.path().exists());
    }

    #[tokio::test]
    async fn test_missing_path_and_empty_bytes_rejected() {
        let scratch = ScratchSpace::new(None).unwrap();
        let missing = MediaSource::Path(PathBuf::from("/nonexistent/scene.png"));
        assert!(matches!(
            scratch.materialize("x", &missing).await,
            Err(StoryreelError::FileNotFound { .. })
        ));

        let empty = MediaSource::Bytes(Vec::new());
        let err = scratch.materialize("y", &empty).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
