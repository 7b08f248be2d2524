//! Backend registry.
//!
//! A constructed value owned by whoever wires the application together;
//! there is no process-wide instance. Registering an id that already
//! exists replaces the earlier backend.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use storyreel_common::config::AppConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::backend::RenderingBackend;
use crate::composition_backend::CompositionBackend;
use crate::ffmpeg_backend::FfmpegBackend;

#[derive(Default)]
pub struct BackendRegistry {
    backends: RwLock<HashMap<String, Arc<dyn RenderingBackend>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the ffmpeg backend and the composition stub.
    pub fn with_defaults(config: &AppConfig) -> Self {
        let registry = Self::new();
        registry.register(Arc::new(FfmpegBackend::new(config)));
        registry.register(Arc::new(CompositionBackend::new()));
        registry
    }

    /// Add `backend` under its id, replacing any previous entry.
    pub fn register(&self, backend: Arc<dyn RenderingBackend>) {
        let id = backend.id().to_string();
        let mut backends = self.backends.write().unwrap_or_else(PoisonError::into_inner);
        if backends.insert(id.clone(), backend).is_some() {
            tracing::debug!(backend = %id, "Replaced registered backend");
        } else {
            tracing::debug!(backend = %id, "Registered backend");
        }
    }

    pub fn get(&self, id: &str) -> StoryreelResult<Arc<dyn RenderingBackend>> {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        backends
            .get(id)
            .cloned()
            .ok_or_else(|| StoryreelError::unknown_backend(id, backends.keys().cloned().collect()))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = backends.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Backends whose availability probe succeeds, in id order.
    pub async fn get_available(&self) -> Vec<Arc<dyn RenderingBackend>> {
        let mut candidates: Vec<Arc<dyn RenderingBackend>> = {
            let backends = self.backends.read().unwrap_or_else(PoisonError::into_inner);
            backends.values().cloned().collect()
        };
        candidates.sort_by(|a, b| a.id().cmp(b.id()));

        let mut available = Vec::new();
        for backend in candidates {
            if backend.is_available().await {
                available.push(backend);
            } else {
                tracing::debug!(backend = backend.id(), "Backend unavailable");
            }
        }
        available
    }
}
