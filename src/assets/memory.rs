//! In-memory asset registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::AssetError;
use super::{AssetLoadResult, AssetLoader, AssetRequestId, ModelData};

struct PendingRequest {
    id: AssetRequestId,
    url: String,
    polls_left: u32,
}

/// Serves models registered up front. Completions are held back for `latency`
/// polls so callers see the same deferred behaviour as a real loader.
pub struct MemoryAssetLoader {
    models: HashMap<String, Arc<ModelData>>,
    pending: Vec<PendingRequest>,
    latency: u32,
    next_id: u64,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
            pending: Vec::new(),
            latency: 0,
            next_id: 0,
        }
    }

    /// Number of `poll` calls a request waits before completing.
    pub fn with_latency(mut self, polls: u32) -> Self {
        self.latency = polls;
        self
    }

    pub fn set_latency(&mut self, polls: u32) {
        self.latency = polls;
    }

    pub fn insert(&mut self, url: impl Into<String>, model: ModelData) {
        self.models.insert(url.into(), Arc::new(model));
    }

    /// Drop a registered model so later requests for it fail.
    pub fn remove(&mut self, url: &str) -> bool {
        self.models.remove(url).is_some()
    }
}

impl Default for MemoryAssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn request(&mut self, url: &str) -> AssetRequestId {
        let id = AssetRequestId(self.next_id);
        self.next_id += 1;
        self.pending.push(PendingRequest {
            id,
            url: url.to_string(),
            polls_left: self.latency,
        });
        id
    }

    fn poll(&mut self) -> Vec<AssetLoadResult> {
        let mut ready = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for mut request in self.pending.drain(..) {
            if request.polls_left > 0 {
                request.polls_left -= 1;
                waiting.push(request);
            } else {
                ready.push(request);
            }
        }
        self.pending = waiting;

        ready
            .into_iter()
            .map(|request| {
                let outcome = self
                    .models
                    .get(&request.url)
                    .cloned()
                    .ok_or_else(|| AssetError::NotFound(request.url.clone()));
                AssetLoadResult {
                    id: request.id,
                    url: request.url,
                    outcome,
                }
            })
            .collect()
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
