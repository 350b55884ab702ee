//! Model assets and the loaders that fetch them.
//!
//! Loading is request/poll: callers get an id back immediately and pick up
//! completions on a later frame, in whatever order they finish.

pub mod memory;
pub mod fs_loader;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::AssetError;
use crate::math::Aabb;

pub use memory::MemoryAssetLoader;
pub use fs_loader::FsAssetLoader;

/// A single mesh in a model, described by its bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub bounds: Aabb,
}

/// Loaded model descriptor. Shared between every node that instances it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

impl ModelData {
    /// Single-mesh model, mostly for tests and in-memory registries.
    pub fn single(name: impl Into<String>, bounds: Aabb) -> Self {
        let name = name.into();
        Self {
            meshes: vec![MeshData { name: name.clone(), bounds }],
            name,
        }
    }

    /// Union of all mesh bounds.
    pub fn bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::empty(), |acc, mesh| acc.merged(&mesh.bounds))
    }
}

/// Parse a JSON model descriptor fetched from `url`.
pub fn parse_model(url: &str, json: &str) -> Result<ModelData, AssetError> {
    let model: ModelData = serde_json::from_str(json).map_err(|e| AssetError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if model.meshes.is_empty() || model.bounds().is_empty() {
        return Err(AssetError::EmptyModel(url.to_string()));
    }
    Ok(model)
}

/// Handle for an in-flight load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetRequestId(pub u64);

/// Completion of one request.
#[derive(Debug)]
pub struct AssetLoadResult {
    pub id: AssetRequestId,
    pub url: String,
    pub outcome: Result<Arc<ModelData>, AssetError>,
}

/// Source of model assets.
pub trait AssetLoader {
    /// Start loading `url`. Never blocks.
    fn request(&mut self, url: &str) -> AssetRequestId;

    /// Drain completions that are ready (non-blocking).
    fn poll(&mut self) -> Vec<AssetLoadResult>;

    /// Requests issued but not yet returned by `poll`.
    fn pending_count(&self) -> usize;
}
