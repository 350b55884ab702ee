//! Error types for the plating core

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Unknown dish: {0}")]
    UnknownDish(u64),

    #[error("Config error: {0}")]
    Config(String),
}

/// Failure to resolve a 3D asset.
///
/// Never fatal to a scene: the composer logs it and substitutes a fallback primitive.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("failed to read asset {url}: {reason}")]
    Io { url: String, reason: String },

    #[error("failed to parse asset {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("asset {0} has no geometry")]
    EmptyModel(String),
}
