//! Error types for the editor crate.

use sd_core::SceneError;
use thiserror::Error;

/// Errors surfaced by the editor crate.
#[derive(Error, Debug)]
pub enum EditorError {
    /// The config document could not be parsed.
    #[error("invalid editor config: {0}")]
    Config(#[from] serde_json::Error),

    /// A store write failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
}
