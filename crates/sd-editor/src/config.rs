//! Editor configuration.

use crate::error::EditorError;
use sd_core::ZERO_TOLERANCE;
use serde::{Deserialize, Serialize};

/// Tunables for the mutation engine and its history.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of commands kept for undo. Default: **100**.
    pub history_limit: usize,

    /// Tolerance for numeric "did it change" and face-contact tests.
    /// Default: **1e-6**.
    pub tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            tolerance: ZERO_TOLERANCE,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config document.
    ///
    /// # Errors
    /// Returns `EditorError::Config` if the JSON is malformed or a field
    /// has the wrong type.
    pub fn from_json(text: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(text)?)
    }
}
