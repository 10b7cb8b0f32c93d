use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a genogram document.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized document: {0}")]
    UnrecognizedShape(String),
}
