//! Error types for flotilla-patch.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from patch operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The patch target does not exist. Terminal for the operation; sibling
    /// operations on other files are unaffected.
    #[error("patch target not found: {path}")]
    FileNotFound { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A substitution pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A required JSON config could not be located.
    #[error("{name} config not found in {folder}")]
    ConfigNotFound { name: &'static str, folder: PathBuf },

    /// A JSON config failed to parse.
    #[error("failed to parse JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience constructor for [`PatchError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PatchError {
    PatchError::Io {
        path: path.into(),
        source,
    }
}
