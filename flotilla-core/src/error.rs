//! Error types for flotilla-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from discovery and state operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fleet root directory does not exist or is not readable.
    #[error("fleet root not found at {path}")]
    FleetRootNotFound { path: PathBuf },

    /// YAML serialization error (feature state save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes the offending file path.
    #[error("failed to parse feature state at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience constructor for [`CoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CoreError {
    CoreError::Io {
        path: path.into(),
        source,
    }
}
