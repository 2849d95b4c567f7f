//! Error types for flotilla-provision.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from fetching and provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Transport failure while fetching the archive. Terminal — no retries.
    #[error("network fetch failed for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Corrupt or unreadable archive.
    #[error("failed to extract archive {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An archive entry would escape the extraction root.
    #[error("archive entry '{name}' escapes the extraction root")]
    UnsafeEntry { name: String },

    /// The extracted archive did not contain the expected top-level
    /// `{repository}-{ref}` directory.
    #[error("extracted archive is missing expected subtree {path}")]
    MissingSubtree { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`ProvisionError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ProvisionError {
    ProvisionError::Io {
        path: path.into(),
        source,
    }
}
