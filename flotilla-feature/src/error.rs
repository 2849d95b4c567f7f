//! Error types for flotilla-feature.

use std::path::PathBuf;

use thiserror::Error;

use flotilla_core::{CoreError, ProjectName};
use flotilla_patch::PatchError;
use flotilla_provision::ProvisionError;

/// All errors that can arise from toggles and scaffolding.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The named feature is not known. No side effects were performed.
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    /// The target microservice does not exist on disk. Checked before any
    /// file is touched.
    #[error("microservice '{name}' does not exist")]
    ProjectNotFound { name: ProjectName },

    /// The target microservice already exists (create / extend / init).
    #[error("microservice '{name}' already exists")]
    ProjectExists { name: ProjectName },

    /// The template snapshot has no microservice of this name to extend from.
    #[error("unknown microservice '{name}' in the template snapshot")]
    UnknownTemplateService { name: ProjectName },

    /// A provisioning failure (network, extraction, publish).
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// A patch primitive failure.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A feature-state manifest failure.
    #[error(transparent)]
    State(#[from] CoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`FeatureError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FeatureError {
    FeatureError::Io {
        path: path.into(),
        source,
    }
}
