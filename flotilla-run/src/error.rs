use flotilla_core::{CoreError, ProjectName};

/// Errors that abort a fleet run outright.
///
/// A project command that merely exits non-zero is not an error here; it is
/// recorded in the run report and handled per the configured failure mode.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("hook failed for project '{name}': {source}")]
    Hook {
        name: ProjectName,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
