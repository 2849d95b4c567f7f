//! Domain types for the Flotilla fleet.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Manifest file that marks a directory as a real microservice.
pub const MANIFEST_FILE: &str = "package.json";

/// Default GitHub owner of the template repository.
pub const DEFAULT_TEMPLATE_OWNER: &str = "flotilla-dev";

/// Default template repository name.
pub const DEFAULT_TEMPLATE_REPO: &str = "microservices";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a microservice in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectName(pub String);

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Template snapshot selection
// ---------------------------------------------------------------------------

/// Which template snapshot to provision from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Prod,
    Staging,
}

impl Stage {
    /// Branch name of the snapshot on the template repository.
    pub fn branch(self) -> &'static str {
        match self {
            Stage::Prod => "prod",
            Stage::Staging => "staging",
        }
    }

    pub fn from_staging_flag(staging: bool) -> Self {
        if staging {
            Stage::Staging
        } else {
            Stage::Prod
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.branch())
    }
}

/// Identifies a remote template snapshot: one branch of one repository.
///
/// Immutable; constructed per invocation from the `--staging` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRef {
    pub owner: String,
    pub repository: String,
    pub reference: String,
}

impl ArchiveRef {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            reference: reference.into(),
        }
    }

    /// The default template repository at the given stage.
    pub fn template(stage: Stage) -> Self {
        Self::new(DEFAULT_TEMPLATE_OWNER, DEFAULT_TEMPLATE_REPO, stage.branch())
    }

    /// Codeload URL serving this snapshot as a zip archive.
    pub fn archive_url(&self) -> String {
        format!(
            "https://codeload.github.com/{}/{}/zip/refs/heads/{}",
            self.owner, self.repository, self.reference
        )
    }

    /// Name of the top-level directory inside the extracted archive.
    pub fn archive_root_dir(&self) -> String {
        format!("{}-{}", self.repository, self.reference)
    }
}

// ---------------------------------------------------------------------------
// Fleet projects
// ---------------------------------------------------------------------------

/// One discovered microservice directory. Derived from the filesystem on
/// every discovery pass; never persisted.
///
/// Invariant: `path == fleet_root.join(&name.0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetProject {
    pub name: ProjectName,
    pub path: PathBuf,
}

impl FleetProject {
    /// Path of the project's manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path().exists()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
