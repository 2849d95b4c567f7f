//! Feature descriptors — ids, presence markers, patch sequences.
//!
//! Substitution patterns are anchored so toggles stay idempotent both ways:
//! `remove` cannot comment an already-commented line twice, and `add` cannot
//! substitute into its own output (`default start\b` does not match
//! `default startWithDb`).

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flotilla_patch::PatchOp;

use crate::error::FeatureError;

// ---------------------------------------------------------------------------
// Ids
// ---------------------------------------------------------------------------

/// A toggleable capability of one microservice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureId {
    /// Database support — marker flips and start-config uncommenting.
    Db,
    /// Remote configuration — template files copied into `src/`.
    RemoteConfig,
}

impl FeatureId {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureId::Db => "db",
            FeatureId::RemoteConfig => "remote-config",
        }
    }

    pub fn all() -> &'static [FeatureId] {
        &[FeatureId::Db, FeatureId::RemoteConfig]
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureId {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db" => Ok(FeatureId::Db),
            "remote-config" => Ok(FeatureId::RemoteConfig),
            other => Err(FeatureError::UnknownFeature(other.to_owned())),
        }
    }
}

/// A toggleable capability of the whole monorepo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalFeatureId {
    /// Shared integration-test suite copied next to the fleet root.
    IntegrationTests,
}

impl GlobalFeatureId {
    pub fn as_str(self) -> &'static str {
        match self {
            GlobalFeatureId::IntegrationTests => "integration-tests",
        }
    }
}

impl fmt::Display for GlobalFeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalFeatureId {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "integration-tests" => Ok(GlobalFeatureId::IntegrationTests),
            other => Err(FeatureError::UnknownFeature(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Markers and patch sequences
// ---------------------------------------------------------------------------

/// How feature presence is probed when no state manifest entry exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A literal substring inside a file; a missing file means "absent".
    Substring { file: PathBuf, needle: String },
    /// Existence of a file or directory.
    PathExists(PathBuf),
}

impl Marker {
    pub fn is_present(&self) -> bool {
        match self {
            Marker::Substring { file, needle } => std::fs::read_to_string(file)
                .map(|contents| contents.contains(needle))
                .unwrap_or(false),
            Marker::PathExists(path) => path.exists(),
        }
    }
}

/// The db feature's fallback marker for `project_path`.
pub fn db_marker(project_path: &Path) -> Marker {
    Marker::Substring {
        file: project_path.join("src/constants/index.ts"),
        needle: "withDb: true".to_owned(),
    }
}

/// The remote-config feature's fallback marker for `project_path`.
pub fn remote_config_marker(project_path: &Path) -> Marker {
    Marker::PathExists(project_path.join("src/config/remote.ts"))
}

/// Ordered `add` sequence for the db feature.
pub fn db_add_ops(project_path: &Path) -> Vec<PatchOp> {
    let src = project_path.join("src");
    vec![
        PatchOp::replace(
            src.join("constants/index.ts"),
            "withDb: false",
            "withDb: true",
        ),
        PatchOp::replace(
            src.join("config/start.ts"),
            r"(?m)^(\s*)// dbOptions:",
            "${1}dbOptions:",
        ),
        PatchOp::replace(
            src.join("config/start.ts"),
            r"(?m)^(\s*)// GetDbConfig,",
            "${1}GetDbConfig,",
        ),
        PatchOp::replace(src.join("index.ts"), r"\bstart \}", "startWithDb }"),
        PatchOp::replace(src.join("index.ts"), r"default start\b", "default startWithDb"),
    ]
}

/// Ordered `remove` sequence for the db feature — the exact inverse of
/// [`db_add_ops`], restoring the marker line bit-for-bit.
pub fn db_remove_ops(project_path: &Path) -> Vec<PatchOp> {
    let src = project_path.join("src");
    vec![
        PatchOp::replace(
            src.join("constants/index.ts"),
            "withDb: true",
            "withDb: false",
        ),
        PatchOp::replace(
            src.join("config/start.ts"),
            r"(?m)^(\s*)dbOptions:",
            "${1}// dbOptions:",
        ),
        PatchOp::replace(
            src.join("config/start.ts"),
            r"(?m)^(\s*)GetDbConfig,",
            "${1}// GetDbConfig,",
        ),
        PatchOp::replace(src.join("index.ts"), r"\bstartWithDb \}", "start }"),
        PatchOp::replace(src.join("index.ts"), r"default startWithDb\b", "default start"),
    ]
}

/// Files deleted when the remote-config feature is removed.
pub fn remote_config_files(project_path: &Path) -> Vec<PathBuf> {
    let src = project_path.join("src");
    vec![
        src.join("config/remote.ts"),
        src.join("interfaces/remote-config.ts"),
    ]
}

/// Subtree of the template snapshot holding the remote-config files.
pub const REMOTE_CONFIG_TEMPLATE_DIR: &str = "template/features/remote-config";

/// Subtree of the template snapshot holding the shared integration tests.
pub const INTEGRATION_TESTS_TEMPLATE_DIR: &str = "tests";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
