//! Per-project applied-feature manifest.
//!
//! # Storage layout
//!
//! ```text
//! <fleet_root>/<project>/
//!   .flotilla/
//!     features.yaml     (applied feature ids + timestamps)
//! ```
//!
//! The manifest is the authoritative `Present/Absent` record for feature
//! toggles. Marker probing of source files is kept only as a fallback for
//! projects created before the manifest existed.
//!
//! Writes use the `.tmp` sibling + rename pattern so the manifest is never
//! observed half-written.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, CoreError};

/// One applied feature entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFeature {
    pub id: String,
    pub applied_at: DateTime<Utc>,
}

/// On-disk manifest payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeatureState {
    #[serde(default)]
    pub features: Vec<AppliedFeature>,
}

impl FeatureState {
    pub fn contains(&self, id: &str) -> bool {
        self.features.iter().any(|f| f.id == id)
    }
}

/// `<project>/.flotilla/features.yaml` — pure, no I/O.
pub fn state_path(project_path: &Path) -> PathBuf {
    project_path.join(".flotilla").join("features.yaml")
}

/// Load the feature state for a project.
///
/// Returns an empty state if the manifest does not yet exist.
pub fn load(project_path: &Path) -> Result<FeatureState, CoreError> {
    let path = state_path(project_path);
    if !path.exists() {
        return Ok(FeatureState::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// Save the feature state atomically (`.tmp` sibling + rename).
pub fn save(project_path: &Path, state: &FeatureState) -> Result<(), CoreError> {
    let path = state_path(project_path);
    let dir = path.parent().unwrap_or(project_path);
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let yaml = serde_yaml::to_string(state)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Record a feature as applied. Idempotent: re-recording is a no-op.
pub fn record_applied(project_path: &Path, id: &str) -> Result<(), CoreError> {
    let mut state = load(project_path)?;
    if state.contains(id) {
        return Ok(());
    }
    state.features.push(AppliedFeature {
        id: id.to_owned(),
        applied_at: Utc::now(),
    });
    save(project_path, &state)
}

/// Drop a feature from the manifest. Idempotent: dropping an absent id is a
/// no-op and does not create the manifest.
pub fn clear_applied(project_path: &Path, id: &str) -> Result<(), CoreError> {
    if !state_path(project_path).exists() {
        return Ok(());
    }
    let mut state = load(project_path)?;
    let before = state.features.len();
    state.features.retain(|f| f.id != id);
    if state.features.len() == before {
        return Ok(());
    }
    save(project_path, &state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
