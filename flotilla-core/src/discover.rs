//! Fleet discovery.
//!
//! Lists candidate project directories under the fleet root, applies the
//! optional name allow-list from [`FleetConfig::only`], and optionally keeps
//! only directories containing a manifest file.
//!
//! Results follow the underlying directory-listing order — callers must not
//! assume lexical order. Every call re-reads the filesystem; nothing is
//! cached.

use crate::config::FleetConfig;
use crate::error::{io_err, CoreError};
use crate::types::{FleetProject, ProjectName};

/// Discover the current fleet.
///
/// Only directory entries are candidates. A non-empty `config.only` keeps
/// just the listed names; `require_manifest` keeps only directories that
/// contain a `package.json`.
pub fn discover(
    config: &FleetConfig,
    require_manifest: bool,
) -> Result<Vec<FleetProject>, CoreError> {
    if !config.fleet_root.is_dir() {
        return Err(CoreError::FleetRootNotFound {
            path: config.fleet_root.clone(),
        });
    }

    let entries =
        std::fs::read_dir(&config.fleet_root).map_err(|e| io_err(&config.fleet_root, e))?;

    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(&config.fleet_root, e))?;
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let name = ProjectName::from(entry.file_name().to_string_lossy().into_owned());
        if !config.only.is_empty() && !config.only.contains(&name) {
            continue;
        }

        let project = FleetProject {
            path: config.fleet_root.join(&name.0),
            name,
        };
        if require_manifest && !project.has_manifest() {
            continue;
        }

        projects.push(project);
    }

    log::debug!(
        "discovered {} project(s) under {}",
        projects.len(),
        config.fleet_root.display()
    );
    Ok(projects)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
