//! Fleet configuration record.
//!
//! Built once from CLI options and passed by reference into every component.
//! Nothing in the library crates reads ambient process state.

use std::path::{Path, PathBuf};

use crate::types::ProjectName;

/// Configuration shared by discovery, patching and provisioning.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Directory holding one subdirectory per microservice.
    pub fleet_root: PathBuf,
    /// Name allow-list; empty means "no filter".
    pub only: Vec<ProjectName>,
    /// Path of the monorepo `.env` file.
    pub env_path: PathBuf,
}

impl FleetConfig {
    pub fn new(fleet_root: impl Into<PathBuf>) -> Self {
        Self {
            fleet_root: fleet_root.into(),
            only: Vec::new(),
            env_path: PathBuf::from(".env"),
        }
    }

    /// Replace the name allow-list (space-separated names, as passed on the
    /// command line or via the `ONLY` environment variable).
    pub fn with_only_list(mut self, names: &str) -> Self {
        self.only = names
            .split_whitespace()
            .map(ProjectName::from)
            .collect();
        self
    }

    pub fn with_env_path(mut self, env_path: impl Into<PathBuf>) -> Self {
        self.env_path = env_path.into();
        self
    }

    /// `fleet_root/<name>` — canonical path of a (possibly absent) project.
    pub fn project_path(&self, name: &ProjectName) -> PathBuf {
        self.fleet_root.join(&name.0)
    }

    /// Directory the monorepo root files live in (parent of the fleet root,
    /// or the fleet root itself when it has no parent component).
    pub fn monorepo_root(&self) -> &Path {
        match self.fleet_root.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => Path::new("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_list_splits_on_whitespace() {
        let cfg = FleetConfig::new("microservices").with_only_list("users  auth billing");
        let names: Vec<&str> = cfg.only.iter().map(|n| n.0.as_str()).collect();
        assert_eq!(names, ["users", "auth", "billing"]);
    }

    #[test]
    fn empty_only_list_stays_empty() {
        let cfg = FleetConfig::new("microservices").with_only_list("");
        assert!(cfg.only.is_empty());
    }

    #[test]
    fn project_path_joins_fleet_root() {
        let cfg = FleetConfig::new("microservices");
        assert_eq!(
            cfg.project_path(&ProjectName::from("users")),
            PathBuf::from("microservices/users")
        );
    }

    #[test]
    fn monorepo_root_of_bare_dir_is_cwd() {
        let cfg = FleetConfig::new("microservices");
        assert_eq!(cfg.monorepo_root(), Path::new("."));

        let nested = FleetConfig::new("work/app/microservices");
        assert_eq!(nested.monorepo_root(), Path::new("work/app"));
    }
}
