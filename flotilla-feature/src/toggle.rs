//! Feature toggle state machines.
//!
//! Two states per `(project, feature)` pair: `Present` / `Absent`. Presence
//! is answered by the per-project state manifest first, with marker probing
//! as a fallback for projects created before the manifest existed.
//!
//! `remove` performs no existence check: removing an absent feature relies on
//! "pattern not found is not an error" and on file deletions of absent files
//! being no-ops, so it is always an idempotent success.
//!
//! Patch application is not transactional — a sequence that fails midway
//! leaves earlier effects in place. Scratch checkouts are removed on every
//! path.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use flotilla_core::{state, FleetConfig, ProjectName};
use flotilla_provision::{copy_tree, ScratchCheckout, TemplateSource};

use crate::descriptor::{
    db_add_ops, db_marker, db_remove_ops, remote_config_files, remote_config_marker, FeatureId,
    GlobalFeatureId, INTEGRATION_TESTS_TEMPLATE_DIR, REMOTE_CONFIG_TEMPLATE_DIR,
};
use crate::error::{io_err, FeatureError};

// ---------------------------------------------------------------------------
// Actions and outcomes
// ---------------------------------------------------------------------------

/// Requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Add,
    Remove,
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleAction::Add => f.write_str("add"),
            ToggleAction::Remove => f.write_str("remove"),
        }
    }
}

impl FromStr for ToggleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(ToggleAction::Add),
            "remove" => Ok(ToggleAction::Remove),
            other => Err(format!("unknown action '{other}'; expected: add, remove")),
        }
    }
}

/// Result of a toggle. `AlreadyPresent` is informational, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Applied,
    AlreadyPresent,
    Removed,
}

// ---------------------------------------------------------------------------
// Per-project toggles
// ---------------------------------------------------------------------------

/// Toggle `feature` on the named microservice.
///
/// The project must exist on disk; this is checked before any file is
/// touched. `template` is consulted only by features that need remote
/// content.
pub fn toggle_feature(
    config: &FleetConfig,
    name: &ProjectName,
    feature: FeatureId,
    action: ToggleAction,
    template: &TemplateSource,
) -> Result<ToggleOutcome, FeatureError> {
    let project_path = config.project_path(name);
    if !project_path.is_dir() {
        return Err(FeatureError::ProjectNotFound { name: name.clone() });
    }

    log::info!("feature '{feature}' {action} for '{name}'");

    let outcome = match (feature, action) {
        (FeatureId::Db, ToggleAction::Add) => {
            if is_present(&project_path, feature)? {
                ToggleOutcome::AlreadyPresent
            } else {
                flotilla_patch::apply(&db_add_ops(&project_path))?;
                state::record_applied(&project_path, feature.as_str())?;
                ToggleOutcome::Applied
            }
        }
        (FeatureId::Db, ToggleAction::Remove) => {
            flotilla_patch::apply(&db_remove_ops(&project_path))?;
            state::clear_applied(&project_path, feature.as_str())?;
            ToggleOutcome::Removed
        }
        (FeatureId::RemoteConfig, ToggleAction::Add) => {
            if is_present(&project_path, feature)? {
                ToggleOutcome::AlreadyPresent
            } else {
                // Checkout is dropped on every path below, success or not.
                let checkout = ScratchCheckout::obtain_in_temp(template)?;
                copy_tree(
                    &checkout.root().join(REMOTE_CONFIG_TEMPLATE_DIR),
                    &project_path.join("src"),
                )?;
                state::record_applied(&project_path, feature.as_str())?;
                ToggleOutcome::Applied
            }
        }
        (FeatureId::RemoteConfig, ToggleAction::Remove) => {
            for file in remote_config_files(&project_path) {
                remove_file_if_exists(&file)?;
            }
            state::clear_applied(&project_path, feature.as_str())?;
            ToggleOutcome::Removed
        }
    };

    Ok(outcome)
}

/// `Present/Absent` query: state manifest first, marker probe as fallback.
fn is_present(project_path: &Path, feature: FeatureId) -> Result<bool, FeatureError> {
    if state::load(project_path)?.contains(feature.as_str()) {
        return Ok(true);
    }
    let marker = match feature {
        FeatureId::Db => db_marker(project_path),
        FeatureId::RemoteConfig => remote_config_marker(project_path),
    };
    Ok(marker.is_present())
}

// ---------------------------------------------------------------------------
// Global toggles
// ---------------------------------------------------------------------------

/// Toggle a monorepo-wide feature.
pub fn toggle_global_feature(
    config: &FleetConfig,
    feature: GlobalFeatureId,
    action: ToggleAction,
    template: &TemplateSource,
) -> Result<ToggleOutcome, FeatureError> {
    let root = config.monorepo_root();
    log::info!("global feature '{feature}' {action}");

    match feature {
        GlobalFeatureId::IntegrationTests => {
            let dest = root.join(INTEGRATION_TESTS_TEMPLATE_DIR);
            match action {
                ToggleAction::Add => {
                    if dest.exists() {
                        return Ok(ToggleOutcome::AlreadyPresent);
                    }
                    let checkout = ScratchCheckout::obtain_in_temp(template)?;
                    copy_tree(
                        &checkout.root().join(INTEGRATION_TESTS_TEMPLATE_DIR),
                        &dest,
                    )?;
                    Ok(ToggleOutcome::Applied)
                }
                ToggleAction::Remove => {
                    if dest.exists() {
                        fs::remove_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
                    }
                    Ok(ToggleOutcome::Removed)
                }
            }
        }
    }
}

fn remove_file_if_exists(path: &Path) -> Result<(), FeatureError> {
    if path.exists() {
        fs::remove_file(path).map_err(|e| io_err(path, e))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    const CONSTANTS: &str = "const constants = {\n  msNameDefault: 'users',\n  withDb: false,\n};\n";
    const START: &str = "export default {\n  // dbOptions: {},\n  // GetDbConfig,\n};\n";
    const INDEX: &str = "import { start } from './config/start';\nexport default start;\n";

    /// A fleet with one project shaped like the template's `new` service.
    fn fixture_fleet() -> (TempDir, FleetConfig, ProjectName) {
        let root = TempDir::new().unwrap();
        let fleet_root = root.path().join("microservices");
        let name = ProjectName::from("users");
        let src = fleet_root.join("users/src");
        fs::create_dir_all(src.join("constants")).unwrap();
        fs::create_dir_all(src.join("config")).unwrap();
        fs::write(src.join("constants/index.ts"), CONSTANTS).unwrap();
        fs::write(src.join("config/start.ts"), START).unwrap();
        fs::write(src.join("index.ts"), INDEX).unwrap();
        fs::write(fleet_root.join("users/package.json"), "{}").unwrap();

        let cfg = FleetConfig::new(&fleet_root);
        (root, cfg, name)
    }

    fn unused_template() -> TemplateSource {
        TemplateSource::LocalArchive {
            path: PathBuf::from("/nonexistent.zip"),
            root_dir: "unused".to_owned(),
        }
    }

    fn read(cfg: &FleetConfig, name: &ProjectName, rel: &str) -> String {
        fs::read_to_string(cfg.project_path(name).join(rel)).unwrap()
    }

    #[test]
    fn db_add_flips_all_markers() {
        let (_root, cfg, name) = fixture_fleet();
        let outcome =
            toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Add, &unused_template())
                .unwrap();
        assert_eq!(outcome, ToggleOutcome::Applied);

        assert!(read(&cfg, &name, "src/constants/index.ts").contains("withDb: true"));
        let start = read(&cfg, &name, "src/config/start.ts");
        assert!(start.contains("  dbOptions: {},"));
        assert!(start.contains("  GetDbConfig,"));
        let index = read(&cfg, &name, "src/index.ts");
        assert!(index.contains("{ startWithDb }"));
        assert!(index.contains("default startWithDb;"));
    }

    #[test]
    fn db_add_then_remove_restores_files_bit_for_bit() {
        let (_root, cfg, name) = fixture_fleet();
        toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Add, &unused_template()).unwrap();
        let outcome =
            toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Remove, &unused_template())
                .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);

        assert_eq!(read(&cfg, &name, "src/constants/index.ts"), CONSTANTS);
        assert_eq!(read(&cfg, &name, "src/config/start.ts"), START);
        assert_eq!(read(&cfg, &name, "src/index.ts"), INDEX);
    }

    #[test]
    fn db_second_add_reports_already_present_without_mutation() {
        let (_root, cfg, name) = fixture_fleet();
        toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Add, &unused_template()).unwrap();
        let index_after_first = read(&cfg, &name, "src/index.ts");

        let outcome =
            toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Add, &unused_template())
                .unwrap();
        assert_eq!(outcome, ToggleOutcome::AlreadyPresent);
        assert_eq!(read(&cfg, &name, "src/index.ts"), index_after_first);
    }

    #[test]
    fn db_remove_when_absent_is_idempotent_success() {
        let (_root, cfg, name) = fixture_fleet();
        let before = read(&cfg, &name, "src/config/start.ts");
        let outcome =
            toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Remove, &unused_template())
                .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert_eq!(
            read(&cfg, &name, "src/config/start.ts"),
            before,
            "removing an absent feature must not double-comment"
        );
    }

    #[test]
    fn marker_fallback_detects_pre_manifest_projects() {
        let (_root, cfg, name) = fixture_fleet();
        // Simulate a project where db was enabled before state manifests
        // existed: marker present, no manifest.
        let constants = cfg.project_path(&name).join("src/constants/index.ts");
        fs::write(&constants, CONSTANTS.replace("withDb: false", "withDb: true")).unwrap();

        let outcome =
            toggle_feature(&cfg, &name, FeatureId::Db, ToggleAction::Add, &unused_template())
                .unwrap();
        assert_eq!(outcome, ToggleOutcome::AlreadyPresent);
    }

    #[test]
    fn unknown_project_fails_before_any_file_touch() {
        let (_root, cfg, _name) = fixture_fleet();
        let err = toggle_feature(
            &cfg,
            &ProjectName::from("ghost"),
            FeatureId::Db,
            ToggleAction::Add,
            &unused_template(),
        )
        .unwrap_err();
        assert!(matches!(err, FeatureError::ProjectNotFound { .. }));
    }

    #[test]
    fn remote_config_remove_deletes_files_and_tolerates_absence() {
        let (_root, cfg, name) = fixture_fleet();
        let src = cfg.project_path(&name).join("src");
        fs::write(src.join("config/remote.ts"), "export {};\n").unwrap();

        let outcome = toggle_feature(
            &cfg,
            &name,
            FeatureId::RemoteConfig,
            ToggleAction::Remove,
            &unused_template(),
        )
        .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
        assert!(!src.join("config/remote.ts").exists());

        // Second remove: nothing left to delete, still a success.
        let outcome = toggle_feature(
            &cfg,
            &name,
            FeatureId::RemoteConfig,
            ToggleAction::Remove,
            &unused_template(),
        )
        .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
    }

    #[test]
    fn global_remove_when_absent_is_success() {
        let (_root, cfg, _name) = fixture_fleet();
        let outcome = toggle_global_feature(
            &cfg,
            GlobalFeatureId::IntegrationTests,
            ToggleAction::Remove,
            &unused_template(),
        )
        .unwrap();
        assert_eq!(outcome, ToggleOutcome::Removed);
    }

    #[test]
    fn global_add_reports_already_present_when_dest_exists() {
        let (root, cfg, _name) = fixture_fleet();
        fs::create_dir_all(root.path().join("tests")).unwrap();
        let outcome = toggle_global_feature(
            &cfg,
            GlobalFeatureId::IntegrationTests,
            ToggleAction::Add,
            &unused_template(),
        )
        .unwrap();
        assert_eq!(outcome, ToggleOutcome::AlreadyPresent);
    }
}
