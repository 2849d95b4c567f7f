//! `.env` updates from JSON config files.
//!
//! Each target variable holds a whole JSON document on one line; updates
//! replace the full `KEY=...` line via `replace_all`, never splicing into an
//! existing value.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PatchError;
use crate::ops::replace_all;

/// Return the first existing candidate file under `folder`, if any.
///
/// Candidates are tried in order, most specific first (for example
/// `middlewares.dev.json` before `middlewares.json`).
pub fn find_file(candidates: &[String], folder: &Path) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| folder.join(name))
        .find(|path| path.exists())
}

/// Update the env file at `env_path` from the JSON configs in `configs_dir`
/// for the named `environment`.
///
/// Looks up, in order of preference:
/// - `middlewares.{env}.json`, `middlewares.json` (required)
/// - `config.{env}.json`, `config.local.json`, `config.json` (required)
/// - `cron.{env}.json`, `cron.json` (optional; defaults to `[]`)
///
/// Each document is minified and written wholesale over the matching
/// `MS_INIT_MIDDLEWARES=`, `MS_INIT_CONFIGS=` and `MS_INIT_TASKS=` lines.
pub fn update_env(
    configs_dir: &Path,
    env_path: &Path,
    environment: &str,
) -> Result<(), PatchError> {
    let middlewares_file = find_file(
        &[
            format!("middlewares.{environment}.json"),
            "middlewares.json".to_owned(),
        ],
        configs_dir,
    )
    .ok_or(PatchError::ConfigNotFound {
        name: "middlewares",
        folder: configs_dir.to_path_buf(),
    })?;

    let config_file = find_file(
        &[
            format!("config.{environment}.json"),
            "config.local.json".to_owned(),
            "config.json".to_owned(),
        ],
        configs_dir,
    )
    .ok_or(PatchError::ConfigNotFound {
        name: "config",
        folder: configs_dir.to_path_buf(),
    })?;

    let cron_file = find_file(
        &[format!("cron.{environment}.json"), "cron.json".to_owned()],
        configs_dir,
    );

    let middlewares = minify_json(&middlewares_file)?;
    let configs = minify_json(&config_file)?;
    let cron_tasks = match cron_file {
        Some(path) => minify_json(&path)?,
        None => "[]".to_owned(),
    };

    replace_all(
        env_path,
        "MS_INIT_MIDDLEWARES=.*",
        &literal(&format!("MS_INIT_MIDDLEWARES='{middlewares}'")),
    )?;
    replace_all(
        env_path,
        "MS_INIT_CONFIGS=.*",
        &literal(&format!("MS_INIT_CONFIGS='{configs}'")),
    )?;
    replace_all(
        env_path,
        "MS_INIT_TASKS=.*",
        &literal(&format!("MS_INIT_TASKS='{cron_tasks}'")),
    )?;

    log::info!("updated {} for environment '{environment}'", env_path.display());
    Ok(())
}

/// Escape `$` so the replacement is taken literally, never as a capture
/// group reference.
fn literal(replacement: &str) -> String {
    replacement.replace('$', "$$")
}

/// Parse and re-serialize a JSON file without whitespace.
fn minify_json(path: &Path) -> Result<String, PatchError> {
    let contents = fs::read_to_string(path).map_err(|e| crate::error::io_err(path, e))?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| PatchError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
    serde_json::to_string(&value).map_err(|e| PatchError::Json {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
