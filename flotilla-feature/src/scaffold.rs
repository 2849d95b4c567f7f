//! Provisioning-backed scaffolding: create a microservice from the template,
//! extend a published one, and initialise a whole new monorepo.
//!
//! Rename patches are applied per file: a missing optional file (for example
//! `package-lock.json`) is skipped with a log line instead of aborting the
//! files that do exist.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flotilla_core::{FleetConfig, ProjectName};
use flotilla_patch::{append_line, escape_pattern, prepend_line, replace_all, PatchError};
use flotilla_provision::{copy_tree, ProvisionError, ScratchCheckout, TemplateSource};

use crate::error::{io_err, FeatureError};
use crate::toggle::{toggle_feature, ToggleAction};
use crate::FeatureId;

/// Placeholder service name used throughout the template's `new` flavor.
const TEMPLATE_PLACEHOLDER: &str = "microservice-name";

/// Subtree of the snapshot holding the fresh-service template.
const NEW_TEMPLATE_DIR: &str = "template/new";

/// Files in a freshly created service that carry the placeholder name.
const CREATE_RENAME_TARGETS: &[&str] = &[
    "package.json",
    "package-lock.json",
    "sonar-project.properties",
    "src/constants/index.ts",
    "README.md",
];

/// Root files moved out of the snapshot when initialising a new monorepo.
/// Pairs of (snapshot path, destination path).
const MONOREPO_ROOT_FILES: &[(&str, &str)] = &[
    (".env", ".env"),
    ("package.json", "package.json"),
    ("package-lock.json", "package-lock.json"),
    ("nyc.config.js", "nyc.config.js"),
    ("docker-compose.yml", "docker-compose.yml"),
    ("docker-compose.ms.yml", "docker-compose.ms.yml"),
    ("commitlint.config.js", "commitlint.config.js"),
    (".prettierrc.js", ".prettierrc.js"),
    (".npmignore", ".npmignore"),
    (".lintstagedrc.js", ".lintstagedrc.js"),
    (".gitignore", ".gitignore"),
    (".gitattributes", ".gitattributes"),
    (".eslintrc.js", ".eslintrc.js"),
    (".eslintignore", ".eslintignore"),
    (".editorconfig", ".editorconfig"),
    (".husky", ".husky"),
    (".github", ".github"),
    ("http-requests", "http-requests"),
    ("configs", "configs"),
    ("template/README.md", "README.md"),
];

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

/// Create a new microservice from the template's `new` flavor.
///
/// The subtree is published with the usual scratch-then-rename protocol, so
/// `fleet_root/<name>` never appears half-populated. With `with_db`, the db
/// feature is toggled on right after creation.
pub fn create_project(
    config: &FleetConfig,
    name: &ProjectName,
    template: &TemplateSource,
    with_db: bool,
) -> Result<(), FeatureError> {
    let project_path = config.project_path(name);
    if project_path.exists() {
        return Err(FeatureError::ProjectExists { name: name.clone() });
    }

    log::info!("creating microservice '{name}'");

    let checkout = ScratchCheckout::obtain(template, &config.fleet_root)?;
    let new_template = checkout.root().join(NEW_TEMPLATE_DIR);
    if !new_template.is_dir() {
        return Err(ProvisionError::MissingSubtree { path: new_template }.into());
    }
    fs::rename(&new_template, &project_path).map_err(|e| io_err(&project_path, e))?;
    drop(checkout);

    rename_placeholder(&project_path, CREATE_RENAME_TARGETS, TEMPLATE_PLACEHOLDER, &name.0)?;

    if with_db {
        toggle_feature(config, name, FeatureId::Db, ToggleAction::Add, template)?;
    }

    log::info!("microservice created: {}", project_path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// extend
// ---------------------------------------------------------------------------

/// Which template flavor an extended microservice is published as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendKind {
    /// Standalone container build of a template microservice.
    Docker,
    /// Thin package wrapper re-exporting a template microservice.
    Package,
}

impl FromStr for ExtendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docker" => Ok(ExtendKind::Docker),
            "package" => Ok(ExtendKind::Package),
            other => Err(format!("unknown kind '{other}'; expected: docker, package")),
        }
    }
}

/// Publish a microservice that already exists in the template snapshot as a
/// local project of the chosen flavor.
pub fn extend_project(
    config: &FleetConfig,
    name: &ProjectName,
    kind: ExtendKind,
    template: &TemplateSource,
) -> Result<(), FeatureError> {
    let project_path = config.project_path(name);
    if project_path.exists() {
        return Err(FeatureError::ProjectExists { name: name.clone() });
    }

    log::info!("extending microservice '{name}' ({kind:?})");

    let checkout = ScratchCheckout::obtain_in_temp(template)?;
    let template_service = checkout.root().join("microservices").join(&name.0);
    if !template_service.is_dir() {
        return Err(FeatureError::UnknownTemplateService { name: name.clone() });
    }

    fs::create_dir_all(&project_path).map_err(|e| io_err(&project_path, e))?;

    match kind {
        ExtendKind::Docker => extend_docker(config, name, &project_path, &checkout)?,
        ExtendKind::Package => extend_package(name, &project_path, &checkout, &template_service)?,
    }

    log::info!("microservice extended: {}", project_path.display());
    Ok(())
}

fn extend_docker(
    config: &FleetConfig,
    name: &ProjectName,
    project_path: &Path,
    checkout: &ScratchCheckout,
) -> Result<(), FeatureError> {
    copy_tree(&checkout.root().join("template/docker"), project_path)?;

    if name.0 == "authorization" {
        // The authorization service ships its default permission set and the
        // compose file must mount it.
        copy_tree(
            &checkout
                .root()
                .join("microservices/authorization/migrations/permissions/list"),
            &project_path.join("permissions"),
        )?;

        let compose = config.monorepo_root().join("docker-compose.ms.yml");
        skip_missing(replace_all(&compose, "#volumes", "volumes").map(|_| ()))?;
        skip_missing(replace_all(&compose, "#  -", "  -").map(|_| ()))?;

        let dockerfile = project_path.join("Dockerfile");
        append_line(
            &dockerfile,
            "COPY ./permissions $WEB_PATH/lib/migrations/permissions/list",
        )?;
        append_line(
            &dockerfile,
            "COPY ./lib/package.json.js $WEB_PATH/lib/package.json.js",
        )?;
    } else {
        rename_placeholder(
            project_path,
            &["Dockerfile", "package.json", "package-lock.json", "README.md"],
            "authorization",
            &name.0,
        )?;
        // Only the authorization service manages permissions; strip its
        // script invocations from the copied manifest.
        let manifest = project_path.join("package.json");
        for script in ["export.js", "import.js", "sync.js"] {
            let invocation = format!("node lib/migrations/permissions/{script}");
            skip_missing(replace_all(&manifest, &escape_pattern(&invocation), "").map(|_| ()))?;
        }
    }
    Ok(())
}

fn extend_package(
    name: &ProjectName,
    project_path: &Path,
    checkout: &ScratchCheckout,
    template_service: &Path,
) -> Result<(), FeatureError> {
    let new_template = checkout.root().join(NEW_TEMPLATE_DIR);

    copy_tree(
        &new_template.join("__helpers__"),
        &project_path.join("__helpers__"),
    )?;
    copy_file(
        &new_template.join("__tests__/index-test.ts"),
        &project_path.join("__tests__/index-test.ts"),
    )?;
    copy_tree(&checkout.root().join("template/package"), project_path)?;
    copy_file(
        &template_service.join("src/index.ts"),
        &project_path.join("src/index.ts"),
    )?;
    copy_file(
        &template_service.join("src/tracer.ts"),
        &project_path.join("src/tracer.ts"),
    )?;

    // Plain top-level files of the `new` flavor (configs, ignores) come along.
    let entries = fs::read_dir(&new_template).map_err(|e| io_err(&new_template, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(&new_template, e))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            copy_file(&entry.path(), &project_path.join(entry.file_name()))?;
        }
    }

    // The wrapper boots through the dependency-injection config.
    prepend_line(&project_path.join("src/index.ts"), "import '@config/di';")?;

    let renamed = format!("microservice-{}", name.0);
    rename_placeholder(
        project_path,
        &["src/constants/index.ts", "src/config/start.ts", "package.json"],
        TEMPLATE_PLACEHOLDER,
        &renamed,
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// init monorepo
// ---------------------------------------------------------------------------

/// Initialise a whole new monorepo at `./<name>` from the template snapshot.
///
/// Moves the root file set out of the snapshot, creates an empty fleet
/// directory, and stamps the app name (and optionally the repository slug in
/// the CI workflow) into the moved files. Returns the monorepo root path.
pub fn init_monorepo(
    name: &str,
    template: &TemplateSource,
    repo_slug: Option<&str>,
) -> Result<PathBuf, FeatureError> {
    let root = PathBuf::from(name);
    if root.exists() {
        return Err(FeatureError::ProjectExists {
            name: ProjectName::from(name),
        });
    }
    let app_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_owned());

    log::info!("initialising monorepo at {}", root.display());

    fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    let checkout = ScratchCheckout::obtain(template, &root)?;

    for (from, to) in MONOREPO_ROOT_FILES {
        let source = checkout.root().join(from);
        if !source.exists() {
            log::warn!("template snapshot is missing {from}; skipped");
            continue;
        }
        let dest = root.join(to);
        fs::rename(&source, &dest).map_err(|e| io_err(&dest, e))?;
    }
    drop(checkout);

    let fleet_dir = root.join("microservices");
    fs::create_dir_all(&fleet_dir).map_err(|e| io_err(&fleet_dir, e))?;

    let name_pattern = r#""name": "[^"]*""#;
    let name_replacement = format!(r#""name": "{app_name}""#);
    skip_missing(replace_all(&root.join("package.json"), name_pattern, &name_replacement).map(|_| ()))?;
    skip_missing(
        replace_all(&root.join("package-lock.json"), name_pattern, &name_replacement).map(|_| ()),
    )?;

    // The CI workflow references the template repository; stamp the new
    // slug over it when both slugs are known.
    if let (Some(slug), TemplateSource::Remote(archive_ref)) = (repo_slug, template) {
        let template_slug = format!("{}/{}", archive_ref.owner, archive_ref.repository);
        let workflow = root.join(".github/workflows/build.yml");
        skip_missing(
            replace_all(&workflow, &escape_pattern(&template_slug), slug).map(|_| ()),
        )?;
    }

    Ok(root)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Replace `placeholder` with `value` in each listed file under `base`.
/// Missing files are skipped, existing ones are patched.
fn rename_placeholder(
    base: &Path,
    files: &[&str],
    placeholder: &str,
    value: &str,
) -> Result<(), FeatureError> {
    let pattern = escape_pattern(placeholder);
    for rel in files {
        let file = base.join(rel);
        skip_missing(replace_all(&file, &pattern, value).map(|_| ()))?;
    }
    Ok(())
}

/// Treat [`PatchError::FileNotFound`] as a logged skip; everything else
/// propagates.
fn skip_missing(result: Result<(), PatchError>) -> Result<(), FeatureError> {
    match result {
        Ok(()) => Ok(()),
        Err(PatchError::FileNotFound { path }) => {
            log::debug!("skip missing patch target {}", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn copy_file(src: &Path, dst: &Path) -> Result<(), FeatureError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| io_err(dst, e))?;
    Ok(())
}
