//! Orchestrated pass-throughs — one npm/npx command per microservice.

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;

use flotilla_core::{FleetConfig, FleetProject};
use flotilla_patch::{escape_pattern, replace_all, PatchError};
use flotilla_run::{
    run_across_fleet, CommandTemplate, FailureMode, FleetRunReport, HookDecision, ProjectStatus,
    RunOptions,
};

type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Fleet-wide maintenance commands.
#[derive(Subcommand, Debug)]
pub enum FleetCommand {
    /// Build every microservice (`npm run build`).
    Build,

    /// Run every microservice's test suite.
    Test {
        /// Collect coverage while testing.
        #[arg(long)]
        coverage: bool,
    },

    /// Lint every microservice.
    Lint {
        /// Rewrite files instead of only checking.
        #[arg(long)]
        fix: bool,
    },

    /// Install dependencies in every microservice.
    Install {
        /// Clean install from the lockfile (`npm ci`).
        #[arg(long)]
        ci: bool,
    },

    /// Update one package across the fleet.
    Update {
        /// Package name to update.
        package: String,
        /// Pin this exact version in each manifest before updating.
        version: Option<String>,
    },

    /// Run semantic release in every microservice.
    Release {
        /// Show what would be released without publishing.
        #[arg(long)]
        dry_run: bool,
    },

    /// Type-check every microservice without emitting output.
    TsCheck,

    /// Run lint-staged in every microservice.
    LintStaged,
}

pub fn run(command: FleetCommand, config: &FleetConfig, fail_fast: bool) -> Result<()> {
    let failure_mode = if fail_fast {
        FailureMode::FailFast
    } else {
        FailureMode::ContinueOnError
    };

    let report = match &command {
        FleetCommand::Build => {
            let template = npm(&["run", "build"]);
            let options = RunOptions {
                failure_mode,
                after: Some(&scaffold_lib_manifest),
                ..RunOptions::default()
            };
            run_fleet(config, &template, &options)?
        }
        FleetCommand::Test { coverage } => {
            let args: &[&str] = if *coverage {
                &["run", "test", "--", "--coverage"]
            } else {
                &["run", "test"]
            };
            run_fleet(config, &npm(args), &with_mode(failure_mode))?
        }
        FleetCommand::Lint { fix } => {
            let script = if *fix { "lint:format" } else { "lint:check" };
            run_fleet(config, &npm(&["run", script]), &with_mode(failure_mode))?
        }
        FleetCommand::Install { ci } => {
            let args: &[&str] = if *ci { &["ci"] } else { &["install"] };
            run_fleet(config, &npm(args), &with_mode(failure_mode))?
        }
        FleetCommand::Update { package, version } => {
            let template = npm(&["update", package]);
            let pin = Pin {
                package: package.clone(),
                version: version.clone(),
            };
            let before =
                move |project: &FleetProject| -> Result<HookDecision, HookError> { pin.apply(project) };
            let options = RunOptions {
                failure_mode,
                before: Some(&before),
                ..RunOptions::default()
            };
            run_fleet(config, &template, &options)?
        }
        FleetCommand::Release { dry_run } => {
            let args: &[&str] = if *dry_run {
                &["semantic-release", "--dry-run"]
            } else {
                &["semantic-release"]
            };
            run_fleet(config, &npx(args), &with_mode(failure_mode))?
        }
        FleetCommand::TsCheck => {
            run_fleet(config, &npx(&["tsc", "--noEmit"]), &with_mode(failure_mode))?
        }
        FleetCommand::LintStaged => {
            run_fleet(config, &npx(&["lint-staged"]), &with_mode(failure_mode))?
        }
    };

    print_report(&report);
    if report.has_failures() {
        bail!("{} microservice(s) failed", report.failed());
    }
    Ok(())
}

fn npm(args: &[&str]) -> CommandTemplate {
    CommandTemplate::new("npm", args)
}

fn npx(args: &[&str]) -> CommandTemplate {
    CommandTemplate::new("npx", args)
}

fn with_mode(failure_mode: FailureMode) -> RunOptions<'static> {
    RunOptions {
        failure_mode,
        ..RunOptions::default()
    }
}

fn run_fleet(
    config: &FleetConfig,
    template: &CommandTemplate,
    options: &RunOptions<'_>,
) -> Result<FleetRunReport> {
    run_across_fleet(config, template, options)
        .with_context(|| format!("fleet run `{}` aborted", template.display()))
}

/// A compiled build exposes its manifest to runtime code through
/// `lib/package.json.js`; generate the shim when the build did not.
fn scaffold_lib_manifest(project: &FleetProject) -> Result<(), HookError> {
    let lib = project.path.join("lib");
    if !lib.is_dir() {
        return Ok(());
    }
    let shim = lib.join("package.json.js");
    if shim.exists() {
        return Ok(());
    }
    fs::write(&shim, "module.exports = require('../package.json');\n")?;
    Ok(())
}

/// Pre-run gate for `update`: skip microservices that do not depend on the
/// package, and optionally pin the requested version in their manifest.
struct Pin {
    package: String,
    version: Option<String>,
}

impl Pin {
    fn apply(&self, project: &FleetProject) -> Result<HookDecision, HookError> {
        let manifest = project.manifest_path();
        let contents = fs::read_to_string(&manifest)?;
        if !contents.contains(&format!("\"{}\"", self.package)) {
            return Ok(HookDecision::Skip(format!(
                "does not depend on {}",
                self.package
            )));
        }

        if let Some(version) = &self.version {
            let pattern = format!(r#""{}": "[^"]*""#, escape_pattern(&self.package));
            let replacement = format!(r#""{}": "{}""#, self.package, version);
            match replace_all(&manifest, &pattern, &replacement) {
                Ok(_) | Err(PatchError::FileNotFound { .. }) => {}
                Err(e) => return Err(Box::new(e)),
            }
        }
        Ok(HookDecision::Run)
    }
}

fn print_report(report: &FleetRunReport) {
    for outcome in &report.outcomes {
        match &outcome.status {
            ProjectStatus::Succeeded => println!("{} {}", "✓".green(), outcome.name),
            ProjectStatus::Failed { code } => match code {
                Some(code) => println!("{} {} (exit {code})", "✗".red(), outcome.name),
                None => println!("{} {} (could not start)", "✗".red(), outcome.name),
            },
            ProjectStatus::Skipped { reason } => {
                println!("{} {}: {reason}", "·".bright_black(), outcome.name)
            }
        }
    }
    println!(
        "{} succeeded | {} failed | {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped(),
    );
}
