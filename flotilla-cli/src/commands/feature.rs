//! `flotilla feature` / `flotilla global-feature` — toggle features.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flotilla_core::{FleetConfig, ProjectName};
use flotilla_feature::{
    toggle_feature, toggle_global_feature, FeatureId, GlobalFeatureId, ToggleAction, ToggleOutcome,
};

use super::template_source;

/// Arguments for `flotilla feature`.
#[derive(Args, Debug)]
pub struct FeatureArgs {
    /// Microservice to toggle the feature on.
    pub project: String,

    /// Requested transition: add or remove.
    pub action: ToggleAction,

    /// Feature to toggle: db or remote-config.
    #[arg(long)]
    pub feature: FeatureId,

    /// Provision from the staging template branch.
    #[arg(long)]
    pub staging: bool,
}

impl FeatureArgs {
    pub fn run(self, config: &FleetConfig, archive: Option<PathBuf>) -> Result<()> {
        let name = ProjectName::from(self.project);
        let template = template_source(self.staging, archive);

        let outcome = toggle_feature(config, &name, self.feature, self.action, &template)
            .with_context(|| format!("feature '{}' {} failed for '{name}'", self.feature, self.action))?;

        print_outcome(&format!("'{}' on '{name}'", self.feature), outcome);
        Ok(())
    }
}

/// Arguments for `flotilla global-feature`.
#[derive(Args, Debug)]
pub struct GlobalFeatureArgs {
    /// Requested transition: add or remove.
    pub action: ToggleAction,

    /// Feature to toggle: integration-tests.
    #[arg(long)]
    pub feature: GlobalFeatureId,

    /// Provision from the staging template branch.
    #[arg(long)]
    pub staging: bool,
}

impl GlobalFeatureArgs {
    pub fn run(self, config: &FleetConfig, archive: Option<PathBuf>) -> Result<()> {
        let template = template_source(self.staging, archive);

        let outcome = toggle_global_feature(config, self.feature, self.action, &template)
            .with_context(|| format!("global feature '{}' {} failed", self.feature, self.action))?;

        print_outcome(&format!("'{}'", self.feature), outcome);
        Ok(())
    }
}

fn print_outcome(subject: &str, outcome: ToggleOutcome) {
    match outcome {
        ToggleOutcome::Applied => println!("{} {subject} added", "✓".green()),
        ToggleOutcome::AlreadyPresent => {
            println!("{} {subject} already present, nothing to do", "·".yellow())
        }
        ToggleOutcome::Removed => println!("{} {subject} removed", "✓".green()),
    }
}
