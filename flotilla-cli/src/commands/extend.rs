//! `flotilla extend` — publish a template microservice locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flotilla_core::{FleetConfig, ProjectName};
use flotilla_feature::{extend_project, ExtendKind};

use super::template_source;

/// Arguments for `flotilla extend`.
#[derive(Args, Debug)]
pub struct ExtendArgs {
    /// Name of the template microservice to publish.
    pub name: String,

    /// Flavor to publish: docker or package.
    #[arg(long)]
    pub kind: ExtendKind,

    /// Provision from the staging template branch.
    #[arg(long)]
    pub staging: bool,
}

impl ExtendArgs {
    pub fn run(self, config: &FleetConfig, archive: Option<PathBuf>) -> Result<()> {
        let name = ProjectName::from(self.name);
        let template = template_source(self.staging, archive);

        extend_project(config, &name, self.kind, &template)
            .with_context(|| format!("failed to extend microservice '{name}'"))?;

        println!(
            "{} '{name}' published at {}",
            "✓".green(),
            config.project_path(&name).display()
        );
        Ok(())
    }
}
