//! `flotilla create` — scaffold a new microservice.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flotilla_core::{FleetConfig, ProjectName};
use flotilla_feature::create_project;

use super::template_source;

/// Arguments for `flotilla create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the microservice to create.
    pub name: String,

    /// Toggle the db feature on right after creation.
    #[arg(long)]
    pub with_db: bool,

    /// Provision from the staging template branch.
    #[arg(long)]
    pub staging: bool,
}

impl CreateArgs {
    pub fn run(self, config: &FleetConfig, archive: Option<PathBuf>) -> Result<()> {
        let name = ProjectName::from(self.name);
        let template = template_source(self.staging, archive);

        create_project(config, &name, &template, self.with_db)
            .with_context(|| format!("failed to create microservice '{name}'"))?;

        println!(
            "{} '{name}' created at {}",
            "✓".green(),
            config.project_path(&name).display()
        );
        Ok(())
    }
}
