//! `flotilla init` — provision a whole new monorepo.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flotilla_feature::init_monorepo;

use super::template_source;

/// Arguments for `flotilla init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to create the monorepo in.
    pub name: String,

    /// Provision from the staging template branch.
    #[arg(long)]
    pub staging: bool,

    /// GitHub `owner/name` slug to stamp into the CI workflow.
    #[arg(long)]
    pub repo: Option<String>,
}

impl InitArgs {
    pub fn run(self, archive: Option<PathBuf>) -> Result<()> {
        let template = template_source(self.staging, archive);
        let root = init_monorepo(&self.name, &template, self.repo.as_deref())
            .with_context(|| format!("failed to initialise monorepo '{}'", self.name))?;

        println!("{} monorepo created at {}", "✓".green(), root.display());
        println!("Next: cd {} && flotilla create <name>", root.display());
        Ok(())
    }
}
