//! `flotilla update-env` — rewrite env init variables from JSON configs.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flotilla_core::FleetConfig;
use flotilla_patch::env::update_env;

/// Arguments for `flotilla update-env`.
#[derive(Args, Debug)]
pub struct UpdateEnvArgs {
    /// Environment whose config files take precedence (for example `dev`).
    pub environment: String,
}

impl UpdateEnvArgs {
    pub fn run(self, config: &FleetConfig) -> Result<()> {
        let configs_dir = config.monorepo_root().join("configs");

        update_env(&configs_dir, &config.env_path, &self.environment).with_context(|| {
            format!(
                "failed to update {} for environment '{}'",
                config.env_path.display(),
                self.environment
            )
        })?;

        println!(
            "{} {} updated for '{}'",
            "✓".green(),
            config.env_path.display(),
            self.environment
        );
        Ok(())
    }
}
