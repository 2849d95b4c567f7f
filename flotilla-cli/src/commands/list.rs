//! `flotilla list` — fleet discovery visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use flotilla_core::{discover, state, FleetConfig};

/// Arguments for `flotilla list`.
#[derive(Args, Debug)]
pub struct ListArgs {}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "manifest")]
    manifest: &'static str,
    #[tabled(rename = "features")]
    features: String,
    #[tabled(rename = "path")]
    path: String,
}

impl ListArgs {
    pub fn run(self, config: &FleetConfig) -> Result<()> {
        let projects = discover(config, false).with_context(|| {
            format!("failed to discover fleet at {}", config.fleet_root.display())
        })?;

        if projects.is_empty() {
            println!(
                "No microservices found under {}.",
                config.fleet_root.display()
            );
            return Ok(());
        }

        let with_manifest = projects.iter().filter(|p| p.has_manifest()).count();
        println!(
            "{} | {} microservices | {} with manifest",
            "Flotilla".bold(),
            projects.len(),
            with_manifest,
        );

        let mut rows = Vec::new();
        for project in &projects {
            let features = state::load(&project.path)
                .with_context(|| format!("failed to read feature state for '{}'", project.name))?
                .features
                .iter()
                .map(|f| f.id.clone())
                .collect::<Vec<_>>()
                .join(", ");
            rows.push(ProjectRow {
                name: project.name.to_string(),
                manifest: if project.has_manifest() { "yes" } else { "no" },
                features,
                path: project.path.display().to_string(),
            });
        }

        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
