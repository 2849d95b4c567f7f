//! Flotilla — microservice fleet provisioning and maintenance CLI.
//!
//! # Usage
//!
//! ```text
//! flotilla init <name> [--staging] [--repo <owner/name>]
//! flotilla create <name> [--with-db] [--staging]
//! flotilla extend <name> --kind docker|package [--staging]
//! flotilla feature <project> <add|remove> --feature db|remote-config [--staging]
//! flotilla global-feature <add|remove> --feature integration-tests [--staging]
//! flotilla update-env <environment>
//! flotilla list
//! flotilla build|test|lint|install|update|release|ts-check|lint-staged [...]
//! ```
//!
//! Global options: `--fleet-root <dir>`, `--only <names>` (or the `ONLY`
//! environment variable), `--env-path <file>`, `--fail-fast`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, extend::ExtendArgs, feature::FeatureArgs, feature::GlobalFeatureArgs,
    fleet::FleetCommand, init::InitArgs, list::ListArgs, update_env::UpdateEnvArgs,
};
use flotilla_core::FleetConfig;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "flotilla",
    version,
    about = "Provision and maintain a fleet of microservices from a shared template",
    long_about = None,
)]
struct Cli {
    /// Directory holding one subdirectory per microservice.
    #[arg(long, global = true, default_value = "microservices")]
    fleet_root: PathBuf,

    /// Space-separated microservice names to restrict commands to.
    #[arg(long, global = true, env = "ONLY")]
    only: Option<String>,

    /// Path of the monorepo env file.
    #[arg(long, global = true, default_value = ".env")]
    env_path: PathBuf,

    /// Stop a fleet run at the first failing project.
    #[arg(long, global = true)]
    fail_fast: bool,

    /// Use a local template archive instead of downloading one.
    #[arg(long, global = true, value_name = "ZIP", hide = true)]
    template_archive: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Provision a whole new monorepo from the template.
    Init(InitArgs),

    /// Create a new microservice from the template's `new` flavor.
    Create(CreateArgs),

    /// Publish a template microservice as a docker or package flavor.
    Extend(ExtendArgs),

    /// Add or remove a feature on one microservice.
    Feature(FeatureArgs),

    /// Add or remove a monorepo-wide feature.
    GlobalFeature(GlobalFeatureArgs),

    /// Rewrite env init variables from the JSON configs.
    UpdateEnv(UpdateEnvArgs),

    /// Show the discovered fleet.
    List(ListArgs),

    #[command(flatten)]
    Fleet(FleetCommand),
}

impl Cli {
    fn fleet_config(&self) -> FleetConfig {
        let mut config =
            FleetConfig::new(&self.fleet_root).with_env_path(&self.env_path);
        if let Some(only) = self.only.as_deref() {
            config = config.with_only_list(only);
        }
        config
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.fleet_config();
    let archive = cli.template_archive.clone();

    match cli.command {
        Commands::Init(args) => args.run(archive),
        Commands::Create(args) => args.run(&config, archive),
        Commands::Extend(args) => args.run(&config, archive),
        Commands::Feature(args) => args.run(&config, archive),
        Commands::GlobalFeature(args) => args.run(&config, archive),
        Commands::UpdateEnv(args) => args.run(&config),
        Commands::List(args) => args.run(&config),
        Commands::Fleet(command) => commands::fleet::run(command, &config, cli.fail_fast),
    }
}
