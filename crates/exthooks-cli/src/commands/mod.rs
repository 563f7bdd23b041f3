//! CLI command definitions and dispatch.

pub mod config;
pub mod discover;
pub mod probe;
pub mod smoke;
pub mod verify;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use exthooks_core::{AppResult, HarnessConfig};

/// ExtHooks: end-to-end harness for a browser extension's hook surface
#[derive(Debug, Parser)]
#[command(name = "exthooks", version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file layered over config/default.toml
    #[arg(short, long, env = "EXTHOOKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Environment profile (loads config/<env>.toml when present)
    #[arg(short, long, env = "EXTHOOKS_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Override the extension bundle directory
    #[arg(short, long)]
    pub bundle: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check the built bundle without launching a browser
    Verify,
    /// Launch the browser and resolve the extension identifier
    Discover,
    /// Open the extension page and wait for its hooks
    Probe,
    /// Run the end-to-end scenarios
    Smoke(smoke::SmokeArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        match &self.command {
            Commands::Verify => verify::execute(self.load_config()?, self.format).await,
            Commands::Discover => discover::execute(self.load_config()?, self.format).await,
            Commands::Probe => probe::execute(self.load_config()?, self.format).await,
            Commands::Smoke(args) => smoke::execute(args, self.load_config()?, self.format).await,
            Commands::Config(args) => config::execute(args, self, self.format).await,
        }
    }

    /// Load layered configuration and apply command-line overrides.
    pub fn load_config(&self) -> AppResult<HarnessConfig> {
        let mut config = HarnessConfig::load(self.config.as_deref(), &self.env)?;
        if let Some(bundle) = &self.bundle {
            config.extension.bundle_dir = bundle.clone();
        }
        if self.headless {
            config.browser.headless = true;
        }
        config.validate_all()?;
        Ok(config)
    }
}
