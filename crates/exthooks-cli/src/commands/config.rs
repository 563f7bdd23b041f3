//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use exthooks_core::{AppResult, HarnessConfig};
use exthooks_core::error::AppError;

use super::Cli;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let config = cli.load_config()?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => print!("{}", render_toml(&config)?),
            }
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success("Configuration is valid");
                output::print_kv("Bundle", &config.extension.bundle_dir.display().to_string());
                output::print_kv("Profile", &config.browser.profile_dir.display().to_string());
                output::print_kv(
                    "Browser",
                    &config
                        .browser
                        .executable
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "auto-detect".to_string()),
                );
                output::print_kv("Headless", &config.browser.headless.to_string());
                output::print_kv(
                    "Discovery",
                    &format!(
                        "{} attempts, {}ms apart",
                        config.discovery.max_attempts, config.discovery.retry_delay_ms
                    ),
                );
                output::print_kv(
                    "Readiness timeout",
                    &format!("{}ms per step", config.readiness.step_timeout_ms),
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

fn render_toml(config: &HarnessConfig) -> AppResult<String> {
    toml::to_string_pretty(config)
        .map_err(|e| AppError::internal(format!("Failed to render config: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_default_config_matches_builtin_defaults() {
        let shipped: HarnessConfig =
            toml::from_str(include_str!("../../../../config/default.toml")).expect("parse");
        let builtin = HarnessConfig::default();
        assert_eq!(shipped.browser.settle_delay_ms, builtin.browser.settle_delay_ms);
        assert_eq!(shipped.discovery.max_attempts, builtin.discovery.max_attempts);
        assert_eq!(shipped.readiness.global_name, builtin.readiness.global_name);
        assert_eq!(shipped.extension.required_files, builtin.extension.required_files);
        assert!(shipped.validate_all().is_ok());
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let rendered = render_toml(&HarnessConfig::default()).expect("render");
        let parsed: HarnessConfig = toml::from_str(&rendered).expect("parse");
        assert_eq!(parsed.scenarios.storage_value, serde_json::json!({ "count": 42 }));
    }
}
