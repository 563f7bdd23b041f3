//! ExtHooks runner
//!
//! Loads configuration, launches the browser with the extension bundle,
//! runs every end-to-end scenario and exits non-zero if any failed.

use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, fmt};

use exthooks_core::{AppResult, HarnessConfig};
use exthooks_harness::{ExtensionHarness, Scenario, SuiteReport, run_suite};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match run(config).await {
        Ok(report) if report.passed() => {
            tracing::info!(
                run_id = %report.run_id,
                scenarios = report.outcomes.len(),
                "All scenarios passed"
            );
        }
        Ok(report) => {
            for outcome in report.failed() {
                tracing::error!(scenario = %outcome.scenario, detail = %outcome.detail, "Scenario failed");
            }
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(kind = %e.kind, "Harness error: {}", e.message);
            std::process::exit(1);
        }
    }
}

/// Load configuration from files and environment
fn load_configuration() -> AppResult<HarnessConfig> {
    let config_path = std::env::var("EXTHOOKS_CONFIG").ok().map(PathBuf::from);
    let env = std::env::var("EXTHOOKS_ENV").unwrap_or_else(|_| "development".to_string());

    HarnessConfig::load(config_path.as_deref(), &env)
}

/// Initialize tracing/logging
fn init_logging(config: &HarnessConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Run the full scenario suite once.
async fn run(config: HarnessConfig) -> AppResult<SuiteReport> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bundle = %config.extension.bundle_dir.display(),
        "Starting ExtHooks runner"
    );

    let harness = ExtensionHarness::new(config);
    let report = harness
        .run(|ctx| Box::pin(async move { Ok(run_suite(&ctx, &Scenario::ALL).await) }))
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report)
}
