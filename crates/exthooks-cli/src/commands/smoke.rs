//! End-to-end scenario command.

use clap::Args;
use tabled::Tabled;

use exthooks_core::{AppResult, HarnessConfig};
use exthooks_core::error::AppError;
use exthooks_harness::{ExtensionHarness, Scenario, ScenarioOutcome, run_suite};

use crate::output::{self, OutputFormat};

/// Arguments for the smoke command
#[derive(Debug, Args)]
pub struct SmokeArgs {
    /// Run only these scenarios (repeatable); all of them when omitted
    #[arg(long, value_parser = parse_scenario)]
    pub only: Vec<Scenario>,
}

fn parse_scenario(value: &str) -> Result<Scenario, String> {
    value.parse()
}

#[derive(Debug, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "Scenario")]
    scenario: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Duration (ms)")]
    duration_ms: u64,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ScenarioOutcome> for OutcomeRow {
    fn from(outcome: &ScenarioOutcome) -> Self {
        Self {
            scenario: outcome.scenario.to_string(),
            result: if outcome.passed { "pass" } else { "FAIL" }.to_string(),
            duration_ms: outcome.duration_ms,
            detail: outcome.detail.clone(),
        }
    }
}

/// Run the selected scenarios and fail if any of them failed.
pub async fn execute(
    args: &SmokeArgs,
    config: HarnessConfig,
    format: OutputFormat,
) -> AppResult<()> {
    let scenarios = if args.only.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        args.only.clone()
    };

    let harness = ExtensionHarness::new(config);
    let report = harness
        .run(|ctx| Box::pin(async move { Ok(run_suite(&ctx, &scenarios).await) }))
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            let rows: Vec<OutcomeRow> = report.outcomes.iter().map(OutcomeRow::from).collect();
            output::print_list(&rows, &report.outcomes, format);
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        return Err(AppError::assertion(format!(
            "{} of {} scenarios failed",
            failed,
            report.outcomes.len()
        )));
    }
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "All {} scenarios passed for {}",
            report.outcomes.len(),
            report.extension_id
        ));
    }
    Ok(())
}
