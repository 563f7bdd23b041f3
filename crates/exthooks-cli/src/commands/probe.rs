//! Readiness probe command.

use serde::Serialize;
use tabled::Tabled;

use exthooks_core::{AppResult, HarnessConfig};
use exthooks_harness::readiness::StepTiming;
use exthooks_harness::{BackgroundAck, ExtensionHarness, ExtensionId, HooksStatus};

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct ProbeReport {
    extension_id: ExtensionId,
    url: String,
    steps: Vec<StepTiming>,
    status: HooksStatus,
    background: BackgroundAck,
}

#[derive(Debug, Tabled)]
struct StepRow {
    #[tabled(rename = "Step")]
    step: String,
    #[tabled(rename = "Elapsed (ms)")]
    elapsed_ms: u64,
    #[tabled(rename = "Polls")]
    polls: u32,
}

/// Open the extension page, wait for its hooks, ping the background worker
/// and report how long each readiness step took.
pub async fn execute(config: HarnessConfig, format: OutputFormat) -> AppResult<()> {
    let harness = ExtensionHarness::new(config);
    let report = harness
        .run(|ctx| {
            Box::pin(async move {
                let page = ctx.open_ready_page().await?;
                let report = page
                    .hooks()
                    .ping_background()
                    .await
                    .map(|background| ProbeReport {
                        extension_id: ctx.extension_id().clone(),
                        url: page.url().to_string(),
                        steps: page.steps().to_vec(),
                        status: page.status().clone(),
                        background,
                    });
                page.close_with(report).await
            })
        })
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            output::print_success(&format!("Hooks ready on {}", report.url));
            let rows: Vec<StepRow> = report
                .steps
                .iter()
                .map(|s| StepRow {
                    step: s.step.to_string(),
                    elapsed_ms: s.elapsed_ms,
                    polls: s.polls,
                })
                .collect();
            output::print_list(&rows, &report.steps, format);
            output::print_kv("Storage hooks", &yes_no(report.status.has_storage));
            output::print_kv("Tabs hooks", &yes_no(report.status.has_tabs));
            output::print_kv("Background worker", &yes_no(report.background.initialized));
        }
    }
    Ok(())
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
