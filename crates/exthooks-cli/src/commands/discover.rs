//! Extension discovery command.

use serde::Serialize;
use tabled::Tabled;

use exthooks_core::{AppResult, HarnessConfig};
use exthooks_dom::ExtensionCandidate;
use exthooks_harness::{DiscoveryDiagnostics, DiscoveryReport, ExtensionHarness, HarnessError};

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct CandidateRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Selected")]
    selected: String,
}

fn candidate_rows(candidates: &[ExtensionCandidate], selected: Option<usize>) -> Vec<CandidateRow> {
    candidates
        .iter()
        .map(|c| CandidateRow {
            index: c.index,
            id: c.id.clone().unwrap_or_else(|| "-".to_string()),
            name: c.name.clone().unwrap_or_else(|| "-".to_string()),
            selected: if Some(c.index) == selected { "✓" } else { "" }.to_string(),
        })
        .collect()
}

/// Launch the browser and resolve the extension identifier.
pub async fn execute(config: HarnessConfig, format: OutputFormat) -> AppResult<()> {
    let harness = ExtensionHarness::new(config);
    let result = harness
        .run(|ctx| Box::pin(async move { Ok(ctx.discovery().clone()) }))
        .await;

    match result {
        Ok(report) => print_report(&report, format),
        Err(e) => {
            if let Some(diagnostics) = e.diagnostics() {
                print_failure(&e, format, diagnostics);
            }
            return Err(e.into());
        }
    }
    Ok(())
}

fn print_report(report: &DiscoveryReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Table => {
            output::print_success(&format!("Extension loaded as {}", report.id));
            output::print_kv("Entry page", &report.entry_url);
            output::print_kv("Attempt", &report.attempt.to_string());
            let rows = candidate_rows(&report.selection.candidates, Some(report.selection.index));
            output::print_list(&rows, &report.selection.candidates, format);
        }
    }
}

fn print_failure(err: &HarnessError, format: OutputFormat, diagnostics: &DiscoveryDiagnostics) {
    match format {
        OutputFormat::Json => output::print_json(diagnostics),
        OutputFormat::Table => {
            output::print_warning(&format!("Discovery failed: {}", err));
            output::print_kv("Page", diagnostics.page_url.as_deref().unwrap_or("unknown"));
            output::print_kv("Manager present", &diagnostics.manager_present.to_string());
            output::print_kv(
                "Manager shadow root",
                &diagnostics.manager_shadow_root.to_string(),
            );
            if !diagnostics.candidates.is_empty() {
                let rows = candidate_rows(&diagnostics.candidates, None);
                output::print_list(&rows, &diagnostics.candidates, format);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_rows_mark_selection() {
        let candidates = vec![
            ExtensionCandidate {
                index: 0,
                id: Some("first".into()),
                name: None,
            },
            ExtensionCandidate {
                index: 1,
                id: Some("second".into()),
                name: Some("Hooks".into()),
            },
        ];
        let rows = candidate_rows(&candidates, Some(1));
        assert_eq!(rows[0].selected, "");
        assert_eq!(rows[0].name, "-");
        assert_eq!(rows[1].selected, "✓");
        assert_eq!(rows[1].id, "second");
    }
}
