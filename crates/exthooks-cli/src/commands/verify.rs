//! Bundle verification command.

use exthooks_core::{AppResult, HarnessConfig};
use exthooks_harness::bundle::verify_bundle;

use crate::output::{self, OutputFormat};

/// Check the bundle directory and manifest.
pub async fn execute(config: HarnessConfig, format: OutputFormat) -> AppResult<()> {
    let bundle =
        verify_bundle(&config.extension.bundle_dir, &config.extension.required_files).await?;

    match format {
        OutputFormat::Json => output::print_json(&bundle),
        OutputFormat::Table => {
            output::print_success(&format!("Bundle at '{}' is complete", bundle.dir.display()));
            output::print_kv("Name", &bundle.manifest.name);
            output::print_kv("Version", &bundle.manifest.version);
            output::print_kv("Manifest version", &bundle.manifest.manifest_version.to_string());
            if !bundle.manifest.permissions.is_empty() {
                output::print_kv("Permissions", &bundle.manifest.permissions.join(", "));
            }
            output::print_kv("Files", &bundle.files.join(", "));
        }
    }
    Ok(())
}
