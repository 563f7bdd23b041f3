//! Extension bundle configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Location and shape of the built extension under test.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Directory holding the built extension.
    pub bundle_dir: PathBuf,
    /// HTML entry page inside the bundle.
    #[validate(length(min = 1))]
    pub entry_page: String,
    /// URL scheme extension pages are served from.
    #[validate(length(min = 1))]
    pub url_scheme: String,
    /// Files that must exist in `bundle_dir` before the browser is launched.
    #[validate(length(min = 1))]
    pub required_files: Vec<String>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("dist"),
            entry_page: "index.html".to_string(),
            url_scheme: "chrome-extension".to_string(),
            required_files: vec![
                "manifest.json".to_string(),
                "index.html".to_string(),
                "content.js".to_string(),
                "background.js".to_string(),
            ],
        }
    }
}

impl ExtensionConfig {
    /// Origin of an extension with the given identifier.
    pub fn origin(&self, extension_id: &str) -> String {
        format!("{}://{}", self.url_scheme, extension_id)
    }

    /// URL of the entry page for an extension with the given identifier.
    pub fn entry_url(&self, extension_id: &str) -> String {
        format!(
            "{}/{}",
            self.origin(extension_id),
            self.entry_page.trim_start_matches('/')
        )
    }
}
