//! Extension identity discovery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// How to choose among several extension entries on the management page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Take the last entry in document order.
    #[default]
    Last,
    /// Prefer the last entry whose displayed name equals the bundle's
    /// manifest name; fall back to the last entry.
    ManifestName,
}

/// Settings for reading the extension identifier off the management page.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Internal page listing installed extensions.
    #[validate(length(min = 1))]
    pub management_url: String,
    /// Selector for the management page's root custom element.
    #[validate(length(min = 1))]
    pub manager_selector: String,
    /// Selector for one extension entry inside the manager's shadow tree.
    #[validate(length(min = 1))]
    pub item_selector: String,
    /// Attribute of an entry that carries the extension identifier.
    #[validate(length(min = 1))]
    pub id_attribute: String,
    /// Selector, inside an entry's shadow tree, of its displayed name.
    pub name_selector: String,
    /// Entry selection rule.
    pub selection: SelectionStrategy,
    /// Attempts before the last discovery error is surfaced.
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,
    /// Pause between attempts.
    #[validate(range(max = 60000))]
    pub retry_delay_ms: u64,
    /// How long to wait for the manager element before failing the attempt.
    #[validate(range(min = 100, max = 120000))]
    pub manager_timeout_ms: u64,
    /// Poll interval while waiting for the manager element.
    #[validate(range(min = 10, max = 5000))]
    pub poll_interval_ms: u64,
    /// Attach the management page HTML to discovery errors.
    pub capture_page_html: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            management_url: "chrome://extensions".to_string(),
            manager_selector: "extensions-manager".to_string(),
            item_selector: "extensions-item".to_string(),
            id_attribute: "id".to_string(),
            name_selector: "#name".to_string(),
            selection: SelectionStrategy::Last,
            max_attempts: 3,
            retry_delay_ms: 1000,
            manager_timeout_ms: 10000,
            poll_interval_ms: 100,
            capture_page_html: true,
        }
    }
}

impl DiscoveryConfig {
    /// Pause between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Manager element wait budget.
    pub fn manager_timeout(&self) -> Duration {
        Duration::from_millis(self.manager_timeout_ms)
    }

    /// Poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
