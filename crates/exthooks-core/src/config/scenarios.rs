//! End-to-end scenario configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inputs and wait budgets for the built-in storage and tab scenarios.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScenarioConfig {
    /// How long to poll for an observable state change (stored data, tab URL).
    #[validate(range(min = 100, max = 120000))]
    pub settle_timeout_ms: u64,
    /// Poll interval while waiting for a state change.
    #[validate(range(min = 10, max = 5000))]
    pub poll_interval_ms: u64,
    /// Value written by the storage round trip.
    pub storage_value: serde_json::Value,
    /// URL opened by the tab scenarios.
    #[validate(length(min = 1))]
    pub tab_url: String,
    /// URL the update scenario navigates the tab to.
    #[validate(length(min = 1))]
    pub updated_url: String,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            settle_timeout_ms: 5000,
            poll_interval_ms: 100,
            storage_value: serde_json::json!({ "count": 42 }),
            tab_url: "https://example.com".to_string(),
            updated_url: "https://example.com/updated".to_string(),
        }
    }
}

impl ScenarioConfig {
    /// State-change wait budget.
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    /// Poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
