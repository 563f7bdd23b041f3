//! Hook readiness polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Page contract the readiness poller waits on.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Element the page's bootstrap script mounts into.
    #[validate(length(min = 1))]
    pub root_selector: String,
    /// Element carrying the readiness attribute.
    #[validate(length(min = 1))]
    pub container_selector: String,
    /// Attribute on the container that flips to `"true"`.
    #[validate(length(min = 1))]
    pub ready_attribute: String,
    /// Name of the global hook object on `window`.
    #[validate(length(min = 1))]
    pub global_name: String,
    /// Budget for each of the three wait steps.
    #[validate(range(min = 100, max = 600000))]
    pub step_timeout_ms: u64,
    /// Poll interval for all steps.
    #[validate(range(min = 10, max = 5000))]
    pub poll_interval_ms: u64,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            root_selector: "#root".to_string(),
            container_selector: "#hooks-container".to_string(),
            ready_attribute: "data-hooks-ready".to_string(),
            global_name: "__CHROME_HOOKS__".to_string(),
            step_timeout_ms: 30000,
            poll_interval_ms: 100,
        }
    }
}

impl ReadinessConfig {
    /// Budget for a single wait step.
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// Poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
