//! Browser launch configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the persistent browser profile the harness launches.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct BrowserConfig {
    /// Explicit browser executable. When unset the DevTools client searches
    /// the usual install locations.
    pub executable: Option<PathBuf>,
    /// Profile directory, removed before launch and after shutdown.
    pub profile_dir: PathBuf,
    /// Run without a visible window. Extension pages do not always activate
    /// correctly headless, so this stays off by default.
    pub headless: bool,
    /// Pass `--no-sandbox` to the browser.
    pub no_sandbox: bool,
    /// Window and viewport width in pixels.
    #[validate(range(min = 320, max = 7680))]
    pub window_width: u32,
    /// Window and viewport height in pixels.
    #[validate(range(min = 240, max = 4320))]
    pub window_height: u32,
    /// Fixed delay after launch while the browser registers the extension.
    #[validate(range(max = 60000))]
    pub settle_delay_ms: u64,
    /// Maximum time to wait for the browser process to expose DevTools.
    #[validate(range(min = 1000, max = 120000))]
    pub launch_timeout_ms: u64,
    /// Maximum time a single DevTools request may take.
    #[validate(range(min = 1000, max = 120000))]
    pub request_timeout_ms: u64,
    /// Additional command-line flags appended after the extension flags.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            profile_dir: PathBuf::from("target/exthooks-profile"),
            headless: false,
            no_sandbox: true,
            window_width: 1280,
            window_height: 720,
            settle_delay_ms: 2000,
            launch_timeout_ms: 20000,
            request_timeout_ms: 30000,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    /// Post-launch settle delay.
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Launch timeout.
    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
