//! Browser session lifecycle.
//!
//! A [`BrowserSession`] owns one browser process launched against a fresh
//! profile directory with only the bundle under test loaded. The DevTools
//! event handler runs on its own task for the lifetime of the session.
//! [`BrowserSession::shutdown`] closes the browser and removes the profile;
//! dropping the session without shutting it down still removes the profile
//! directory, best-effort.

use std::path::{Path, PathBuf};

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::handler::viewport::Viewport;
use chrono::{DateTime, Utc};
use exthooks_core::HarnessConfig;
use exthooks_core::config::BrowserConfig;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::bundle::{VerifiedBundle, verify_bundle};
use crate::error::{HarnessError, HarnessResult};
use crate::wait::millis;

/// A running browser with the extension under test loaded.
pub struct BrowserSession {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    bundle: VerifiedBundle,
    profile_dir: PathBuf,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

impl BrowserSession {
    /// Verify the bundle and launch a browser with it loaded.
    ///
    /// Waits the configured settle delay before returning so the browser
    /// has registered the extension.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty))]
    pub async fn launch(config: &HarnessConfig) -> HarnessResult<Self> {
        let run_id = Uuid::now_v7();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let bundle =
            verify_bundle(&config.extension.bundle_dir, &config.extension.required_files).await?;

        let profile_dir = config.browser.profile_dir.clone();
        remove_profile_dir(&profile_dir).await;

        let launch_config = launch_config(&config.browser, &bundle.dir, &profile_dir)?;
        info!(
            bundle = %bundle.dir.display(),
            profile = %profile_dir.display(),
            headless = config.browser.headless,
            "Launching browser"
        );

        let (browser, mut handler) = match Browser::launch(launch_config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile_dir(&profile_dir).await;
                return Err(HarnessError::Launch(e));
            }
        };

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "DevTools handler event error");
                }
            }
            debug!("DevTools handler loop ended");
        });

        let session = Self {
            run_id,
            started_at: Utc::now(),
            bundle,
            profile_dir,
            browser: Some(browser),
            handler: Some(handler),
        };

        let settle = config.browser.settle_delay();
        debug!(
            settle_ms = millis(settle),
            "Waiting for extension registration"
        );
        tokio::time::sleep(settle).await;

        info!(run_id = %session.run_id, "Browser session ready");
        Ok(session)
    }

    /// Identifier of this run, used to correlate logs.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The verified bundle this session loaded.
    pub fn bundle(&self) -> &VerifiedBundle {
        &self.bundle
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Open a new tab on `url`.
    pub async fn new_page(&self, url: &str) -> HarnessResult<Page> {
        let browser = self.browser.as_ref().ok_or(HarnessError::SessionClosed)?;
        Ok(browser.new_page(url).await?)
    }

    /// Close the browser, stop the handler and remove the profile directory.
    ///
    /// Never fails: teardown problems are logged and swallowed so they do
    /// not mask the outcome of the run.
    pub async fn shutdown(mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "Error closing browser");
            }
            if let Err(e) = browser.wait().await {
                debug!(error = %e, "Error waiting for browser exit");
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        remove_profile_dir(&self.profile_dir).await;
        info!(run_id = %self.run_id, "Browser session closed");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
        if self.browser.take().is_some() {
            warn!(run_id = %self.run_id, "Browser session dropped without shutdown");
            if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
                debug!(error = %e, "Profile cleanup on drop failed");
            }
        }
    }
}

/// Command-line flags that restrict the browser to the bundle under test.
pub fn extension_args(bundle_dir: &Path) -> Vec<String> {
    let dir = bundle_dir.display();
    vec![
        format!("--disable-extensions-except={dir}"),
        format!("--load-extension={dir}"),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ]
}

fn launch_config(
    browser: &BrowserConfig,
    bundle_dir: &Path,
    profile_dir: &Path,
) -> HarnessResult<LaunchConfig> {
    let mut builder = LaunchConfig::builder()
        .disable_default_args()
        .user_data_dir(profile_dir)
        .window_size(browser.window_width, browser.window_height)
        .viewport(Viewport {
            width: browser.window_width,
            height: browser.window_height,
            ..Default::default()
        })
        .launch_timeout(browser.launch_timeout())
        .request_timeout(browser.request_timeout())
        .args(extension_args(bundle_dir))
        .args(browser.extra_args.clone());

    if !browser.headless {
        builder = builder.with_head();
    }
    if browser.no_sandbox {
        builder = builder.no_sandbox();
    }
    if let Some(executable) = &browser.executable {
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(HarnessError::LaunchConfig)
}

/// Remove a profile directory, ignoring "not found" and logging anything
/// else.
pub async fn remove_profile_dir(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => debug!(dir = %dir.display(), "Removed profile directory"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(dir = %dir.display(), error = %e, "Failed to remove profile directory"),
    }
}
