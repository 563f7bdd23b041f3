//! Shared test helpers for integration tests.
//!
//! Browser-backed tests are `#[ignore]`d by default; run them with
//! `cargo test -- --ignored` on a machine with Chromium. Set
//! `EXTHOOKS_E2E_HEADLESS=1` to run without a window and
//! `EXTHOOKS__BROWSER__EXECUTABLE` to point at a specific browser.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use exthooks_core::HarnessConfig;
use exthooks_harness::ExtensionHarness;

/// Reason string for tests that need a real browser.
pub const NEEDS_BROWSER: &str = "requires a local Chromium and a display";

/// Directory of the fixture extension shipped with the repository.
pub fn fixture_bundle() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/extension")
}

/// Test harness context
pub struct TestHarness {
    /// The harness under test
    pub harness: ExtensionHarness,
    /// Keeps the profile's parent directory alive for the test's duration
    pub scratch: TempDir,
}

impl TestHarness {
    /// Harness pointed at the fixture bundle with a throwaway profile.
    pub fn new() -> Self {
        Self::with(|_| {})
    }

    /// Like [`TestHarness::new`], with extra configuration applied.
    pub fn with(customize: impl FnOnce(&mut HarnessConfig)) -> Self {
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");
        let mut config = test_config(&scratch);
        customize(&mut config);
        config.validate_all().expect("Invalid test config");

        Self {
            harness: ExtensionHarness::new(config),
            scratch,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        self.harness.config()
    }

    pub fn profile_dir(&self) -> PathBuf {
        self.config().browser.profile_dir.clone()
    }
}

/// Configuration for tests: fixture bundle, profile under `scratch`,
/// environment overrides for the browser.
pub fn test_config(scratch: &TempDir) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.extension.bundle_dir = fixture_bundle();
    config.browser.profile_dir = scratch.path().join("profile");
    config.browser.headless = std::env::var("EXTHOOKS_E2E_HEADLESS").is_ok_and(|v| v == "1");
    if let Ok(executable) = std::env::var("EXTHOOKS__BROWSER__EXECUTABLE") {
        config.browser.executable = Some(PathBuf::from(executable));
    }
    config
}

/// Install a test subscriber once so harness logs show up with
/// `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
