//! # exthooks-harness
//!
//! Drives a real Chromium instance to exercise a browser extension's hook
//! surface. One flow per test, strictly ordered:
//!
//! 1. **Launch** ([`session::BrowserSession`]): verify the built bundle,
//!    start a persistent profile with only that extension loaded.
//! 2. **Discover** ([`discovery::resolve_extension_id`]): read the
//!    runtime-assigned extension identifier off the management page, with
//!    fixed-count retries.
//! 3. **Await ready** ([`readiness::await_ready`]): poll the extension page
//!    until its hook surface has been published.
//!
//! [`harness::ExtensionHarness::run`] chains the three and guarantees the
//! session is torn down on every exit path. The types enforce the ordering:
//! an [`discovery::ExtensionId`] can only come from discovery, and a
//! [`hooks::HookSurface`] can only be borrowed from a
//! [`readiness::ReadyPage`].

pub mod bundle;
pub mod discovery;
pub mod error;
pub mod harness;
pub mod hooks;
pub mod readiness;
pub mod retry;
pub mod scenarios;
pub mod script;
pub mod session;
pub mod snapshot;
pub mod wait;

pub use bundle::{ExtensionManifest, VerifiedBundle};
pub use discovery::{DiscoveryReport, ExtensionId, resolve_extension_id};
pub use error::{DiscoveryDiagnostics, DiscoveryFailure, HarnessError, HarnessResult};
pub use harness::{ExtensionHarness, HarnessContext};
pub use hooks::{BackgroundAck, CreateTab, HookSurface, TabInfo, UpdateTab};
pub use readiness::{HooksStatus, ReadinessProbe, ReadinessStep, ReadyPage, await_ready};
pub use retry::RetryPolicy;
pub use scenarios::{Scenario, ScenarioOutcome, SuiteReport, run_suite};
pub use session::BrowserSession;
