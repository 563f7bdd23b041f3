//! Waiting for the page under test to publish its hook surface.
//!
//! Three steps, each bounded by the step timeout and polled at the poll
//! interval:
//!
//! 1. the root mount element is attached;
//! 2. the hooks container is attached;
//! 3. the container's ready attribute is exactly `"true"` **and** the global
//!    hook surface is set.
//!
//! A step that times out fails the whole wait, naming the step.

use std::fmt;
use std::future::Future;

use chromiumoxide::Page;
use exthooks_core::config::ReadinessConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{HarnessError, HarnessResult};
use crate::hooks::HookSurface;
use crate::script::{self, Envelope};
use crate::wait::{PollOutcome, millis, poll_until};

/// One readiness step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessStep {
    RootMounted,
    ContainerMounted,
    HooksReady,
}

impl fmt::Display for ReadinessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMounted => write!(f, "root mount element"),
            Self::ContainerMounted => write!(f, "hooks container"),
            Self::HooksReady => write!(f, "hooks ready signal"),
        }
    }
}

/// What the page reports for the final readiness step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessProbe {
    /// Value of the container's ready attribute, if the container exists
    /// and carries it.
    pub ready_attribute: Option<String>,
    /// Whether the global hook surface is set.
    pub has_hooks: bool,
}

impl ReadinessProbe {
    /// Both conditions must hold; a truthy-looking attribute value other than
    /// exactly `"true"` does not count.
    pub fn is_ready(&self) -> bool {
        self.ready_attribute.as_deref() == Some("true") && self.has_hooks
    }
}

/// Summary of the published hook surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksStatus {
    pub has_storage: bool,
    pub has_tabs: bool,
    pub is_ready: bool,
}

/// Time spent on one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub step: ReadinessStep,
    pub elapsed_ms: u64,
    pub polls: u32,
}

/// A page whose hook surface is published.
///
/// Hooks can only be reached through [`ReadyPage::hooks`], so no hook call
/// can be issued before readiness has been established.
pub struct ReadyPage {
    page: Page,
    url: String,
    global_name: String,
    steps: Vec<StepTiming>,
    status: HooksStatus,
}

impl ReadyPage {
    /// The hook surface of this page.
    pub fn hooks(&self) -> HookSurface<'_> {
        HookSurface::new(&self.page, &self.global_name)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Hook surface status observed once readiness was reached.
    pub fn status(&self) -> &HooksStatus {
        &self.status
    }

    /// Close the tab.
    pub async fn close(self) -> HarnessResult<()> {
        self.page.close().await?;
        Ok(())
    }

    /// Close the tab, then hand back `result`. A failure to close only
    /// surfaces when `result` itself succeeded.
    pub async fn close_with<T>(self, result: HarnessResult<T>) -> HarnessResult<T> {
        close_then(self.close(), result).await
    }
}

async fn close_then<T>(
    close: impl Future<Output = HarnessResult<()>>,
    result: HarnessResult<T>,
) -> HarnessResult<T> {
    let closed = close.await;
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                debug!(error = %close_err, "Failed to close tab after error");
            }
            Err(e)
        }
    }
}

impl fmt::Debug for ReadyPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadyPage")
            .field("url", &self.url)
            .field("steps", &self.steps)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Wait until `page`, already navigated to `url`, has published its hooks.
#[instrument(skip(page, config))]
pub async fn await_ready(page: Page, url: &str, config: &ReadinessConfig) -> HarnessResult<ReadyPage> {
    let mut steps = Vec::with_capacity(3);

    let root = script::element_attached(&config.root_selector);
    steps.push(
        wait_step(ReadinessStep::RootMounted, config, || {
            attached(&page, "root attached", root.clone())
        })
        .await?,
    );

    let container = script::element_attached(&config.container_selector);
    steps.push(
        wait_step(ReadinessStep::ContainerMounted, config, || {
            attached(&page, "container attached", container.clone())
        })
        .await?,
    );

    let probe_js = script::readiness_probe(
        &config.container_selector,
        &config.ready_attribute,
        &config.global_name,
    );
    steps.push(
        wait_step(ReadinessStep::HooksReady, config, || {
            let js = probe_js.clone();
            let page = &page;
            async move {
                let probe: ReadinessProbe = script::eval(page, "readiness probe", js).await?;
                debug!(
                    ready_attribute = ?probe.ready_attribute,
                    has_hooks = probe.has_hooks,
                    "Hook status"
                );
                Ok(probe.is_ready())
            }
        })
        .await?,
    );

    let status = observed_status(
        script::eval(
            &page,
            "hooks status",
            script::hooks_status(
                &config.container_selector,
                &config.ready_attribute,
                &config.global_name,
            ),
        )
        .await,
    );
    info!(
        has_storage = status.has_storage,
        has_tabs = status.has_tabs,
        total_ms = steps.iter().map(|s| s.elapsed_ms).sum::<u64>(),
        "Hooks ready"
    );

    Ok(ReadyPage {
        page,
        url: url.to_string(),
        global_name: config.global_name.clone(),
        steps,
        status,
    })
}

/// The status read after the gate is informational: a failed read is logged
/// and reported as an empty status.
fn observed_status(read: HarnessResult<HooksStatus>) -> HooksStatus {
    read.unwrap_or_else(|e| {
        warn!(error = %e, "Could not read hook status after readiness");
        HooksStatus::default()
    })
}

async fn attached(page: &Page, context: &'static str, js: String) -> HarnessResult<bool> {
    let found: Envelope<bool> = script::eval(page, context, js).await?;
    Ok(found.value.unwrap_or(false))
}

async fn wait_step<F, Fut>(
    step: ReadinessStep,
    config: &ReadinessConfig,
    check: F,
) -> HarnessResult<StepTiming>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = HarnessResult<bool>>,
{
    match poll_until(config.step_timeout(), config.poll_interval(), check).await {
        PollOutcome::Satisfied { elapsed, polls } => {
            debug!(%step, elapsed_ms = millis(elapsed), polls, "Readiness step done");
            Ok(StepTiming {
                step,
                elapsed_ms: millis(elapsed),
                polls,
            })
        }
        PollOutcome::TimedOut { polls, last_error } => {
            error!(%step, polls, last_error = ?last_error, "Readiness step timed out");
            Err(HarnessError::ReadinessTimeout {
                step,
                timeout_ms: config.step_timeout_ms,
                last_error,
            })
        }
    }
}
