//! End-to-end scenarios against the published hook surface.
//!
//! Each scenario runs on its own freshly opened, ready entry page. State
//! changes driven through the hooks are observed by polling within the
//! scenario settle timeout rather than after a fixed sleep.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use chrono::{DateTime, Utc};
use exthooks_core::config::ScenarioConfig;
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;
use uuid::Uuid;

use crate::discovery::ExtensionId;
use crate::error::{HarnessError, HarnessResult};
use crate::harness::HarnessContext;
use crate::hooks::{CreateTab, TabInfo, UpdateTab};
use crate::readiness::ReadyPage;
use crate::wait::{PollOutcome, millis, poll_until};

/// A built-in scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    StorageRoundTrip,
    TabLifecycle,
    TabUpdate,
    BackgroundPing,
}

impl Scenario {
    /// Every scenario, in suite order.
    pub const ALL: [Scenario; 4] = [
        Scenario::StorageRoundTrip,
        Scenario::TabLifecycle,
        Scenario::TabUpdate,
        Scenario::BackgroundPing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::StorageRoundTrip => "storage_round_trip",
            Self::TabLifecycle => "tab_lifecycle",
            Self::TabUpdate => "tab_update",
            Self::BackgroundPing => "background_ping",
        }
    }

    /// Run on a ready page. Returns a short description of what was
    /// observed.
    pub async fn run(self, page: &ReadyPage, config: &ScenarioConfig) -> HarnessResult<String> {
        match self {
            Self::StorageRoundTrip => storage_round_trip(page, config).await,
            Self::TabLifecycle => tab_lifecycle(page, config).await,
            Self::TabUpdate => tab_update(page, config).await,
            Self::BackgroundPing => background_ping(page).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s.trim().replace('-', "_"))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|s| s.name()).collect();
                format!("unknown scenario '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub passed: bool,
    pub duration_ms: u64,
    pub detail: String,
}

/// Results of a suite run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub extension_id: ExtensionId,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Whether every scenario passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ScenarioOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }
}

/// Run `scenarios` in order, each on a fresh ready page. A failing scenario
/// does not stop the ones after it.
#[instrument(skip_all, fields(extension_id = %ctx.extension_id()))]
pub async fn run_suite(ctx: &HarnessContext<'_>, scenarios: &[Scenario]) -> SuiteReport {
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(scenarios.len());

    for &scenario in scenarios {
        let start = Instant::now();
        let result = run_one(ctx, scenario).await;
        let duration_ms = millis(start.elapsed());

        let outcome = match result {
            Ok(detail) => {
                info!(%scenario, duration_ms, %detail, "Scenario passed");
                ScenarioOutcome {
                    scenario,
                    passed: true,
                    duration_ms,
                    detail,
                }
            }
            Err(e) => {
                error!(%scenario, duration_ms, error = %e, "Scenario failed");
                ScenarioOutcome {
                    scenario,
                    passed: false,
                    duration_ms,
                    detail: e.to_string(),
                }
            }
        };
        outcomes.push(outcome);
    }

    SuiteReport {
        run_id: ctx.session().run_id(),
        extension_id: ctx.extension_id().clone(),
        started_at,
        outcomes,
    }
}

async fn run_one(ctx: &HarnessContext<'_>, scenario: Scenario) -> HarnessResult<String> {
    let page = ctx.open_ready_page().await?;
    let result = scenario.run(&page, &ctx.config().scenarios).await;
    if let Err(e) = page.close().await {
        debug!(%scenario, error = %e, "Failed to close scenario tab");
    }
    result
}

/// Store a value through the storage hooks and wait for it to read back.
pub async fn storage_round_trip(page: &ReadyPage, config: &ScenarioConfig) -> HarnessResult<String> {
    const NAME: &str = "storage_round_trip";
    let hooks = page.hooks();
    let expected = &config.storage_value;

    if !hooks.storage_set(expected).await? {
        return Err(HarnessError::assertion(NAME, "setValue did not report success"));
    }

    let outcome = poll_until(config.settle_timeout(), config.poll_interval(), move || async move {
        Ok(hooks.storage_data().await?.as_ref() == Some(expected))
    })
    .await;

    match outcome {
        PollOutcome::Satisfied { elapsed, .. } => Ok(format!(
            "stored {expected} and read it back after {}ms",
            elapsed.as_millis()
        )),
        PollOutcome::TimedOut { last_error, .. } => {
            let seen = hooks.storage_data().await.ok().flatten();
            Err(HarnessError::assertion(
                NAME,
                format!(
                    "stored data never equalled {expected} (last seen {}{})",
                    seen.map(|v| v.to_string()).unwrap_or_else(|| "nothing".into()),
                    last_error.map(|e| format!(", last error: {e}")).unwrap_or_default()
                ),
            ))
        }
    }
}

/// Open a tab, watch it become current, then close it.
pub async fn tab_lifecycle(page: &ReadyPage, config: &ScenarioConfig) -> HarnessResult<String> {
    const NAME: &str = "tab_lifecycle";
    let hooks = page.hooks();
    let host = host_of(&config.tab_url)
        .ok_or_else(|| HarnessError::assertion(NAME, format!("no host in {}", config.tab_url)))?;

    let created = hooks
        .create_tab(&CreateTab {
            url: config.tab_url.clone(),
            active: true,
        })
        .await?
        .ok_or_else(|| HarnessError::assertion(NAME, "createTab returned no tab"))?;
    if !created.active {
        return Err(HarnessError::assertion(NAME, "created tab is not active"));
    }

    let expected = host.as_str();
    let outcome = poll_until(config.settle_timeout(), config.poll_interval(), move || async move {
        let current = hooks.current_tab().await?;
        Ok(tab_on_host(current.as_ref(), expected))
    })
    .await;
    if !outcome.is_satisfied() {
        let seen = hooks.current_tab().await.ok().flatten();
        return Err(HarnessError::assertion(
            NAME,
            format!("current tab never reached {host} (last seen {})", describe(seen.as_ref())),
        ));
    }

    let active = hooks
        .active_tab()
        .await?
        .ok_or_else(|| HarnessError::assertion(NAME, "no active tab tracked"))?;
    if !tab_on_host(Some(&active), &host) {
        return Err(HarnessError::assertion(
            NAME,
            format!("active tab is {}, expected {host}", describe(Some(&active))),
        ));
    }

    let tab_id = active
        .id
        .or(created.id)
        .ok_or_else(|| HarnessError::assertion(NAME, "active tab has no id"))?;
    if !hooks.close_tab(tab_id).await? {
        return Err(HarnessError::assertion(NAME, format!("closeTab({tab_id}) reported failure")));
    }

    Ok(format!("tab {tab_id} reached {host} and was closed"))
}

/// Open a tab, pin it and move it to another path, and watch the change
/// land.
pub async fn tab_update(page: &ReadyPage, config: &ScenarioConfig) -> HarnessResult<String> {
    const NAME: &str = "tab_update";
    let hooks = page.hooks();
    let target = Url::parse(&config.updated_url).map_err(|e| {
        HarnessError::assertion(NAME, format!("invalid updated url {}: {e}", config.updated_url))
    })?;
    let host = target.host_str().unwrap_or_default().to_string();
    let path = target.path().to_string();

    let created = hooks
        .create_tab(&CreateTab {
            url: config.tab_url.clone(),
            active: true,
        })
        .await?
        .ok_or_else(|| HarnessError::assertion(NAME, "createTab returned no tab"))?;
    let tab_id = created
        .id
        .ok_or_else(|| HarnessError::assertion(NAME, "created tab has no id"))?;

    let updated = hooks
        .update_tab(
            tab_id,
            &UpdateTab {
                url: Some(config.updated_url.clone()),
                pinned: Some(true),
                active: None,
            },
        )
        .await?
        .ok_or_else(|| HarnessError::assertion(NAME, "updateTab returned no tab"))?;
    if !updated.pinned {
        return Err(HarnessError::assertion(NAME, "updated tab is not pinned"));
    }

    let (expected_host, expected_path) = (host.as_str(), path.as_str());
    let outcome = poll_until(config.settle_timeout(), config.poll_interval(), move || async move {
        let current = hooks.current_tab().await?;
        Ok(tab_updated(current.as_ref(), expected_host, expected_path))
    })
    .await;

    let result = if outcome.is_satisfied() {
        Ok(format!("tab {tab_id} pinned and moved to {path}"))
    } else {
        let seen = hooks.current_tab().await.ok().flatten();
        Err(HarnessError::assertion(
            NAME,
            format!(
                "current tab never showed pinned at {path} (last seen {}, pinned: {})",
                describe(seen.as_ref()),
                seen.as_ref().is_some_and(|t| t.pinned)
            ),
        ))
    };

    if let Err(e) = hooks.close_tab(tab_id).await {
        debug!(tab_id, error = %e, "Failed to close updated tab");
    }
    result
}

/// Check the background worker answers.
pub async fn background_ping(page: &ReadyPage) -> HarnessResult<String> {
    let ack = page.hooks().ping_background().await?;
    if !ack.initialized {
        return Err(HarnessError::assertion(
            "background_ping",
            "background worker replied but is not initialized",
        ));
    }
    Ok("background worker initialized".to_string())
}

/// Host of `url` without a leading `www.`.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(strip_www(host).to_ascii_lowercase())
}

/// Whether `url` is on `host`, ignoring a leading `www.` on either side.
pub fn host_matches(url: &str, host: &str) -> bool {
    host_of(url).is_some_and(|actual| actual.eq_ignore_ascii_case(strip_www(host)))
}

/// Whether `url` is on `host` and its path starts with `prefix`.
pub fn path_matches(url: &str, host: &str, prefix: &str) -> bool {
    Url::parse(url).is_ok_and(|parsed| {
        host_matches(url, host) && parsed.path().starts_with(prefix)
    })
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn tab_on_host(tab: Option<&TabInfo>, host: &str) -> bool {
    tab.and_then(TabInfo::effective_url)
        .is_some_and(|url| host_matches(url, host))
}

/// Both the move and the pin must be visible on a fresh query of the tab.
fn tab_updated(tab: Option<&TabInfo>, host: &str, prefix: &str) -> bool {
    tab.is_some_and(|t| {
        t.pinned
            && t.effective_url()
                .is_some_and(|url| path_matches(url, host, prefix))
    })
}

fn describe(tab: Option<&TabInfo>) -> String {
    tab.and_then(TabInfo::effective_url)
        .unwrap_or("no tab")
        .to_string()
}
