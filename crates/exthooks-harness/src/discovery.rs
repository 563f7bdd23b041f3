//! Extension identity discovery.
//!
//! The browser assigns the extension its identifier at load time, so the
//! harness reads it back from the management page. One attempt opens a
//! fresh tab on that page, waits for the manager element, snapshots the
//! pierced DOM and selects an entry. The chosen identifier is accepted only
//! once the extension's entry page actually loads under it.

use std::fmt;

use chromiumoxide::Page;
use exthooks_core::HarnessConfig;
use exthooks_core::config::{DiscoveryConfig, SelectionStrategy};
use exthooks_dom::{
    ExtensionCandidate, ExtensionSelection, ManagementLayout, Pick, select_extension,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{DiscoveryDiagnostics, DiscoveryFailure, HarnessError, HarnessResult};
use crate::retry::{RetryPolicy, retry_fixed};
use crate::script::{self, Envelope};
use crate::session::BrowserSession;
use crate::snapshot::pierced_document;
use crate::wait::{PollOutcome, poll_until};

/// A runtime-assigned extension identifier.
///
/// Only discovery produces one, so holding an `ExtensionId` means the
/// identifier was read off the running browser and verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExtensionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Successful discovery.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub id: ExtensionId,
    /// 1-based attempt that succeeded.
    pub attempt: u32,
    /// Entry page URL that loaded under the identifier.
    pub entry_url: String,
    pub selection: ExtensionSelection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagerFlags {
    manager_present: bool,
    manager_shadow_root: bool,
}

/// Build the management page layout from configuration.
pub fn management_layout(config: &DiscoveryConfig) -> HarnessResult<ManagementLayout> {
    Ok(ManagementLayout::new(
        &config.manager_selector,
        &config.item_selector,
        config.id_attribute.clone(),
        Some(config.name_selector.as_str()),
    )?)
}

/// Resolve the identifier of the loaded extension, retrying per the
/// discovery configuration. The last attempt's error is returned unchanged.
#[instrument(skip_all, fields(run_id = %session.run_id()))]
pub async fn resolve_extension_id(
    session: &BrowserSession,
    config: &HarnessConfig,
) -> HarnessResult<DiscoveryReport> {
    let layout = management_layout(&config.discovery)?;
    let manifest_name = session.bundle().manifest.name.clone();
    let pick = match config.discovery.selection {
        SelectionStrategy::Last => Pick::Last,
        SelectionStrategy::ManifestName => Pick::NamedOrLast(&manifest_name),
    };
    let policy = RetryPolicy::new(
        config.discovery.max_attempts,
        config.discovery.retry_delay(),
    );

    let report = retry_fixed(policy, "extension discovery", |attempt| {
        discover_once(session, config, &layout, pick, attempt)
    })
    .await?;

    info!(
        id = %report.id,
        attempt = report.attempt,
        candidates = report.selection.candidates.len(),
        "Extension identifier resolved"
    );
    Ok(report)
}

/// One discovery attempt in its own tab. The tab is closed on every path.
#[instrument(skip(session, config, layout, pick))]
pub async fn discover_once(
    session: &BrowserSession,
    config: &HarnessConfig,
    layout: &ManagementLayout,
    pick: Pick<'_>,
    attempt: u32,
) -> HarnessResult<DiscoveryReport> {
    let page = session
        .new_page("about:blank")
        .await
        .map_err(|e| HarnessError::Discovery {
            attempt,
            failure: DiscoveryFailure::Protocol(e.to_string()),
            diagnostics: Box::default(),
        })?;

    let mut selection = None;
    let outcome = inspect(session, config, layout, pick, &page, &mut selection).await;

    let result = match outcome {
        Ok(report) => Ok(DiscoveryReport { attempt, ..report }),
        Err(failure) => {
            let mut diagnostics = collect_diagnostics(&page, &config.discovery).await;
            if let Some(selection) = selection {
                diagnostics.candidates = selection;
            }
            warn!(
                attempt,
                error = %failure,
                url = ?diagnostics.page_url,
                manager_present = diagnostics.manager_present,
                manager_shadow_root = diagnostics.manager_shadow_root,
                "Discovery attempt failed"
            );
            Err(HarnessError::Discovery {
                attempt,
                failure,
                diagnostics: Box::new(diagnostics),
            })
        }
    };

    if let Err(e) = page.close().await {
        debug!(error = %e, "Failed to close management tab");
    }
    result
}

async fn inspect(
    session: &BrowserSession,
    config: &HarnessConfig,
    layout: &ManagementLayout,
    pick: Pick<'_>,
    page: &Page,
    seen: &mut Option<Vec<ExtensionCandidate>>,
) -> Result<DiscoveryReport, DiscoveryFailure> {
    let discovery = &config.discovery;
    page.goto(discovery.management_url.as_str())
        .await
        .map_err(|e| DiscoveryFailure::Protocol(e.to_string()))?;

    let attached = script::element_attached(layout.manager.as_str());
    let outcome = poll_until(discovery.manager_timeout(), discovery.poll_interval(), || {
        let js = attached.clone();
        async move {
            let found: Envelope<bool> = script::eval(page, "manager attached", js).await?;
            Ok(found.value.unwrap_or(false))
        }
    })
    .await;
    if let PollOutcome::TimedOut { .. } = outcome {
        return Err(DiscoveryFailure::ManagerNotLoaded {
            selector: layout.manager.to_string(),
        });
    }

    let document = pierced_document(page)
        .await
        .map_err(|e| DiscoveryFailure::Protocol(e.to_string()))?;
    debug!(nodes = document.node_count(), "Management page snapshot");

    let selection = select_extension(&document, layout, pick)?;
    *seen = Some(selection.candidates.clone());

    let id = ExtensionId::new(selection.id.clone());
    let entry_url = verify_entry_page(session, config, &id).await?;

    Ok(DiscoveryReport {
        id,
        attempt: 0,
        entry_url,
        selection,
    })
}

/// Load the entry page under `id` and check the tab stayed on the
/// extension's origin. An unknown identifier lands on an error page.
async fn verify_entry_page(
    session: &BrowserSession,
    config: &HarnessConfig,
    id: &ExtensionId,
) -> Result<String, DiscoveryFailure> {
    let url = config.extension.entry_url(id.as_str());
    let origin = config.extension.origin(id.as_str());

    let page = session
        .new_page(&url)
        .await
        .map_err(|e| DiscoveryFailure::VerificationFailed {
            url: url.clone(),
            reason: e.to_string(),
        })?;
    let landed: HarnessResult<Envelope<String>> =
        script::eval(&page, "entry page location", script::location()).await;
    if let Err(e) = page.close().await {
        debug!(error = %e, "Failed to close verification tab");
    }

    match landed {
        Ok(Envelope {
            value: Some(href), ..
        }) if href.starts_with(&origin) => Ok(url),
        Ok(Envelope { value, .. }) => Err(DiscoveryFailure::VerificationFailed {
            url,
            reason: format!("tab landed on {}", value.as_deref().unwrap_or("an unknown page")),
        }),
        Err(e) => Err(DiscoveryFailure::VerificationFailed {
            url,
            reason: e.to_string(),
        }),
    }
}

async fn collect_diagnostics(page: &Page, config: &DiscoveryConfig) -> DiscoveryDiagnostics {
    let location =
        script::eval::<Envelope<String>>(page, "diagnostics location", script::location()).await;
    let page_url = match location {
        Ok(envelope) => envelope.value,
        Err(e) => {
            debug!(error = %e, "Could not read management tab location");
            None
        }
    };

    let flags = script::eval::<ManagerFlags>(
        page,
        "diagnostics manager flags",
        script::manager_flags(&config.manager_selector),
    )
    .await
    .unwrap_or_else(|e| {
        debug!(error = %e, "Could not read manager flags");
        ManagerFlags::default()
    });

    let page_html = if config.capture_page_html {
        match page.content().await {
            Ok(html) => {
                debug!(bytes = html.len(), "Captured management page HTML");
                Some(html)
            }
            Err(e) => {
                debug!(error = %e, "Could not capture management page HTML");
                None
            }
        }
    } else {
        None
    };

    DiscoveryDiagnostics {
        page_url,
        manager_present: flags.manager_present,
        manager_shadow_root: flags.manager_shadow_root,
        candidates: Vec::new(),
        page_html,
    }
}
