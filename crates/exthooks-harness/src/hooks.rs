//! Typed calls into the page's published hook surface.
//!
//! The page exposes a global object with a `storage` group and a `tabs`
//! group. Each method here evaluates one call on the page and maps a
//! page-side failure to [`HarnessError::HookCall`] naming the operation.

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::script::{self, Envelope};

/// A browser tab as reported by the tabs hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabInfo {
    pub id: Option<i64>,
    pub window_id: Option<i64>,
    pub url: Option<String>,
    pub pending_url: Option<String>,
    pub title: Option<String>,
    pub active: bool,
    pub pinned: bool,
}

impl TabInfo {
    /// The committed URL, or the pending one while navigation is under way.
    pub fn effective_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.pending_url.as_deref())
    }
}

/// Properties for creating a tab.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTab {
    pub url: String,
    pub active: bool,
}

/// Properties for updating a tab. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTab {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Reply from the background worker to a ping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundAck {
    pub initialized: bool,
}

/// Handle to the hook surface of a ready page.
#[derive(Clone, Copy)]
pub struct HookSurface<'p> {
    page: &'p Page,
    global: &'p str,
}

impl<'p> HookSurface<'p> {
    pub(crate) fn new(page: &'p Page, global: &'p str) -> Self {
        Self { page, global }
    }

    /// Persist `value` through the storage hooks. Returns whether the hooks
    /// reported success.
    pub async fn storage_set(&self, value: &serde_json::Value) -> HarnessResult<bool> {
        let body = format!("return {{ value: !!(await group.setValue({value})) }};");
        Ok(self
            .call::<bool>("storage.setValue", "storage", &body)
            .await?
            .unwrap_or(false))
    }

    /// The storage hooks' current in-memory data.
    pub async fn storage_data(&self) -> HarnessResult<Option<serde_json::Value>> {
        let body = "return { value: group.data === undefined ? null : group.data };";
        self.call("storage.data", "storage", body).await
    }

    /// Open a tab.
    pub async fn create_tab(&self, options: &CreateTab) -> HarnessResult<Option<TabInfo>> {
        let options = serde_json::to_string(options)?;
        let body = format!("return {{ value: (await group.createTab({options})) || null }};");
        self.call("tabs.createTab", "tabs", &body).await
    }

    /// The tab the browser currently considers active.
    pub async fn current_tab(&self) -> HarnessResult<Option<TabInfo>> {
        let body = "return { value: (await group.getCurrentTab()) || null };";
        self.call("tabs.getCurrentTab", "tabs", body).await
    }

    /// The tabs hooks' tracked active tab.
    pub async fn active_tab(&self) -> HarnessResult<Option<TabInfo>> {
        let body = "return { value: group.activeTab || null };";
        self.call("tabs.activeTab", "tabs", body).await
    }

    /// Update a tab's properties.
    pub async fn update_tab(&self, tab_id: i64, update: &UpdateTab) -> HarnessResult<Option<TabInfo>> {
        let update = serde_json::to_string(update)?;
        let body =
            format!("return {{ value: (await group.updateTab({tab_id}, {update})) || null }};");
        self.call("tabs.updateTab", "tabs", &body).await
    }

    /// Close a tab. Returns whether the hooks reported success.
    pub async fn close_tab(&self, tab_id: i64) -> HarnessResult<bool> {
        let body = format!("return {{ value: !!(await group.closeTab({tab_id})) }};");
        Ok(self
            .call::<bool>("tabs.closeTab", "tabs", &body)
            .await?
            .unwrap_or(false))
    }

    /// Send a ping to the extension's background worker.
    pub async fn ping_background(&self) -> HarnessResult<BackgroundAck> {
        let message = serde_json::json!({ "type": "ping" });
        let reply: Envelope<BackgroundAck> =
            script::eval(self.page, "runtime.sendMessage", script::runtime_message(&message))
                .await
                .map_err(|e| hook_error("runtime.sendMessage", e))?;
        reply
            .value
            .ok_or_else(|| HarnessError::hook_call("runtime.sendMessage", "no reply from background"))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        group: &str,
        body: &str,
    ) -> HarnessResult<Option<T>> {
        debug!(operation, "Hook call");
        let envelope: Envelope<T> =
            script::eval(self.page, operation, script::hook_call(self.global, group, body))
                .await
                .map_err(|e| hook_error(operation, e))?;
        Ok(envelope.value)
    }
}

fn hook_error(operation: &'static str, err: HarnessError) -> HarnessError {
    match err {
        HarnessError::Evaluation { reason, .. } => HarnessError::hook_call(operation, reason),
        other => HarnessError::hook_call(operation, other.to_string()),
    }
}
