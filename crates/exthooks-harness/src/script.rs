//! Page-side expressions and their evaluation.
//!
//! Every expression evaluates to an object so the DevTools protocol always
//! hands back a by-value result; scalar answers are wrapped as
//! `{ value: ... }` and read through [`Envelope`]. String literals are
//! embedded as JSON so selectors and names never need escaping by hand.

use chromiumoxide::Page;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{HarnessError, HarnessResult};

/// `{ value: T }` wrapper for scalar results. `null` and a missing field
/// both read as `None`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: Option<T>,
}

/// Evaluate `expression` on `page`, awaiting promises, and deserialize the
/// returned value.
pub async fn eval<T: DeserializeOwned>(
    page: &Page,
    context: &'static str,
    expression: String,
) -> HarnessResult<T> {
    let params = EvaluateParams::builder()
        .expression(expression)
        .await_promise(true)
        .return_by_value(true)
        .build()
        .map_err(|reason| HarnessError::Evaluation { context, reason })?;

    let result = page
        .evaluate_expression(params)
        .await
        .map_err(|e| HarnessError::Evaluation {
            context,
            reason: e.to_string(),
        })?;

    result.into_value::<T>().map_err(|e| HarnessError::Evaluation {
        context,
        reason: e.to_string(),
    })
}

/// JSON string literal for `value`.
pub fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// `{ value: bool }`: whether `selector` matches in the light DOM.
pub fn element_attached(selector: &str) -> String {
    format!(
        "({{ value: document.querySelector({}) !== null }})",
        js_str(selector)
    )
}

/// `{ value: string }`: the page's current location.
pub fn location() -> String {
    "({ value: window.location.href })".to_string()
}

/// `{ managerPresent, managerShadowRoot }` for the management page.
pub fn manager_flags(manager_selector: &str) -> String {
    format!(
        "(() => {{ const m = document.querySelector({}); \
         return {{ managerPresent: !!m, managerShadowRoot: !!(m && m.shadowRoot) }}; }})()",
        js_str(manager_selector)
    )
}

/// `{ readyAttribute, hasHooks }` for the readiness predicate.
pub fn readiness_probe(container_selector: &str, ready_attribute: &str, global: &str) -> String {
    format!(
        "(() => {{ const c = document.querySelector({}); \
         return {{ readyAttribute: c ? c.getAttribute({}) : null, hasHooks: !!window[{}] }}; }})()",
        js_str(container_selector),
        js_str(ready_attribute),
        js_str(global)
    )
}

/// `{ hasStorage, hasTabs, isReady }` summary of the hook surface.
pub fn hooks_status(container_selector: &str, ready_attribute: &str, global: &str) -> String {
    format!(
        "(() => {{ const h = window[{global}]; const c = document.querySelector({container}); \
         return {{ hasStorage: !!(h && h.storage), hasTabs: !!(h && h.tabs), \
         isReady: !!c && c.getAttribute({attr}) === 'true' }}; }})()",
        global = js_str(global),
        container = js_str(container_selector),
        attr = js_str(ready_attribute)
    )
}

/// Run `body` with `group` bound to `window[global][group_name]`.
///
/// `body` must `return { value: ... }`. Throws when the group has not been
/// published, which surfaces as an evaluation error.
pub fn hook_call(global: &str, group_name: &str, body: &str) -> String {
    format!(
        "(async () => {{ const hooks = window[{global}]; \
         if (!hooks || !hooks[{group}]) {{ throw new Error({missing}); }} \
         const group = hooks[{group}]; {body} }})()",
        global = js_str(global),
        group = js_str(group_name),
        missing = js_str(&format!("{group_name} hooks are not published")),
    )
}

/// `{ value: reply }` from a runtime message to the background worker.
pub fn runtime_message(message: &serde_json::Value) -> String {
    format!("(async () => ({{ value: await chrome.runtime.sendMessage({message}) }}))()")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes_quotes() {
        assert_eq!(js_str("#root"), "\"#root\"");
        assert_eq!(
            js_str(r#"div[data-x="1"]"#),
            r#""div[data-x=\"1\"]""#
        );
    }

    #[test]
    fn test_element_attached_embeds_selector_literal() {
        assert_eq!(
            element_attached("#hooks-container"),
            "({ value: document.querySelector(\"#hooks-container\") !== null })"
        );
    }

    #[test]
    fn test_readiness_probe_reads_attribute_and_global() {
        let js = readiness_probe("#hooks-container", "data-hooks-ready", "__CHROME_HOOKS__");
        assert!(js.contains("document.querySelector(\"#hooks-container\")"));
        assert!(js.contains("getAttribute(\"data-hooks-ready\")"));
        assert!(js.contains("window[\"__CHROME_HOOKS__\"]"));
    }

    #[test]
    fn test_readiness_probe_reports_raw_attribute() {
        let js = readiness_probe("#box", "data-ready", "__HOOKS__");
        // The attribute is passed through untouched and compared strictly
        // on the Rust side; only the global is coerced to a boolean.
        assert!(js.contains("readyAttribute: c ? c.getAttribute(\"data-ready\") : null"));
        assert!(js.contains("hasHooks: !!window[\"__HOOKS__\"]"));
        assert!(!js.contains("=="));
    }

    #[test]
    fn test_hooks_status_compares_attribute_strictly() {
        let js = hooks_status("#box", "data-ready", "__HOOKS__");
        assert!(js.contains("c.getAttribute(\"data-ready\") === 'true'"));
        assert!(js.contains("const h = window[\"__HOOKS__\"]"));
        assert!(js.contains("hasStorage: !!(h && h.storage)"));
        assert!(js.contains("hasTabs: !!(h && h.tabs)"));
    }

    #[test]
    fn test_hook_call_guards_missing_group() {
        let js = hook_call("__CHROME_HOOKS__", "tabs", "return { value: group.activeTab };");
        assert!(js.starts_with("(async () =>"));
        assert!(js.contains("hooks[\"tabs\"]"));
        assert!(js.contains("tabs hooks are not published"));
        assert!(js.ends_with("return { value: group.activeTab }; })()"));
    }

    #[test]
    fn test_runtime_message_inlines_json() {
        let js = runtime_message(&serde_json::json!({ "type": "ping" }));
        assert!(js.contains("sendMessage({\"type\":\"ping\"})"));
    }

    #[test]
    fn test_envelope_reads_null_and_missing_as_none() {
        let null: Envelope<bool> = serde_json::from_str(r#"{"value":null}"#).expect("parse");
        assert!(null.value.is_none());
        let missing: Envelope<bool> = serde_json::from_str("{}").expect("parse");
        assert!(missing.value.is_none());
        let set: Envelope<bool> = serde_json::from_str(r#"{"value":true}"#).expect("parse");
        assert_eq!(set.value, Some(true));
    }
}
