//! Harness-specific error types.

use std::path::PathBuf;

use chromiumoxide::error::CdpError;
use exthooks_core::error::{AppError, ErrorKind};
use exthooks_dom::{ExtensionCandidate, SelectionError, SelectorError};
use serde::Serialize;
use thiserror::Error;

use crate::readiness::ReadinessStep;

/// Result alias for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Errors that can occur while driving the browser under test.
#[derive(Debug, Error)]
pub enum HarnessError {
    // --- Bundle ---
    #[error("Extension bundle at {} is missing required files: {}", .dir.display(), .missing.join(", "))]
    MissingArtifacts { dir: PathBuf, missing: Vec<String> },

    #[error("Invalid manifest at {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Invalid selector in configuration: {0}")]
    InvalidSelector(#[from] SelectorError),

    // --- Browser ---
    #[error("Failed to build browser configuration: {0}")]
    LaunchConfig(String),

    #[error("Failed to launch browser: {0}")]
    Launch(#[source] CdpError),

    #[error("DevTools error: {0}")]
    Browser(#[from] CdpError),

    #[error("Browser session already shut down")]
    SessionClosed,

    #[error("Script evaluation failed ({context}): {reason}")]
    Evaluation { context: &'static str, reason: String },

    // --- Discovery ---
    #[error("Extension discovery attempt {attempt} failed: {failure}")]
    Discovery {
        attempt: u32,
        failure: DiscoveryFailure,
        diagnostics: Box<DiscoveryDiagnostics>,
    },

    // --- Readiness ---
    #[error("Timed out after {timeout_ms}ms waiting for {step}{}", last_error_suffix(.last_error))]
    ReadinessTimeout {
        step: ReadinessStep,
        timeout_ms: u64,
        last_error: Option<String>,
    },

    // --- Hooks and scenarios ---
    #[error("Hook call '{operation}' failed: {reason}")]
    HookCall {
        operation: &'static str,
        reason: String,
    },

    #[error("Scenario '{scenario}' failed: {detail}")]
    Assertion {
        scenario: &'static str,
        detail: String,
    },

    // --- Generic ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_deref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

/// Why a single discovery attempt failed.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryFailure {
    #[error("management page element '{selector}' did not appear")]
    ManagerNotLoaded { selector: String },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("extension page {url} did not load: {reason}")]
    VerificationFailed { url: String, reason: String },

    #[error("{0}")]
    Protocol(String),
}

/// Page state captured when a discovery attempt fails.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryDiagnostics {
    /// URL the management tab was on.
    pub page_url: Option<String>,
    /// Whether the manager element was present.
    pub manager_present: bool,
    /// Whether the manager element hosted a shadow root.
    pub manager_shadow_root: bool,
    /// Entries seen before the failure, if the snapshot got that far.
    pub candidates: Vec<ExtensionCandidate>,
    /// Serialized page HTML, when capture is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_html: Option<String>,
}

impl HarnessError {
    /// The workspace error category for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArtifacts { .. }
            | Self::InvalidManifest { .. }
            | Self::InvalidSelector(_) => ErrorKind::Configuration,
            Self::LaunchConfig(_) | Self::Launch(_) | Self::Browser(_) | Self::SessionClosed => {
                ErrorKind::Browser
            }
            Self::Evaluation { .. } | Self::HookCall { .. } => ErrorKind::HookCall,
            Self::Discovery { .. } => ErrorKind::Discovery,
            Self::ReadinessTimeout { .. } => ErrorKind::Timeout,
            Self::Assertion { .. } => ErrorKind::Assertion,
            Self::Io(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Serialization,
        }
    }

    /// Diagnostics attached to a discovery failure.
    pub fn diagnostics(&self) -> Option<&DiscoveryDiagnostics> {
        match self {
            Self::Discovery { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }

    pub(crate) fn hook_call(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::HookCall {
            operation,
            reason: reason.into(),
        }
    }

    pub(crate) fn assertion(scenario: &'static str, detail: impl Into<String>) -> Self {
        Self::Assertion {
            scenario,
            detail: detail.into(),
        }
    }
}

impl From<HarnessError> for AppError {
    fn from(err: HarnessError) -> Self {
        let kind = err.kind();
        AppError::with_source(kind, err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifacts_names_every_file() {
        let err = HarnessError::MissingArtifacts {
            dir: PathBuf::from("dist"),
            missing: vec!["manifest.json".into(), "content.js".into()],
        };
        let message = err.to_string();
        assert!(message.contains("manifest.json"));
        assert!(message.contains("content.js"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_readiness_timeout_names_step_and_last_error() {
        let err = HarnessError::ReadinessTimeout {
            step: ReadinessStep::HooksReady,
            timeout_ms: 30000,
            last_error: Some("Execution context was destroyed".into()),
        };
        let message = err.to_string();
        assert!(message.contains("30000ms"));
        assert!(message.contains(&ReadinessStep::HooksReady.to_string()));
        assert!(message.contains("Execution context was destroyed"));

        let quiet = HarnessError::ReadinessTimeout {
            step: ReadinessStep::RootMounted,
            timeout_ms: 10,
            last_error: None,
        };
        assert!(!quiet.to_string().contains("last error"));
    }

    #[test]
    fn test_discovery_error_converts_to_discovery_kind() {
        let err = HarnessError::Discovery {
            attempt: 3,
            failure: DiscoveryFailure::Selection(SelectionError::NoItems {
                selector: "extensions-item".into(),
            }),
            diagnostics: Box::new(DiscoveryDiagnostics {
                manager_present: true,
                manager_shadow_root: true,
                ..Default::default()
            }),
        };
        assert!(err.diagnostics().is_some_and(|d| d.manager_present));

        let app: AppError = err.into();
        assert_eq!(app.kind, ErrorKind::Discovery);
        assert!(app.is_transient());
        assert!(app.message.contains("attempt 3"));
    }
}
