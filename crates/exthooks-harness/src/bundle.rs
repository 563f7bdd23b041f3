//! Build artifact verification.
//!
//! The harness loads an unpacked extension from disk. Before any browser is
//! started, the bundle directory must hold every required file and a
//! readable manifest; otherwise the run fails immediately with the full list
//! of what is missing.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{HarnessError, HarnessResult};

/// The manifest fields the harness reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    pub manifest_version: u32,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A bundle that passed verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedBundle {
    /// Canonical absolute path of the bundle directory.
    pub dir: PathBuf,
    /// Parsed `manifest.json`.
    pub manifest: ExtensionManifest,
    /// Required files that were checked.
    pub files: Vec<String>,
}

/// Check that `dir` contains every entry of `required`, then parse the
/// manifest.
///
/// A directory that does not exist counts as every file missing; one that
/// exists but cannot be listed is an IO error.
pub async fn verify_bundle(dir: &Path, required: &[String]) -> HarnessResult<VerifiedBundle> {
    let present = list_files(dir).await?;
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !present.contains(name.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(HarnessError::MissingArtifacts {
            dir: dir.to_path_buf(),
            missing,
        });
    }

    let manifest_path = dir.join("manifest.json");
    let raw = tokio::fs::read(&manifest_path)
        .await
        .map_err(|e| HarnessError::InvalidManifest {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
    let manifest: ExtensionManifest =
        serde_json::from_slice(&raw).map_err(|e| HarnessError::InvalidManifest {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;

    let dir = tokio::fs::canonicalize(dir).await?;
    info!(
        dir = %dir.display(),
        name = %manifest.name,
        version = %manifest.version,
        "Extension bundle verified"
    );

    Ok(VerifiedBundle {
        dir,
        manifest,
        files: required.to_vec(),
    })
}

/// Names of the entries in `dir`. A directory that does not exist has none;
/// any other read failure is an error rather than a list of missing files.
async fn list_files(dir: &Path) -> HarnessResult<HashSet<String>> {
    let mut names = HashSet::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Bundle directory does not exist");
            return Ok(names);
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Bundle directory not readable");
            return Err(e.into());
        }
    };
    while let Some(entry) = entries.next_entry().await.inspect_err(|e| {
        warn!(dir = %dir.display(), error = %e, "Failed to list bundle directory");
    })? {
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required() -> Vec<String> {
        ["manifest.json", "index.html", "content.js", "background.js"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    const MANIFEST: &str = r#"{
        "manifest_version": 3,
        "name": "Hooks Fixture",
        "version": "0.1.0",
        "permissions": ["storage", "tabs"]
    }"#;

    #[tokio::test]
    async fn test_complete_bundle_verifies() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("write");
        for name in ["index.html", "content.js", "background.js"] {
            std::fs::write(temp.path().join(name), "").expect("write");
        }

        let bundle = verify_bundle(temp.path(), &required()).await.expect("verify");
        assert_eq!(bundle.manifest.name, "Hooks Fixture");
        assert_eq!(bundle.manifest.manifest_version, 3);
        assert_eq!(bundle.manifest.permissions, vec!["storage", "tabs"]);
        assert!(bundle.dir.is_absolute());
    }

    #[tokio::test]
    async fn test_missing_files_are_all_named() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("manifest.json"), MANIFEST).expect("write");
        std::fs::write(temp.path().join("index.html"), "").expect("write");

        match verify_bundle(temp.path(), &required()).await {
            Err(HarnessError::MissingArtifacts { missing, .. }) => {
                assert_eq!(missing, vec!["content.js", "background.js"]);
            }
            other => panic!("expected missing artifacts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_directory_is_not_reported_as_missing_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let not_a_dir = temp.path().join("dist");
        std::fs::write(&not_a_dir, "").expect("write");

        match verify_bundle(&not_a_dir, &required()).await {
            Err(HarnessError::Io(_)) => {}
            other => panic!("expected an IO error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonexistent_directory_reports_every_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("dist");
        match verify_bundle(&dir, &required()).await {
            Err(HarnessError::MissingArtifacts { missing, dir: reported }) => {
                assert_eq!(missing.len(), 4);
                assert_eq!(reported, dir);
            }
            other => panic!("expected missing artifacts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_manifest() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("manifest.json"), "{ not json").expect("write");
        let only_manifest = vec!["manifest.json".to_string()];
        assert!(matches!(
            verify_bundle(temp.path(), &only_manifest).await,
            Err(HarnessError::InvalidManifest { .. })
        ));
    }
}
