//! Integration tests for bundle verification and launch preconditions.
//!
//! None of these start a browser: a bad bundle must be rejected first.

mod helpers;

use exthooks_core::error::{AppError, ErrorKind};
use exthooks_harness::bundle::verify_bundle;
use exthooks_harness::{BrowserSession, HarnessError};

#[tokio::test]
async fn test_fixture_bundle_is_complete() {
    let config = exthooks_core::HarnessConfig::default();
    let bundle = verify_bundle(&helpers::fixture_bundle(), &config.extension.required_files)
        .await
        .expect("fixture bundle");

    assert_eq!(bundle.manifest.manifest_version, 3);
    assert_eq!(bundle.manifest.name, "ExtHooks Fixture");
    assert!(bundle.manifest.permissions.contains(&"storage".to_string()));
    assert!(bundle.manifest.permissions.contains(&"tabs".to_string()));
}

#[tokio::test]
async fn test_launch_fails_fast_on_incomplete_bundle() {
    let empty = tempfile::tempdir().expect("tempdir");
    std::fs::write(empty.path().join("manifest.json"), "{}").expect("write");

    let test = helpers::TestHarness::with(|config| {
        config.extension.bundle_dir = empty.path().to_path_buf();
    });

    let err = match BrowserSession::launch(test.config()).await {
        Ok(_) => panic!("launch should fail before starting a browser"),
        Err(e) => e,
    };
    match &err {
        HarnessError::MissingArtifacts { missing, .. } => {
            assert_eq!(missing, &["index.html", "content.js", "background.js"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!test.profile_dir().exists());

    let app: AppError = err.into();
    assert_eq!(app.kind, ErrorKind::Configuration);
}

#[tokio::test]
async fn test_harness_run_never_calls_closure_without_bundle() {
    let test = helpers::TestHarness::with(|config| {
        config.extension.bundle_dir = "does/not/exist".into();
    });

    let mut called = false;
    let result = test
        .harness
        .run(|_ctx| {
            called = true;
            Box::pin(async { Ok(()) })
        })
        .await;

    assert!(matches!(result, Err(HarnessError::MissingArtifacts { .. })));
    assert!(!called);
}
