//! Browser-backed tests for extension discovery and session teardown.

mod helpers;

use exthooks_harness::HarnessError;

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_discovers_fixture_extension() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let (id, entry_url) = test
        .harness
        .run(|ctx| {
            Box::pin(async move { Ok((ctx.extension_id().to_string(), ctx.entry_url())) })
        })
        .await
        .expect("run");

    assert_eq!(id.len(), 32);
    assert!(id.bytes().all(|b| (b'a'..=b'p').contains(&b)));
    assert!(entry_url.starts_with(&format!("chrome-extension://{id}/")));
    assert!(!test.profile_dir().exists());
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_discovery_report_lists_candidates() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let report = test
        .harness
        .run(|ctx| Box::pin(async move { Ok(ctx.discovery().clone()) }))
        .await
        .expect("run");

    assert_eq!(report.attempt, 1);
    assert!(!report.selection.candidates.is_empty());
    assert_eq!(report.selection.id, report.id.as_str());
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_profile_removed_when_closure_fails() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let result: Result<(), _> = test
        .harness
        .run(|_ctx| {
            Box::pin(async {
                Err(HarnessError::Evaluation {
                    context: "test",
                    reason: "closure failed on purpose".into(),
                })
            })
        })
        .await;

    match result {
        Err(HarnessError::Evaluation { reason, .. }) => {
            assert_eq!(reason, "closure failed on purpose");
        }
        other => panic!("closure error should pass through, got {other:?}"),
    }
    assert!(!test.profile_dir().exists());
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_unreachable_management_page_reports_diagnostics() {
    helpers::init_tracing();
    let test = helpers::TestHarness::with(|config| {
        config.discovery.manager_selector = "no-such-manager".into();
        config.discovery.max_attempts = 1;
        config.discovery.manager_timeout_ms = 1_000;
    });

    let err = test
        .harness
        .run(|_ctx| Box::pin(async { Ok(()) }))
        .await
        .expect_err("discovery should fail");

    let diagnostics = err.diagnostics().expect("diagnostics");
    assert!(!diagnostics.manager_present);
    assert!(
        diagnostics
            .page_url
            .as_deref()
            .is_some_and(|u| u.starts_with("chrome://extensions"))
    );
    assert!(!test.profile_dir().exists());
}
