//! Browser-backed tests for readiness and the hook surface of the fixture
//! extension.

mod helpers;

use serde_json::json;

use exthooks_harness::readiness::ReadinessStep;
use exthooks_harness::script;
use exthooks_harness::{CreateTab, HooksStatus, ReadinessProbe, Scenario, run_suite};

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_entry_page_becomes_ready() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let (status, steps) = test
        .harness
        .run(|ctx| {
            Box::pin(async move {
                let page = ctx.open_ready_page().await?;
                let status = page.status().clone();
                let steps: Vec<_> = page.steps().iter().map(|s| s.step).collect();
                page.close().await?;
                Ok((status, steps))
            })
        })
        .await
        .expect("run");

    assert!(status.has_storage);
    assert!(status.has_tabs);
    assert!(status.is_ready);
    assert_eq!(
        steps,
        vec![
            ReadinessStep::RootMounted,
            ReadinessStep::ContainerMounted,
            ReadinessStep::HooksReady
        ]
    );
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_storage_value_reads_back() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let stored = test
        .harness
        .run(|ctx| {
            Box::pin(async move {
                let page = ctx.open_ready_page().await?;
                let hooks = page.hooks();
                assert!(hooks.storage_set(&json!({ "count": 7 })).await?);

                let mut data = None;
                for _ in 0..50 {
                    data = hooks.storage_data().await?;
                    if data.is_some() {
                        break;
                    }
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                }
                page.close().await?;
                Ok(data)
            })
        })
        .await
        .expect("run");

    assert_eq!(stored, Some(json!({ "count": 7 })));
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_created_tab_can_be_closed() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let (created, closed) = test
        .harness
        .run(|ctx| {
            Box::pin(async move {
                let page = ctx.open_ready_page().await?;
                let hooks = page.hooks();
                let created = hooks
                    .create_tab(&CreateTab {
                        url: "about:blank".into(),
                        active: false,
                    })
                    .await?;
                let closed = match created.as_ref().and_then(|t| t.id) {
                    Some(id) => hooks.close_tab(id).await?,
                    None => false,
                };
                page.close().await?;
                Ok((created, closed))
            })
        })
        .await
        .expect("run");

    let created = created.expect("createTab returned a tab");
    assert!(created.id.is_some());
    assert!(!created.active);
    assert!(closed);
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_background_worker_answers() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let ack = test
        .harness
        .run(|ctx| {
            Box::pin(async move {
                let page = ctx.open_ready_page().await?;
                let ack = page.hooks().ping_background().await;
                page.close().await?;
                ack
            })
        })
        .await
        .expect("run");

    assert!(ack.initialized);
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_full_suite_passes() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    let report = test
        .harness
        .run(|ctx| Box::pin(async move { Ok(run_suite(&ctx, &Scenario::ALL).await) }))
        .await
        .expect("run");

    for outcome in &report.outcomes {
        assert!(outcome.passed, "{} failed: {}", outcome.scenario, outcome.detail);
    }
    assert_eq!(report.outcomes.len(), Scenario::ALL.len());
    assert!(!test.profile_dir().exists());
}

#[tokio::test]
#[ignore = "requires a local Chromium and a display"]
async fn test_readiness_signal_needs_attribute_and_global() {
    helpers::init_tracing();
    let test = helpers::TestHarness::new();

    // (ready attribute, global published)
    let cases = [("true", false), ("false", true), ("true", true)];

    let observed = test
        .harness
        .run(move |ctx| {
            Box::pin(async move {
                let readiness = &ctx.config().readiness;
                let page = ctx.session().new_page("about:blank").await?;
                let mut observed = Vec::new();

                for (attribute, published) in cases {
                    let setup = format!(
                        "(() => {{ const c = document.createElement('div'); c.id = 'hooks-container'; \
                         document.body.replaceChildren(c); \
                         document.querySelector({container}).setAttribute({attr}, {value}); \
                         if ({published}) {{ window[{global}] = {{ storage: {{}}, tabs: {{}} }}; }} \
                         else {{ delete window[{global}]; }} return {{}}; }})()",
                        container = script::js_str(&readiness.container_selector),
                        attr = script::js_str(&readiness.ready_attribute),
                        value = script::js_str(attribute),
                        global = script::js_str(&readiness.global_name),
                    );
                    let _: serde_json::Value = script::eval(&page, "test setup", setup).await?;

                    let probe: ReadinessProbe = script::eval(
                        &page,
                        "readiness probe",
                        script::readiness_probe(
                            &readiness.container_selector,
                            &readiness.ready_attribute,
                            &readiness.global_name,
                        ),
                    )
                    .await?;
                    let status: HooksStatus = script::eval(
                        &page,
                        "hooks status",
                        script::hooks_status(
                            &readiness.container_selector,
                            &readiness.ready_attribute,
                            &readiness.global_name,
                        ),
                    )
                    .await?;
                    observed.push((probe.is_ready(), status.is_ready, status.has_storage));
                }

                page.close().await?;
                Ok(observed)
            })
        })
        .await
        .expect("run");

    assert_eq!(
        observed,
        vec![(false, true, false), (false, false, true), (true, true, true)]
    );
}
