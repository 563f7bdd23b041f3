//! Scoped harness runs.
//!
//! [`ExtensionHarness::run`] launches a session, resolves the extension
//! identifier, hands a [`HarnessContext`] to the caller's closure and shuts
//! the session down afterwards whether the closure succeeded or not.

use futures::future::BoxFuture;
use tracing::{info, instrument};

use exthooks_core::HarnessConfig;

use crate::discovery::{DiscoveryReport, ExtensionId, resolve_extension_id};
use crate::error::HarnessResult;
use crate::readiness::{ReadyPage, await_ready};
use crate::session::BrowserSession;

/// Entry point for harness runs.
#[derive(Debug, Clone)]
pub struct ExtensionHarness {
    config: HarnessConfig,
}

impl ExtensionHarness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Launch, discover, run `f`, and tear down.
    ///
    /// The closure's result is returned as is; teardown never replaces it.
    ///
    /// ```no_run
    /// # use exthooks_harness::{ExtensionHarness, HarnessResult};
    /// # async fn demo(harness: ExtensionHarness) -> HarnessResult<()> {
    /// let id = harness
    ///     .run(|ctx| Box::pin(async move { Ok(ctx.extension_id().clone()) }))
    ///     .await?;
    /// println!("loaded as {id}");
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn run<T, F>(&self, f: F) -> HarnessResult<T>
    where
        F: for<'s> FnOnce(HarnessContext<'s>) -> BoxFuture<'s, HarnessResult<T>>,
    {
        let session = BrowserSession::launch(&self.config).await?;

        let outcome = async {
            let discovery = resolve_extension_id(&session, &self.config).await?;
            let ctx = HarnessContext {
                session: &session,
                config: &self.config,
                discovery,
            };
            f(ctx).await
        }
        .await;

        session.shutdown().await;
        outcome
    }
}

/// What a scoped run can see: the live session, its configuration and the
/// resolved extension identity.
pub struct HarnessContext<'s> {
    session: &'s BrowserSession,
    config: &'s HarnessConfig,
    discovery: DiscoveryReport,
}

impl<'s> HarnessContext<'s> {
    pub fn session(&self) -> &'s BrowserSession {
        self.session
    }

    pub fn config(&self) -> &'s HarnessConfig {
        self.config
    }

    pub fn extension_id(&self) -> &ExtensionId {
        &self.discovery.id
    }

    pub fn discovery(&self) -> &DiscoveryReport {
        &self.discovery
    }

    /// URL of the extension's entry page.
    pub fn entry_url(&self) -> String {
        self.config.extension.entry_url(self.discovery.id.as_str())
    }

    /// Open the entry page in a new tab and wait for its hooks.
    pub async fn open_ready_page(&self) -> HarnessResult<ReadyPage> {
        let url = self.entry_url();
        info!(%url, "Opening extension page");
        let page = self.session.new_page(&url).await?;
        await_ready(page, &url, &self.config.readiness).await
    }
}
