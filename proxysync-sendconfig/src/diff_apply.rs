//! Diff-apply update strategy.
//!
//! Fetches the live state, renders the target against it and drives a diff
//! engine that applies entity-level changes. The engine's per-entity events
//! are consumed concurrently with its solve; failed events are classified
//! into resource errors and reported with the run's verdict.

use crate::capability::{
    FetchOptions, StateFetcher, StateRenderer, SyncRun, SyncerFactory, SyncerOptions,
};
use crate::error::{
    ApplyError, ApplyErrors, SendConfigError, SendConfigResult, UpdateCause, UpdateError,
};
use crate::events::handle_events;
use crate::strategy::{UpdateProtocol, UpdateStrategy};
use async_trait::async_trait;
use proxysync_diagnostics::ClientDiagnostic;
use proxysync_types::{DeclarativeTarget, ProxyVersion, ResourceError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Default number of concurrent entity operations.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Configuration for the diff-apply strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffApplyConfig {
    /// Which entities to read from the live state.
    #[serde(default)]
    pub fetch: FetchOptions,
    /// Version of the target proxy.
    #[serde(default)]
    pub version: ProxyVersion,
    /// Bound on concurrent entity operations.
    pub concurrency: usize,
}

impl Default for DiffApplyConfig {
    fn default() -> Self {
        Self {
            fetch: FetchOptions::default(),
            version: ProxyVersion::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Applies the target as an entity-level diff against live state.
pub struct DiffApplyStrategy {
    fetcher: Arc<dyn StateFetcher>,
    renderer: Arc<dyn StateRenderer>,
    syncers: Arc<dyn SyncerFactory>,
    config: DiffApplyConfig,
    diagnostic: Option<ClientDiagnostic>,
    cloud_hosted: bool,
}

impl DiffApplyStrategy {
    /// Creates a strategy for a directly managed proxy.
    pub fn new(
        fetcher: Arc<dyn StateFetcher>,
        renderer: Arc<dyn StateRenderer>,
        syncers: Arc<dyn SyncerFactory>,
        config: DiffApplyConfig,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            syncers,
            config,
            diagnostic: None,
            cloud_hosted: false,
        }
    }

    /// Creates a strategy for a cloud-hosted control plane.
    pub fn new_cloud_hosted(
        fetcher: Arc<dyn StateFetcher>,
        renderer: Arc<dyn StateRenderer>,
        syncers: Arc<dyn SyncerFactory>,
        config: DiffApplyConfig,
    ) -> Self {
        Self {
            cloud_hosted: true,
            ..Self::new(fetcher, renderer, syncers, config)
        }
    }

    /// Sends each run's config diff to `diagnostic`. A diff that does not fit
    /// in its buffer is dropped rather than delaying the run.
    pub fn with_diagnostic(mut self, diagnostic: ClientDiagnostic) -> Self {
        self.diagnostic = Some(diagnostic);
        self
    }

    pub fn config(&self) -> &DiffApplyConfig {
        &self.config
    }

    pub fn is_cloud_hosted(&self) -> bool {
        self.cloud_hosted
    }

    /// The diff sink for a run, if diffs are collected.
    ///
    /// A cloud-hosted control plane may apply entities differently from how
    /// they were diffed, so its diffs are never recorded.
    fn diff_sink(&self) -> Option<ClientDiagnostic> {
        if self.cloud_hosted {
            return None;
        }
        self.diagnostic.clone()
    }
}

#[async_trait]
impl UpdateStrategy for DiffApplyStrategy {
    async fn update(&self, target: &DeclarativeTarget) -> SendConfigResult<()> {
        let url = self.fetcher.base_root_url();

        let current = self
            .fetcher
            .fetch_state(&self.config.fetch)
            .await
            .map_err(|source| SendConfigError::CurrentState {
                url: url.to_string(),
                source,
            })?;

        let rendered = self
            .renderer
            .render(target.content(), &current, &self.config.version)
            .await
            .map_err(SendConfigError::Conflict)?;

        let SyncRun { mut syncer, events } = self
            .syncers
            .new_syncer(SyncerOptions {
                current_state: Arc::new(current),
                target_state: Arc::new(rendered),
                concurrency: self.config.concurrency,
                silence_warnings: true,
                cloud_hosted: self.cloud_hosted,
                include_licenses: true,
                enable_entity_actions: true,
            })
            .map_err(|source| SendConfigError::Syncer {
                url: url.to_string(),
                source,
            })?;

        debug!(hash = %target.hash(), %url, "applying config diff");
        let (stop_tx, stop_rx) = oneshot::channel();
        let consumer = tokio::spawn(handle_events(
            events,
            stop_rx,
            target.hash().clone(),
            self.diff_sink(),
        ));

        let errors = syncer.solve(self.config.concurrency).await;
        // The consumer may already have exited on a closed stream.
        let _ = stop_tx.send(());
        let resource_errors = consumer.await?;

        info!(
            hash = %target.hash(),
            global_errors = errors.len(),
            resource_errors = resource_errors.len(),
            "config diff applied"
        );
        aggregate(errors, resource_errors)
    }

    fn metrics_protocol(&self) -> UpdateProtocol {
        UpdateProtocol::DiffApply
    }

    fn kind(&self) -> &'static str {
        "DiffApply"
    }
}

/// Combines a run's global errors and resource errors into its verdict.
fn aggregate(errors: Vec<ApplyError>, resource_errors: Vec<ResourceError>) -> SendConfigResult<()> {
    if !errors.is_empty() {
        return Err(UpdateError::new(resource_errors, UpdateCause::Apply(ApplyErrors(errors))).into());
    }
    // The engine reports a global error whenever an entity fails; this covers
    // engines that do not.
    if !resource_errors.is_empty() {
        return Err(UpdateError::new(resource_errors, UpdateCause::ResourceErrors).into());
    }
    Ok(())
}
