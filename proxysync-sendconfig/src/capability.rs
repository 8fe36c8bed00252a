//! Collaborators the update strategies depend on.
//!
//! The admin API transport, state rendering and the diff engine live outside
//! this crate. Each is reached through a trait here so strategies can be
//! driven by any implementation (see [`crate::mock`] for test doubles).

use crate::action::EntityAction;
use crate::convert::DbLessConfig;
use crate::error::{ApplyError, BoxError, ReloadError};
use async_trait::async_trait;
use proxysync_types::{Content, ProxyState, ProxyVersion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Converts a desired-state document into the proxy's declarative payload.
///
/// Conversion must be deterministic: identical documents give identical
/// payloads, which lets the proxy short-circuit on the config hash.
pub trait ContentConverter: Send + Sync {
    fn convert(&self, content: &Content) -> DbLessConfig;
}

/// Replaces the proxy's whole configuration in one call.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Posts a serialized declarative config.
    ///
    /// With `check_hash` the proxy skips the reload when the config is
    /// unchanged. With `flatten_errors` a rejection reports per-entity errors
    /// in the body of the returned [`ReloadError`].
    async fn reload_declarative_raw_config(
        &self,
        config: Vec<u8>,
        check_hash: bool,
        flatten_errors: bool,
    ) -> Result<(), ReloadError>;
}

/// Which entities to read when fetching live state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Only fetch entities carrying all of these tags.
    #[serde(default)]
    pub select_tags: Vec<String>,
    /// Leave consumers out of the snapshot.
    #[serde(default)]
    pub skip_consumers: bool,
}

/// Reads the live state of the proxy.
#[async_trait]
pub trait StateFetcher: Send + Sync {
    /// Base URL of the admin API, used in error messages.
    fn base_root_url(&self) -> &str;

    async fn fetch_state(&self, options: &FetchOptions) -> Result<ProxyState, BoxError>;
}

/// Renders a desired-state document against the live state.
#[async_trait]
pub trait StateRenderer: Send + Sync {
    /// Fails when the document cannot be reconciled with what exists.
    async fn render(
        &self,
        content: &Content,
        current: &ProxyState,
        version: &ProxyVersion,
    ) -> Result<ProxyState, BoxError>;
}

/// Settings for one diff-engine run.
#[derive(Debug, Clone)]
pub struct SyncerOptions {
    pub current_state: Arc<ProxyState>,
    pub target_state: Arc<ProxyState>,
    pub concurrency: usize,
    pub silence_warnings: bool,
    pub cloud_hosted: bool,
    pub include_licenses: bool,
    pub enable_entity_actions: bool,
}

/// A diff engine instance bound to one current/target pair.
#[async_trait]
pub trait Syncer: Send {
    /// Computes and applies the diff, returning the run's global errors.
    ///
    /// Entities applied successfully stay applied even when errors are
    /// returned.
    async fn solve(&mut self, concurrency: usize) -> Vec<ApplyError>;
}

/// A syncer together with the stream of entity events it emits.
pub struct SyncRun {
    pub syncer: Box<dyn Syncer>,
    pub events: mpsc::Receiver<EntityAction>,
}

/// Builds diff engine instances.
pub trait SyncerFactory: Send + Sync {
    fn new_syncer(&self, options: SyncerOptions) -> Result<SyncRun, ApplyError>;
}
