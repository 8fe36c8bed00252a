//! In-memory collaborators for driving the strategies in tests.

use crate::action::EntityAction;
use crate::capability::{
    ConfigService, FetchOptions, StateFetcher, StateRenderer, SyncRun, Syncer, SyncerFactory,
    SyncerOptions,
};
use crate::error::{ApplyError, BoxError, ReloadError};
use async_trait::async_trait;
use proxysync_types::{Content, ProxyState, ProxyVersion};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// A config service that records every payload it receives.
#[derive(Debug, Default)]
pub struct MockConfigService {
    payloads: Mutex<Vec<Vec<u8>>>,
    flags: Mutex<Vec<(bool, bool)>>,
    failure: Option<ReloadError>,
}

impl MockConfigService {
    /// A service that accepts every reload.
    pub fn accepting() -> Self {
        Self::default()
    }

    /// A service that rejects every reload with `failure`.
    pub fn rejecting(failure: ReloadError) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    /// Payloads received so far.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().unwrap().clone()
    }

    /// `(check_hash, flatten_errors)` of each reload.
    pub fn flags(&self) -> Vec<(bool, bool)> {
        self.flags.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigService for MockConfigService {
    async fn reload_declarative_raw_config(
        &self,
        config: Vec<u8>,
        check_hash: bool,
        flatten_errors: bool,
    ) -> Result<(), ReloadError> {
        self.payloads.lock().unwrap().push(config);
        self.flags.lock().unwrap().push((check_hash, flatten_errors));
        match &self.failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

/// A state fetcher returning a fixed snapshot, or failing.
#[derive(Debug, Default)]
pub struct MockStateFetcher {
    state: ProxyState,
    failure: Option<String>,
    requests: Mutex<Vec<FetchOptions>>,
}

impl MockStateFetcher {
    pub fn new(state: ProxyState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Options of each fetch so far.
    pub fn requests(&self) -> Vec<FetchOptions> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateFetcher for MockStateFetcher {
    fn base_root_url(&self) -> &str {
        "http://mock-admin:8001"
    }

    async fn fetch_state(&self, options: &FetchOptions) -> Result<ProxyState, BoxError> {
        self.requests.lock().unwrap().push(options.clone());
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.state.clone()),
        }
    }
}

/// A renderer that turns the document into state verbatim, or fails.
#[derive(Debug, Default)]
pub struct MockRenderer {
    failure: Option<String>,
    versions: Mutex<Vec<ProxyVersion>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Proxy versions passed to each render.
    pub fn versions(&self) -> Vec<ProxyVersion> {
        self.versions.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateRenderer for MockRenderer {
    async fn render(
        &self,
        content: &Content,
        _current: &ProxyState,
        version: &ProxyVersion,
    ) -> Result<ProxyState, BoxError> {
        self.versions.lock().unwrap().push(*version);
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(ProxyState::from(content)),
        }
    }
}

/// Builds syncers that emit a fixed script of events and errors.
#[derive(Debug, Default)]
pub struct ScriptedSyncerFactory {
    events: Vec<EntityAction>,
    errors: Vec<ApplyError>,
    failure: Option<ApplyError>,
    options: Mutex<Vec<SyncerOptions>>,
}

impl ScriptedSyncerFactory {
    /// Syncers that emit `events` during solve and then return `errors`.
    pub fn new(events: Vec<EntityAction>, errors: Vec<ApplyError>) -> Self {
        Self {
            events,
            errors,
            ..Default::default()
        }
    }

    /// A factory that cannot construct a syncer.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(ApplyError::new(message)),
            ..Default::default()
        }
    }

    /// Options each syncer was built with.
    pub fn options(&self) -> Vec<SyncerOptions> {
        self.options.lock().unwrap().clone()
    }
}

impl SyncerFactory for ScriptedSyncerFactory {
    fn new_syncer(&self, options: SyncerOptions) -> Result<SyncRun, ApplyError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        self.options.lock().unwrap().push(options);

        let (tx, events) = mpsc::channel(8);
        let syncer = ScriptedSyncer {
            tx,
            events: self.events.clone(),
            errors: self.errors.clone(),
        };
        Ok(SyncRun {
            syncer: Box::new(syncer),
            events,
        })
    }
}

/// A syncer replaying a script.
#[derive(Debug)]
pub struct ScriptedSyncer {
    tx: mpsc::Sender<EntityAction>,
    events: Vec<EntityAction>,
    errors: Vec<ApplyError>,
}

#[async_trait]
impl Syncer for ScriptedSyncer {
    async fn solve(&mut self, _concurrency: usize) -> Vec<ApplyError> {
        for event in self.events.drain(..) {
            if self.tx.send(event).await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
        self.errors.clone()
    }
}
