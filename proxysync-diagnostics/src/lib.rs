//! Configuration diff diagnostics.
//!
//! A diff-apply run records, in order, the diff of every entity it changed
//! successfully. At the end of the run the record is sent once to a
//! [`ClientDiagnostic`] sink, keyed by the fingerprint of the target that was
//! applied.

use proxysync_types::ConfigHash;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// The diff applied to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDiff {
    /// Human-readable diff produced by the diff engine.
    pub diff: String,
    /// The action taken on the entity (`create`, `update`, `delete`).
    pub action: String,
}

impl EntityDiff {
    pub fn new(diff: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            diff: diff.into(),
            action: action.into(),
        }
    }
}

/// All entity diffs applied for one target, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub hash: ConfigHash,
    pub entities: Vec<EntityDiff>,
}

impl ConfigDiff {
    /// Creates an empty diff for a target hash.
    pub fn new(hash: ConfigHash) -> Self {
        Self {
            hash,
            entities: Vec::new(),
        }
    }

    /// Appends an entity diff.
    pub fn push(&mut self, entity: EntityDiff) {
        self.entities.push(entity);
    }
}

/// Sink for configuration diffs.
///
/// Cloning is cheap; all clones feed the same receiver.
#[derive(Debug, Clone)]
pub struct ClientDiagnostic {
    diffs: mpsc::Sender<ConfigDiff>,
}

impl ClientDiagnostic {
    /// Wraps an existing sender.
    pub fn new(diffs: mpsc::Sender<ConfigDiff>) -> Self {
        Self { diffs }
    }

    /// Creates a sink and the receiver that collects from it.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<ConfigDiff>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Hands a diff to the collector without waiting.
    ///
    /// A collector that is closed or has no buffer space left loses the diff.
    /// Recording never holds up the run that produced it.
    pub fn record_diff(&self, diff: ConfigDiff) {
        match self.diffs.try_send(diff) {
            Ok(()) => {}
            Err(TrySendError::Full(diff)) => {
                warn!(hash = %diff.hash, "diagnostics collector is full, dropping config diff");
            }
            Err(TrySendError::Closed(diff)) => {
                warn!(hash = %diff.hash, "diagnostics collector closed, dropping config diff");
            }
        }
    }
}
