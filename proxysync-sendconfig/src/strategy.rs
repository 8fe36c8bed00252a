//! The update strategy contract.

use crate::error::SendConfigResult;
use async_trait::async_trait;
use proxysync_types::DeclarativeTarget;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which protocol a strategy uses to update the proxy, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateProtocol {
    /// The whole configuration is replaced in one call.
    WholeState,
    /// An entity-level diff is computed and applied.
    DiffApply,
}

impl UpdateProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WholeState => "whole-state",
            Self::DiffApply => "diff-apply",
        }
    }
}

impl fmt::Display for UpdateProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applies a desired-state target to the proxy.
///
/// Each call is a single best-effort attempt. On failure the error carries
/// the per-entity [`ResourceError`]s that could be attributed and, when the
/// proxy returned one, the raw error body.
///
/// [`ResourceError`]: proxysync_types::ResourceError
#[async_trait]
pub trait UpdateStrategy: Send + Sync {
    async fn update(&self, target: &DeclarativeTarget) -> SendConfigResult<()>;

    /// The protocol tag reported to metrics.
    fn metrics_protocol(&self) -> UpdateProtocol;

    /// Human-readable strategy name for logs.
    fn kind(&self) -> &'static str;
}
