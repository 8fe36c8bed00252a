//! Admin API error types.

use thiserror::Error;

/// Result type for admin API operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Errors that can occur talking to the proxy admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} returned {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        body: String,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unexpected {kind} record: {source}")]
    Record {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid proxy version: {0}")]
    Version(#[from] proxysync_types::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl AdminError {
    /// Returns the HTTP status if the admin API answered with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdminError::Status { status, .. } => Some(*status),
            AdminError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
