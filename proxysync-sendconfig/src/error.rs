//! Error types for configuration updates.

use proxysync_types::ResourceError;
use std::fmt;
use thiserror::Error;

/// Result type for update operations.
pub type SendConfigResult<T> = Result<T, SendConfigError>;

/// Boxed error returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while applying a target to the proxy.
#[derive(Debug, Error)]
pub enum SendConfigError {
    /// The converted payload could not be serialized.
    #[error("constructing proxy configuration: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The live state could not be fetched.
    #[error("failed getting current state for {url}: {source}")]
    CurrentState {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The target cannot be rendered against the live state.
    #[error("configuration conflicts with current proxy state: {0}")]
    Conflict(#[source] BoxError),

    /// The diff engine could not be set up.
    #[error("creating a new syncer for {url}: {source}")]
    Syncer {
        url: String,
        #[source]
        source: ApplyError,
    },

    /// The entity event consumer did not finish.
    #[error("entity event handler failed: {0}")]
    EventHandler(#[from] tokio::task::JoinError),

    /// The proxy rejected some or all of the configuration.
    #[error(transparent)]
    Update(#[from] UpdateError),
}

impl SendConfigError {
    /// Whether the target conflicts with the live state. Callers typically
    /// respond to a conflict with a full resync rather than a plain retry.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Per-entity failures, empty for errors without entity detail.
    pub fn resource_errors(&self) -> &[ResourceError] {
        match self {
            Self::Update(e) => e.resource_errors(),
            _ => &[],
        }
    }

    /// The raw error body returned by the proxy, if any.
    pub fn raw_error_body(&self) -> Option<&[u8]> {
        match self {
            Self::Update(e) => e.raw_body(),
            _ => None,
        }
    }
}

/// Terminal report of a failed update.
///
/// Carries the underlying cause together with every entity failure that could
/// be attributed, so a run that partially succeeded still reports which
/// entities were rejected.
#[derive(Debug, Error)]
#[error("configuration update failed ({count} entity errors): {cause}", count = .resource_errors.len())]
pub struct UpdateError {
    resource_errors: Vec<ResourceError>,
    #[source]
    cause: UpdateCause,
    raw_body: Option<Vec<u8>>,
}

impl UpdateError {
    pub fn new(resource_errors: Vec<ResourceError>, cause: UpdateCause) -> Self {
        Self {
            resource_errors,
            cause,
            raw_body: None,
        }
    }

    /// Attaches the proxy's raw error body.
    pub fn with_raw_body(mut self, body: Vec<u8>) -> Self {
        self.raw_body = Some(body);
        self
    }

    pub fn resource_errors(&self) -> &[ResourceError] {
        &self.resource_errors
    }

    pub fn into_resource_errors(self) -> Vec<ResourceError> {
        self.resource_errors
    }

    pub fn cause(&self) -> &UpdateCause {
        &self.cause
    }

    pub fn raw_body(&self) -> Option<&[u8]> {
        self.raw_body.as_deref()
    }
}

/// The underlying reason an update failed.
#[derive(Debug, Error)]
pub enum UpdateCause {
    /// The proxy rejected a whole-state reload.
    #[error(transparent)]
    Reload(ReloadError),

    /// The proxy rejected a reload and its error body could not be parsed.
    #[error("failed to parse config error: {reload}: {parse}")]
    UnparseableErrorBody {
        reload: ReloadError,
        #[source]
        parse: serde_json::Error,
    },

    /// The diff engine reported global errors.
    #[error(transparent)]
    Apply(ApplyErrors),

    /// The diff engine reported entity failures without a global error.
    #[error("diff engine found resource errors")]
    ResourceErrors,
}

/// A whole-state reload failure.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ReloadError {
    pub message: String,
    /// HTTP status, absent for transport failures.
    pub status: Option<u16>,
    /// Raw response body, empty when the proxy returned none.
    pub body: Vec<u8>,
}

impl ReloadError {
    /// A failure with no response from the proxy.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            body: Vec::new(),
        }
    }

    /// A failure response from the proxy.
    pub fn rejected(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            message: format!("HTTP status {status}"),
            status: Some(status),
            body: body.into(),
        }
    }
}

/// An error reported by the diff engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ApplyError(String);

impl ApplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// The global errors of one diff-engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyErrors(pub Vec<ApplyError>);

impl fmt::Display for ApplyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} errors occurred:", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n\t{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApplyErrors {}

/// Why an entity event could not be turned into a [`ResourceError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("entity {kind}/{name} carries no error")]
    NoError { kind: String, name: String },

    #[error("entity {kind}/{name} has neither an old nor a new snapshot")]
    NoSnapshot { kind: String, name: String },

    #[error("entity {kind}/{name} is {shape}, not a record")]
    NotARecord {
        kind: String,
        name: String,
        shape: &'static str,
    },

    #[error("entity {kind}/{name} lacks a tags field")]
    MissingTags { kind: String, name: String },

    #[error("entity {kind}/{name} tags field is not a list of strings")]
    InvalidTags { kind: String, name: String },
}
