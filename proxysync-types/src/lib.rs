//! Core type definitions for proxysync.
//!
//! This crate defines the data shared by every update strategy:
//! - The desired-state document and its entity kinds
//! - `DeclarativeTarget`, the document paired with its content fingerprint
//! - `ResourceError`, the normalized per-entity failure record
//! - `ProxyVersion`, the proxy version handed to state rendering
//!
//! Entities are a closed union over the kinds the proxy understands. Every
//! typed kind implements [`TaggedEntity`], so failure attribution never has to
//! guess at the shape of an entity.

mod content;
mod entity;
mod resource_error;
mod target;
mod version;

pub use content::{Content, ProxyState};
pub use entity::{
    Consumer, Entity, EntityKind, License, Plugin, Route, Service, TaggedEntity, Target, Upstream,
};
pub use resource_error::{OriginRef, ResourceError};
pub use target::{ConfigHash, DeclarativeTarget};
pub use version::ProxyVersion;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid proxy version: {0}")]
    InvalidVersion(String),
}
