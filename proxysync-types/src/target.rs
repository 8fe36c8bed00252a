//! Desired-state snapshots paired with their content fingerprint.

use crate::content::Content;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Fingerprint of one desired-state document.
///
/// A hash identifies exactly one synchronization attempt; it keys the
/// diagnostics diff recorded for that attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigHash(String);

impl ConfigHash {
    /// Wraps an already computed fingerprint.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Computes the lowercase hex SHA-256 of the document's JSON form.
    pub fn of(content: &Content) -> crate::Result<Self> {
        let bytes = serde_json::to_vec(content)?;
        Ok(Self(hex::encode(Sha256::digest(&bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConfigHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An immutable desired-state document and its fingerprint.
///
/// Produced once per reconciliation attempt and handed to an update strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarativeTarget {
    content: Content,
    hash: ConfigHash,
}

impl DeclarativeTarget {
    /// Creates a target, fingerprinting the content.
    pub fn new(content: Content) -> crate::Result<Self> {
        let hash = ConfigHash::of(&content)?;
        Ok(Self { content, hash })
    }

    /// Creates a target with a fingerprint computed elsewhere.
    pub fn with_hash(content: Content, hash: impl Into<ConfigHash>) -> Self {
        Self {
            content,
            hash: hash.into(),
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn hash(&self) -> &ConfigHash {
        &self.hash
    }
}
