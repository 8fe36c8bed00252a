//! The normalized per-entity failure record.
//!
//! Both update strategies report entity failures as [`ResourceError`]s: the
//! whole-state path parses them from the proxy's flattened error body, the
//! diff-apply path derives them from the diff engine's entity events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ORIGIN_KIND_TAG: &str = "origin-kind:";
const ORIGIN_NAMESPACE_TAG: &str = "origin-namespace:";
const ORIGIN_NAME_TAG: &str = "origin-name:";
const ORIGIN_UID_TAG: &str = "origin-uid:";

/// A failure attributed to one proxy entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceError {
    /// Name of the failed entity.
    pub name: String,
    /// Kind of the failed entity. Empty when the proxy did not report one.
    #[serde(default)]
    pub kind: String,
    /// The entity's tags, in their original order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Field path to message. The empty path refers to the whole entity.
    #[serde(default)]
    pub problems: BTreeMap<String, String>,
}

impl ResourceError {
    /// Creates an error with no tags and no problems.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Adds a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds a problem for a field path.
    pub fn with_problem(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.problems.insert(field.into(), message.into());
        self
    }

    /// Attributes the entity back to the object it was generated from.
    ///
    /// Reads the `origin-*:` tags. Returns `None` when there is no
    /// `origin-name:` tag.
    pub fn origin(&self) -> Option<OriginRef> {
        let mut origin = OriginRef::default();
        let mut named = false;
        for tag in &self.tags {
            if let Some(v) = tag.strip_prefix(ORIGIN_NAME_TAG) {
                origin.name = v.to_string();
                named = true;
            } else if let Some(v) = tag.strip_prefix(ORIGIN_KIND_TAG) {
                origin.kind = Some(v.to_string());
            } else if let Some(v) = tag.strip_prefix(ORIGIN_NAMESPACE_TAG) {
                origin.namespace = Some(v.to_string());
            } else if let Some(v) = tag.strip_prefix(ORIGIN_UID_TAG) {
                origin.uid = Some(v.to_string());
            }
        }
        named.then_some(origin)
    }
}

/// Reference to the source object an entity was generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRef {
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub uid: Option<String>,
}
