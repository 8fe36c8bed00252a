//! Live-state records as the admin API returns them.

use crate::error::{AdminError, AdminResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Fields holding a `{"id": ..}` reference to another entity.
const REFERENCE_FIELDS: &[&str] = &["service", "route", "consumer", "upstream"];

/// One page of a list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    #[serde(default)]
    pub data: Vec<Value>,
    /// Path of the following page, absent on the last one.
    #[serde(default)]
    pub next: Option<String>,
}

/// Response of the admin API root.
#[derive(Debug, Deserialize)]
pub(crate) struct RootInfo {
    pub version: String,
}

/// Entity ids mapped to the names they are referenced by in documents.
#[derive(Debug, Default)]
pub(crate) struct NameIndex(HashMap<String, String>);

impl NameIndex {
    /// Unnamed entities stay referenced by id.
    pub fn insert(&mut self, id: Option<&str>, name: &str) {
        if let Some(id) = id.filter(|_| !name.is_empty()) {
            self.0.insert(id.to_string(), name.to_string());
        }
    }

    /// Prepares a raw record for typed decoding.
    ///
    /// Null fields are dropped so they take their defaults, and references
    /// collapse to the referenced entity's name, or its id when unknown.
    pub fn normalize(&self, mut record: Value) -> Value {
        let Value::Object(map) = &mut record else {
            return record;
        };
        map.retain(|_, v| !v.is_null());
        for field in REFERENCE_FIELDS {
            let Some(reference) = map.get_mut(*field) else {
                continue;
            };
            if let Some(id) = reference.get("id").and_then(Value::as_str) {
                let resolved = self.0.get(id).cloned().unwrap_or_else(|| id.to_string());
                *reference = Value::String(resolved);
            }
        }
        record
    }

    /// Normalizes and decodes a record of `kind`.
    pub fn decode<T: DeserializeOwned>(&self, kind: &'static str, record: Value) -> AdminResult<T> {
        serde_json::from_value(self.normalize(record))
            .map_err(|source| AdminError::Record { kind, source })
    }
}
