//! Classification of failed entity events into resource errors.

use crate::action::EntityAction;
use crate::error::ClassifyError;
use proxysync_types::{Entity, ResourceError};
use serde_json::Value;
use std::collections::BTreeMap;

/// Turns a failed entity event into a [`ResourceError`].
///
/// Tags come from the event's new snapshot, or the old one for deletes. The
/// diff engine's error text is unstructured, so it is reported as a single
/// whole-entity problem under the empty field path.
pub fn resource_error_from_action(event: &EntityAction) -> Result<ResourceError, ClassifyError> {
    let kind = &event.entity.kind;
    let name = &event.entity.name;

    let error = event.error.as_ref().ok_or_else(|| ClassifyError::NoError {
        kind: kind.clone(),
        name: name.clone(),
    })?;
    let subject = event.entity.subject().ok_or_else(|| ClassifyError::NoSnapshot {
        kind: kind.clone(),
        name: name.clone(),
    })?;

    let tags = match subject {
        Entity::Other(value) => tags_from_record(kind, name, value)?,
        typed => typed
            .as_tagged()
            .and_then(|e| e.tags())
            .map(<[String]>::to_vec)
            .ok_or_else(|| ClassifyError::MissingTags {
                kind: kind.clone(),
                name: name.clone(),
            })?,
    };

    Ok(ResourceError {
        name: name.clone(),
        kind: kind.clone(),
        tags,
        problems: BTreeMap::from([(String::new(), error.to_string())]),
    })
}

/// Reads the tags of an entity kind we have no typed model for.
fn tags_from_record(kind: &str, name: &str, value: &Value) -> Result<Vec<String>, ClassifyError> {
    let record = value.as_object().ok_or_else(|| ClassifyError::NotARecord {
        kind: kind.to_string(),
        name: name.to_string(),
        shape: json_shape(value),
    })?;

    let tags = match record.get("tags") {
        None | Some(Value::Null) => {
            return Err(ClassifyError::MissingTags {
                kind: kind.to_string(),
                name: name.to_string(),
            });
        }
        Some(tags) => tags,
    };

    let invalid = || ClassifyError::InvalidTags {
        kind: kind.to_string(),
        name: name.to_string(),
    };
    let items = tags.as_array().ok_or_else(invalid)?;

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(tag) => out.push(tag.clone()),
            Value::Null => {}
            _ => return Err(invalid()),
        }
    }
    Ok(out)
}

fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
