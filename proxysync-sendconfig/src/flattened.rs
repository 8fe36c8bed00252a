//! Parsing of the proxy's flattened config error body.
//!
//! When a whole-state reload is rejected with `flatten_errors` set, the proxy
//! answers with a body like:
//!
//! ```json
//! {"code": 14, "message": "declarative config is invalid",
//!  "flattened_errors": [{"entity_name": "svc1", "entity_type": "service",
//!    "entity_tags": ["t1"], "errors": [{"field": "host", "message": "required"}]}]}
//! ```

use proxysync_types::ResourceError;
use serde::Deserialize;
use tracing::warn;

/// Top-level error body of a rejected reload.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "flattened_errors")]
    pub flattened: Vec<FlatEntityError>,
}

/// Errors for one rejected entity.
#[derive(Debug, Default, Deserialize)]
pub struct FlatEntityError {
    #[serde(default, rename = "entity_name")]
    pub name: Option<String>,
    #[serde(default, rename = "entity_id")]
    pub id: Option<String>,
    #[serde(default, rename = "entity_type")]
    pub kind: Option<String>,
    #[serde(default, rename = "entity_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub errors: Vec<FlatFieldError>,
}

/// One problem with a rejected entity.
#[derive(Debug, Default, Deserialize)]
pub struct FlatFieldError {
    /// Field path. Absent for entity-level errors.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Per-element messages for array fields.
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub error_type: Option<String>,
}

/// Parses a rejected reload's body into per-entity resource errors.
///
/// A body that is not a JSON error document fails. A valid document without
/// flattened errors yields an empty list.
pub fn parse_flat_entity_errors(body: &[u8]) -> Result<Vec<ResourceError>, serde_json::Error> {
    let body: ConfigErrorBody = serde_json::from_slice(body)?;
    Ok(body.flattened.into_iter().map(resource_error_from_flat).collect())
}

fn resource_error_from_flat(entity: FlatEntityError) -> ResourceError {
    let mut err = ResourceError::new(
        entity.name.unwrap_or_default(),
        entity.kind.unwrap_or_default(),
    );
    err.tags = entity.tags.unwrap_or_default();

    for problem in entity.errors {
        let field = problem.field.unwrap_or_default();
        let message = problem.message.filter(|m| !m.is_empty());
        let messages = problem.messages.filter(|m| !m.is_empty());

        if message.is_some() && messages.is_some() {
            warn!(
                entity = %err.name,
                field = %field,
                "entity error carries both message and messages, keeping both"
            );
        }
        if let Some(message) = message {
            err.problems.insert(field.clone(), message);
        }
        for (i, message) in messages.into_iter().flatten().enumerate() {
            if !message.is_empty() {
                err.problems.insert(format!("{field}[{i}]"), message);
            }
        }
    }

    err
}
