//! Rendering of update results for the `proxysync` binary.

use proxysync_sendconfig::SendConfigError;
use proxysync_types::{Content, DeclarativeTarget, ResourceError};
use std::fmt::Write;

/// Parses a desired-state document and fingerprints it.
pub fn read_target(json: &str) -> proxysync_types::Result<DeclarativeTarget> {
    DeclarativeTarget::new(Content::from_json(json)?)
}

/// Formats one entity failure as an indented block.
///
/// ```text
/// service svc1 (from default/web)
///     host: required field missing
/// ```
pub fn render_resource_error(err: &ResourceError) -> String {
    let mut out = String::new();
    let kind = if err.kind.is_empty() { "entity" } else { &err.kind };
    let _ = write!(out, "{kind} {}", err.name);
    if let Some(origin) = err.origin() {
        match &origin.namespace {
            Some(ns) => {
                let _ = write!(out, " (from {ns}/{})", origin.name);
            }
            None => {
                let _ = write!(out, " (from {})", origin.name);
            }
        }
    }
    for (field, message) in &err.problems {
        let field = if field.is_empty() { "(entity)" } else { field };
        let _ = write!(out, "\n    {field}: {message}");
    }
    out
}

/// Formats a failed update: the error, each entity failure, and the proxy's
/// raw error body when there was one.
pub fn render_failure(err: &SendConfigError) -> String {
    let mut out = err.to_string();
    for resource in err.resource_errors() {
        out.push_str("\n  ");
        out.push_str(&render_resource_error(resource).replace('\n', "\n  "));
    }
    if let Some(body) = err.raw_error_body().filter(|b| !b.is_empty()) {
        out.push_str("\nraw error body:\n");
        out.push_str(&String::from_utf8_lossy(body));
    }
    out
}
