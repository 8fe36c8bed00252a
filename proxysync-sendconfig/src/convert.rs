//! Conversion of desired-state documents into declarative proxy payloads.

use crate::capability::ContentConverter;
use proxysync_types::Content;
use serde::{Deserialize, Serialize};

/// Declarative format version written into every payload.
pub const DECLARATIVE_FORMAT_VERSION: &str = "3.0";

/// The payload accepted by the proxy's whole-state config endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbLessConfig {
    #[serde(rename = "_format_version")]
    pub format_version: String,
    #[serde(flatten)]
    pub content: Content,
}

/// Copies the document into a payload at [`DECLARATIVE_FORMAT_VERSION`].
///
/// Entity order is kept as-is and empty collections are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContentConverter;

impl ContentConverter for DefaultContentConverter {
    fn convert(&self, content: &Content) -> DbLessConfig {
        let mut content = content.clone();
        // The payload's own version field replaces the document's.
        content.format_version = None;
        DbLessConfig {
            format_version: DECLARATIVE_FORMAT_VERSION.to_string(),
            content,
        }
    }
}
