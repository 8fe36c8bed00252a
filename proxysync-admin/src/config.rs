//! Admin client configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for one proxy admin API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Root URL of the admin API (e.g. `http://localhost:8001`).
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Header carrying the admin token.
    pub token_header: String,
    /// Admin token, if the API requires one.
    pub token: Option<String>,
    /// Page size for list requests.
    pub page_size: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 30,
            token_header: "Kong-Admin-Token".to_string(),
            token: None,
            page_size: 1000,
        }
    }
}

impl AdminConfig {
    /// Settings for `base_url` with everything else defaulted.
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}
