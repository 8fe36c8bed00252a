//! Whole-state update strategy.
//!
//! Replaces the proxy's entire configuration through its declarative config
//! endpoint in a single call.

use crate::capability::{ConfigService, ContentConverter};
use crate::error::{SendConfigError, SendConfigResult, UpdateCause, UpdateError};
use crate::flattened::parse_flat_entity_errors;
use crate::strategy::{UpdateProtocol, UpdateStrategy};
use async_trait::async_trait;
use proxysync_types::DeclarativeTarget;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pushes the full target to the proxy in one reload.
pub struct WholeStateStrategy {
    config_service: Arc<dyn ConfigService>,
    converter: Arc<dyn ContentConverter>,
}

impl WholeStateStrategy {
    pub fn new(
        config_service: Arc<dyn ConfigService>,
        converter: Arc<dyn ContentConverter>,
    ) -> Self {
        Self {
            config_service,
            converter,
        }
    }
}

#[async_trait]
impl UpdateStrategy for WholeStateStrategy {
    async fn update(&self, target: &DeclarativeTarget) -> SendConfigResult<()> {
        let config = self.converter.convert(target.content());
        let payload = serde_json::to_vec(&config).map_err(SendConfigError::Serialize)?;
        debug!(hash = %target.hash(), bytes = payload.len(), "reloading declarative config");

        let Err(reload) = self
            .config_service
            .reload_declarative_raw_config(payload, true, true)
            .await
        else {
            return Ok(());
        };

        // No response from the proxy, so there is no body to attribute.
        if reload.status.is_none() {
            return Err(UpdateError::new(Vec::new(), UpdateCause::Reload(reload)).into());
        }

        let body = reload.body.clone();
        let err = match parse_flat_entity_errors(&body) {
            Ok(resource_errors) => UpdateError::new(resource_errors, UpdateCause::Reload(reload)),
            Err(parse) => {
                warn!(error = %parse, "could not parse config error body");
                UpdateError::new(Vec::new(), UpdateCause::UnparseableErrorBody { reload, parse })
            }
        };
        Err(err.with_raw_body(body).into())
    }

    fn metrics_protocol(&self) -> UpdateProtocol {
        UpdateProtocol::WholeState
    }

    fn kind(&self) -> &'static str {
        "WholeState"
    }
}
