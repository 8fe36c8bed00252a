//! Consumption of the diff engine's entity event stream.
//!
//! One consumer task runs per diff-apply call, alongside the engine's solve.
//! It owns the call's accumulator and hands the resource errors back through
//! its join handle once it has drained the stream and flushed diagnostics.

use crate::action::EntityAction;
use crate::classify::resource_error_from_action;
use proxysync_diagnostics::{ClientDiagnostic, ConfigDiff, EntityDiff};
use proxysync_types::{ConfigHash, ResourceError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

/// Reads entity events until told to stop or until the stream closes.
///
/// Events are handled strictly in arrival order. On `stop`, events already
/// buffered in the channel are still handled before returning. When a
/// diagnostic sink is given, the diffs of all successful events are sent to it
/// once, keyed by `hash`.
pub async fn handle_events(
    mut events: mpsc::Receiver<EntityAction>,
    mut stop: oneshot::Receiver<()>,
    hash: ConfigHash,
    diagnostic: Option<ClientDiagnostic>,
) -> Vec<ResourceError> {
    let mut run = RunAccumulator::new(hash, diagnostic.is_some());

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => run.record(event),
                None => break,
            },
            _ = &mut stop => {
                while let Ok(event) = events.try_recv() {
                    run.record(event);
                }
                break;
            }
        }
    }

    run.finish(diagnostic)
}

/// Failures and diffs collected during one run.
struct RunAccumulator {
    resource_errors: Vec<ResourceError>,
    diff: Option<ConfigDiff>,
}

impl RunAccumulator {
    fn new(hash: ConfigHash, collect_diffs: bool) -> Self {
        Self {
            resource_errors: Vec::new(),
            diff: collect_diffs.then(|| ConfigDiff::new(hash)),
        }
    }

    fn record(&mut self, event: EntityAction) {
        let action = event.action;
        let entity = &event.entity;

        match &event.error {
            None => {
                debug!(%action, kind = %entity.kind, name = %entity.name, "updated proxy entity");
                if let Some(diff) = &mut self.diff {
                    diff.push(EntityDiff::new(event.diff.clone(), action.as_str()));
                }
            }
            Some(err) => {
                error!(error = %err, %action, kind = %entity.kind, name = %entity.name, "failed updating proxy entity");
                match resource_error_from_action(&event) {
                    Ok(parsed) => self.resource_errors.push(parsed),
                    Err(e) => error!(error = %e, "could not parse entity update error"),
                }
            }
        }
    }

    fn finish(self, diagnostic: Option<ClientDiagnostic>) -> Vec<ResourceError> {
        if let (Some(diagnostic), Some(diff)) = (diagnostic, self.diff) {
            diagnostic.record_diff(diff);
        }
        self.resource_errors
    }
}
