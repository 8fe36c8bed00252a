//! Per-entity events emitted by the diff engine.

use crate::error::ApplyError;
use proxysync_types::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The action the diff engine took on an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    Create,
    Update,
    Delete,
}

impl ReconcileAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity an action was taken on.
///
/// Creates carry only `new`, deletes only `old`, updates both.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionEntity {
    pub name: String,
    pub kind: String,
    pub old: Option<Entity>,
    pub new: Option<Entity>,
}

impl ActionEntity {
    /// The snapshot describing the entity: `new` when present, else `old`.
    pub fn subject(&self) -> Option<&Entity> {
        self.new.as_ref().or(self.old.as_ref())
    }
}

/// One entity processed during a diff-apply run.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAction {
    pub action: ReconcileAction,
    pub entity: ActionEntity,
    /// Human-readable diff of the change.
    pub diff: String,
    /// The error the proxy returned for this entity, if any.
    pub error: Option<ApplyError>,
}

impl EntityAction {
    /// Builds an event, naming the entity after its snapshot.
    pub fn new(
        action: ReconcileAction,
        old: Option<Entity>,
        new: Option<Entity>,
        diff: impl Into<String>,
    ) -> Self {
        let (kind, name) = new
            .as_ref()
            .or(old.as_ref())
            .and_then(Entity::as_tagged)
            .map(|e| (e.kind().to_string(), e.name().to_string()))
            .unwrap_or_else(|| ("unknown".to_string(), String::new()));

        Self {
            action,
            entity: ActionEntity {
                name,
                kind,
                old,
                new,
            },
            diff: diff.into(),
            error: None,
        }
    }

    pub fn created(entity: impl Into<Entity>, diff: impl Into<String>) -> Self {
        Self::new(ReconcileAction::Create, None, Some(entity.into()), diff)
    }

    pub fn updated(
        old: impl Into<Entity>,
        new: impl Into<Entity>,
        diff: impl Into<String>,
    ) -> Self {
        Self::new(
            ReconcileAction::Update,
            Some(old.into()),
            Some(new.into()),
            diff,
        )
    }

    pub fn deleted(entity: impl Into<Entity>, diff: impl Into<String>) -> Self {
        Self::new(ReconcileAction::Delete, Some(entity.into()), None, diff)
    }

    /// Overrides the reported kind and name.
    pub fn named(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.entity.kind = kind.into();
        self.entity.name = name.into();
        self
    }

    /// Marks the event as failed.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(ApplyError::new(error));
        self
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
