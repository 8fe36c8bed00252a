//! The desired-state document and proxy state snapshots.

use crate::entity::{Consumer, Entity, EntityKind, Plugin, Route, Service, Target, Upstream};
use serde::{Deserialize, Serialize};

/// A desired-state document: the full configuration the proxy should run.
///
/// Entities reference each other by name. Array order is preserved through
/// conversion and serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(
        rename = "_format_version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub format_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upstreams: Vec<Upstream>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<Target>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<Plugin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumers: Vec<Consumer>,
}

impl Content {
    /// Parses a document from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of entities in the document.
    pub fn entity_count(&self) -> usize {
        self.services.len()
            + self.routes.len()
            + self.upstreams.len()
            + self.targets.len()
            + self.plugins.len()
            + self.consumers.len()
    }
}

/// A snapshot of entities as they exist (or should exist) on the proxy.
///
/// Used both for the live state fetched from the admin API and for the
/// rendered target state handed to the diff engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxyState {
    pub entities: Vec<Entity>,
}

impl ProxyState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity.
    pub fn push(&mut self, entity: impl Into<Entity>) {
        self.entities.push(entity.into());
    }

    /// Number of entities in the snapshot.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the snapshot holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates the entities of one kind.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind() == Some(kind))
    }
}

impl From<&Content> for ProxyState {
    fn from(content: &Content) -> Self {
        let mut state = ProxyState::new();
        state.entities.extend(content.services.iter().cloned().map(Entity::from));
        state.entities.extend(content.routes.iter().cloned().map(Entity::from));
        state.entities.extend(content.upstreams.iter().cloned().map(Entity::from));
        state.entities.extend(content.targets.iter().cloned().map(Entity::from));
        state.entities.extend(content.plugins.iter().cloned().map(Entity::from));
        state.entities.extend(content.consumers.iter().cloned().map(Entity::from));
        state
    }
}
