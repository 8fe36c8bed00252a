//! Entity kinds managed on the proxy.
//!
//! Each kind is a plain serde struct matching the proxy's declarative format.
//! [`Entity`] is the closed union over them; the diff engine reports the
//! snapshots it processed as `Entity` values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Uniform access to the identity and tags of an entity.
///
/// Every kind that can be attributed back to its source object implements
/// this. Kinds the proxy does not tag return `None` from [`tags`].
///
/// [`tags`]: TaggedEntity::tags
pub trait TaggedEntity {
    /// The entity kind.
    fn kind(&self) -> EntityKind;

    /// The name the proxy knows the entity by.
    fn name(&self) -> &str;

    /// The entity's tags, or `None` for kinds that carry no tags.
    fn tags(&self) -> Option<&[String]>;
}

/// The kinds of entity the proxy understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Service,
    Route,
    Upstream,
    Target,
    Plugin,
    Consumer,
    License,
}

impl EntityKind {
    /// Returns the kind's name as used by the admin API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Route => "route",
            Self::Upstream => "upstream",
            Self::Target => "target",
            Self::Plugin => "plugin",
            Self::Consumer => "consumer",
            Self::License => "license",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An upstream service the proxy forwards traffic to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// May be empty for entities created without a name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A matching rule that routes requests to a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Name of the service this route forwards to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strip_path: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A virtual hostname load-balanced over targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A backend address belonging to an upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of the owning upstream.
    pub upstream: String,
    /// `host:port` of the backend.
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A plugin instance, optionally scoped to a service, route or consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub config: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// An API consumer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// May be empty for consumers identified only by `custom_id`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A license installed on the proxy. Licenses carry no tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub payload: String,
}

impl TaggedEntity for Service {
    fn kind(&self) -> EntityKind {
        EntityKind::Service
    }

    fn name(&self) -> &str {
        name_or(&self.name, [self.id.as_deref()])
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for Route {
    fn kind(&self) -> EntityKind {
        EntityKind::Route
    }

    fn name(&self) -> &str {
        name_or(&self.name, [self.id.as_deref()])
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for Upstream {
    fn kind(&self) -> EntityKind {
        EntityKind::Upstream
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for Target {
    fn kind(&self) -> EntityKind {
        EntityKind::Target
    }

    fn name(&self) -> &str {
        &self.target
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for Plugin {
    fn kind(&self) -> EntityKind {
        EntityKind::Plugin
    }

    /// Named instances are reported by instance name, others by plugin name.
    fn name(&self) -> &str {
        self.instance_name.as_deref().unwrap_or(&self.name)
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for Consumer {
    fn kind(&self) -> EntityKind {
        EntityKind::Consumer
    }

    /// Falls back to `custom_id`, then `id`, for consumers without a username.
    fn name(&self) -> &str {
        name_or(&self.username, [self.custom_id.as_deref(), self.id.as_deref()])
    }

    fn tags(&self) -> Option<&[String]> {
        Some(&self.tags)
    }
}

impl TaggedEntity for License {
    fn kind(&self) -> EntityKind {
        EntityKind::License
    }

    fn name(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    fn tags(&self) -> Option<&[String]> {
        None
    }
}

/// `name` if set, else the first non-empty fallback, else `""`.
fn name_or<'a, const N: usize>(name: &'a str, fallbacks: [Option<&'a str>; N]) -> &'a str {
    if !name.is_empty() {
        return name;
    }
    fallbacks
        .into_iter()
        .flatten()
        .find(|f| !f.is_empty())
        .unwrap_or_default()
}

/// Any entity the diff engine may process.
///
/// `Other` holds a raw JSON record for kinds outside this union, so that an
/// engine handling more kinds than we model can still report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Entity {
    Service(Service),
    Route(Route),
    Upstream(Upstream),
    Target(Target),
    Plugin(Plugin),
    Consumer(Consumer),
    License(License),
    Other(serde_json::Value),
}

impl Entity {
    /// Returns the typed view of this entity, or `None` for `Other`.
    pub fn as_tagged(&self) -> Option<&dyn TaggedEntity> {
        match self {
            Self::Service(e) => Some(e),
            Self::Route(e) => Some(e),
            Self::Upstream(e) => Some(e),
            Self::Target(e) => Some(e),
            Self::Plugin(e) => Some(e),
            Self::Consumer(e) => Some(e),
            Self::License(e) => Some(e),
            Self::Other(_) => None,
        }
    }

    /// Returns the entity kind, or `None` for `Other`.
    pub fn kind(&self) -> Option<EntityKind> {
        self.as_tagged().map(|e| e.kind())
    }
}

impl From<Service> for Entity {
    fn from(e: Service) -> Self {
        Self::Service(e)
    }
}

impl From<Route> for Entity {
    fn from(e: Route) -> Self {
        Self::Route(e)
    }
}

impl From<Upstream> for Entity {
    fn from(e: Upstream) -> Self {
        Self::Upstream(e)
    }
}

impl From<Target> for Entity {
    fn from(e: Target) -> Self {
        Self::Target(e)
    }
}

impl From<Plugin> for Entity {
    fn from(e: Plugin) -> Self {
        Self::Plugin(e)
    }
}

impl From<Consumer> for Entity {
    fn from(e: Consumer) -> Self {
        Self::Consumer(e)
    }
}

impl From<License> for Entity {
    fn from(e: License) -> Self {
        Self::License(e)
    }
}
