//! Proxy version handling.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A proxy release version.
///
/// State rendering uses it to decide which entity features are legal on the
/// target proxy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProxyVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ProxyVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for ProxyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ProxyVersion {
    type Err = Error;

    /// Parses `major.minor.patch`, ignoring any extra numeric components and
    /// trailing suffixes such as `3.4.1.0-enterprise-edition`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s
            .trim()
            .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u64, Error> {
            match parts.next() {
                Some(p) => p.parse().map_err(|_| Error::InvalidVersion(s.to_string())),
                None if required => Err(Error::InvalidVersion(s.to_string())),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(true)?;
        let patch = next(false)?;
        Ok(Self::new(major, minor, patch))
    }
}
