//! Admin API client for proxysync.
//!
//! [`AdminClient`] talks to a proxy's admin API over HTTP. It pushes
//! declarative configuration for the whole-state strategy and reads live
//! entities for the diff-apply strategy.

mod client;
mod config;
mod error;
mod records;

pub use client::AdminClient;
pub use config::AdminConfig;
pub use error::{AdminError, AdminResult};
