//! Update strategies that apply desired state to a proxy control plane.
//!
//! Two interchangeable strategies implement [`UpdateStrategy`]:
//! - [`WholeStateStrategy`] replaces the proxy's full configuration in one
//!   reload call
//! - [`DiffApplyStrategy`] diffs the target against live state and applies
//!   entity-level changes through a diff engine
//!
//! Both report entity failures in the same shape, [`ResourceError`], so
//! callers can render failures uniformly regardless of which strategy ran.
//!
//! # Diff-apply runs
//!
//! 1. **Fetch**: read the live state from the admin API
//! 2. **Render**: render the target against it (failure is a conflict)
//! 3. **Solve**: drive the diff engine while a consumer task reads its
//!    per-entity events
//! 4. **Join**: stop the consumer, wait for it to drain, and aggregate
//!
//! # Example
//!
//! ```
//! use proxysync_sendconfig::mock::MockConfigService;
//! use proxysync_sendconfig::{DefaultContentConverter, UpdateStrategy, WholeStateStrategy};
//! use proxysync_types::{Content, DeclarativeTarget};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let service = Arc::new(MockConfigService::accepting());
//! let strategy = WholeStateStrategy::new(service.clone(), Arc::new(DefaultContentConverter));
//!
//! let target = DeclarativeTarget::new(Content::default()).unwrap();
//! strategy.update(&target).await.unwrap();
//! assert_eq!(service.payloads().len(), 1);
//! # });
//! ```
//!
//! [`ResourceError`]: proxysync_types::ResourceError

pub mod action;
pub mod capability;
mod classify;
mod convert;
mod diff_apply;
mod error;
pub mod events;
mod flattened;
pub mod mock;
mod strategy;
mod whole_state;

pub use action::{ActionEntity, EntityAction, ReconcileAction};
pub use capability::{
    ConfigService, ContentConverter, FetchOptions, StateFetcher, StateRenderer, SyncRun, Syncer,
    SyncerFactory, SyncerOptions,
};
pub use classify::resource_error_from_action;
pub use convert::{DbLessConfig, DefaultContentConverter, DECLARATIVE_FORMAT_VERSION};
pub use diff_apply::{DiffApplyConfig, DiffApplyStrategy, DEFAULT_CONCURRENCY};
pub use error::{
    ApplyError, ApplyErrors, BoxError, ClassifyError, ReloadError, SendConfigError,
    SendConfigResult, UpdateCause, UpdateError,
};
pub use events::handle_events;
pub use flattened::{parse_flat_entity_errors, ConfigErrorBody, FlatEntityError, FlatFieldError};
pub use strategy::{UpdateProtocol, UpdateStrategy};
pub use whole_state::WholeStateStrategy;
