//! Core domain logic for SupplyTrack.
//! This crate is the single source of truth for item/event invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;
pub mod service;

pub use logging::{default_log_level, flush_logs, init_logging, logging_status};
pub use model::event::{Event, EventId, NewEvent};
pub use model::item::{Item, ItemFields, ItemId, ItemValidationError, NewItem};
pub use repo::event_repo::{EventRepository, SqliteEventRepository};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::{RepoError, RepoResult};
pub use schema::{validate_event, validate_item, SchemaError};
pub use service::item_service::{ItemService, ServiceError, ServiceResult, SqliteItemService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
