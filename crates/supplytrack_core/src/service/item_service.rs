//! Item/event use-case service.
//!
//! # Responsibility
//! - Run the validate -> persist pipeline for every item/event operation.
//! - Collapse repository errors into validation / not-found / storage.
//!
//! # Invariants
//! - Payloads are validated before any repository call.
//! - There is no cross-record transaction: an event created for an unknown
//!   item stays persisted as an orphan.
//! - Service layer remains storage-agnostic.

use crate::model::event::Event;
use crate::model::item::{Item, ItemId, NewItem};
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::item_repo::{ItemRepository, SqliteItemRepository};
use crate::repo::RepoError;
use crate::schema::{self, SchemaError};
use log::warn;
use rusqlite::Connection;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome taxonomy exposed to callers of the service.
#[derive(Debug)]
pub enum ServiceError {
    /// Payload failed shape or field checks; carries every violation.
    Validation(Vec<String>),
    /// The addressed item does not exist.
    ItemNotFound(ItemId),
    /// Store unreachable, write/read failure or corrupt persisted data.
    Storage(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(violations) => {
                write!(f, "validation failed: {}", violations.join("; "))
            }
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Validation(_) | Self::ItemNotFound(_) => None,
        }
    }
}

impl From<SchemaError> for ServiceError {
    fn from(value: SchemaError) -> Self {
        Self::Validation(value.violations)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(vec![err.to_string()]),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Service over the SQLite repositories sharing one connection.
pub type SqliteItemService<'conn> =
    ItemService<SqliteItemRepository<'conn>, SqliteEventRepository<'conn>>;

/// Use-case service for items and their events.
pub struct ItemService<I: ItemRepository, E: EventRepository> {
    items: I,
    events: E,
}

impl<'conn> SqliteItemService<'conn> {
    /// Builds the service on a migrated/ready connection.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteItemRepository::new(conn),
            SqliteEventRepository::new(conn),
        )
    }
}

impl<I: ItemRepository, E: EventRepository> ItemService<I, E> {
    /// Creates a service using the provided repository implementations.
    pub fn new(items: I, events: E) -> Self {
        Self { items, events }
    }

    /// Validates an item payload and persists it.
    pub fn create_item(&self, payload: &Value) -> ServiceResult<Item> {
        let fields = schema::validate_item(payload)?;
        self.insert_item(&NewItem::from(fields))
    }

    /// Persists an already typed item, including optional reference data.
    pub fn insert_item(&self, item: &NewItem) -> ServiceResult<Item> {
        Ok(self.items.create_item(item)?)
    }

    /// Lists every item.
    pub fn list_items(&self) -> ServiceResult<Vec<Item>> {
        Ok(self.items.list_items()?)
    }

    /// Gets one item, failing with `ItemNotFound` when absent.
    pub fn get_item(&self, id: ItemId) -> ServiceResult<Item> {
        self.items
            .get_item(id)?
            .ok_or(ServiceError::ItemNotFound(id))
    }

    /// Validates an item payload and replaces the item's mutable fields.
    ///
    /// # Contract
    /// - Optional fields missing from the payload are cleared.
    /// - Reference data and event references are kept.
    pub fn update_item(&self, id: ItemId, payload: &Value) -> ServiceResult<Item> {
        let fields = schema::validate_item(payload)?;
        Ok(self.items.update_item(id, &fields)?)
    }

    /// Validates an event payload, persists the event and links it.
    ///
    /// # Contract
    /// - The event is written before the item lookup.
    /// - `ItemNotFound` leaves the event stored without any referencing item.
    pub fn add_event(&self, item_id: ItemId, payload: &Value) -> ServiceResult<Item> {
        let new_event = schema::validate_event(payload)?;
        let event = self.events.create_event(&new_event)?;

        match self.items.append_event(item_id, event.id) {
            Ok(item) => Ok(item),
            Err(RepoError::ItemNotFound(id)) => {
                warn!(
                    "event=event_append module=service status=orphaned item_id={} event_id={}",
                    id, event.id
                );
                Err(ServiceError::ItemNotFound(id))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the full event records referenced by an item, in append order.
    pub fn list_item_events(&self, item_id: ItemId) -> ServiceResult<Vec<Event>> {
        Ok(self.items.list_item_events(item_id)?)
    }
}
