//! Event repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert immutable event records into the `events` collection.
//! - Decode event rows for both direct reads and item expansion.
//!
//! # Invariants
//! - Event ids are generated here, never taken from callers.
//! - Missing timestamps default to insertion time.
//! - Timestamps are stored as epoch milliseconds.

use crate::model::event::{to_storage_precision, Event, EventId, NewEvent};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    location,
    custodian,
    timestamp
FROM events";

/// Repository interface for event records.
pub trait EventRepository {
    /// Inserts a new event and returns the stored record.
    fn create_event(&self, event: &NewEvent) -> RepoResult<Event>;
    /// Gets one event by id.
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn create_event(&self, event: &NewEvent) -> RepoResult<Event> {
        let requested = event.timestamp.unwrap_or_else(Utc::now);
        let timestamp = to_storage_precision(requested).ok_or_else(|| {
            RepoError::InvalidData(format!("event timestamp `{requested}` is out of range"))
        })?;

        let record = Event {
            id: Uuid::new_v4(),
            location: event.location.clone(),
            custodian: event.custodian.clone(),
            timestamp,
        };

        self.conn.execute(
            "INSERT INTO events (uuid, location, custodian, timestamp)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.id.to_string(),
                record.location.as_str(),
                record.custodian.as_str(),
                record.timestamp.timestamp_millis(),
            ],
        )?;

        Ok(record)
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let row = stmt
            .query_row([id.to_string()], |row| Ok(read_event_columns(row)))
            .optional()?;

        row.map(|columns| columns.and_then(EventColumns::into_event))
            .transpose()
    }
}

/// Raw event columns as read from any query exposing the event column names.
pub(crate) struct EventColumns {
    uuid: String,
    location: String,
    custodian: String,
    timestamp: i64,
}

impl EventColumns {
    pub(crate) fn into_event(self) -> RepoResult<Event> {
        let id = parse_uuid(&self.uuid, "events.uuid")?;
        let timestamp = DateTime::from_timestamp_millis(self.timestamp).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{}` in events.timestamp",
                self.timestamp
            ))
        })?;

        Ok(Event {
            id,
            location: self.location,
            custodian: self.custodian,
            timestamp,
        })
    }
}

pub(crate) fn read_event_columns(row: &Row<'_>) -> RepoResult<EventColumns> {
    Ok(EventColumns {
        uuid: row.get("uuid")?,
        location: row.get("location")?,
        custodian: row.get("custodian")?,
        timestamp: row.get("timestamp")?,
    })
}
