//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update APIs over the `items` collection.
//! - Own the ordered `item_events` reference list and its expansion.
//!
//! # Invariants
//! - Write paths call `ItemFields::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - An event id is appended only while the event row exists.
//! - References are returned in append order (`position ASC`).

use crate::model::event::{Event, EventId};
use crate::model::item::{Item, ItemFields, ItemId, NewItem};
use crate::repo::event_repo::read_event_columns;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    color,
    price,
    reference_data
FROM items";

/// Repository interface for item records and their event references.
pub trait ItemRepository {
    /// Inserts a new item with a store-generated id.
    fn create_item(&self, item: &NewItem) -> RepoResult<Item>;
    /// Lists all items in insertion order.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Gets one item by id.
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Replaces `name`, `color` and `price`; keeps reference data and events.
    fn update_item(&self, id: ItemId, fields: &ItemFields) -> RepoResult<Item>;
    /// Appends one event reference and returns the updated item.
    fn append_event(&self, item_id: ItemId, event_id: EventId) -> RepoResult<Item>;
    /// Expands an item's references into full event records.
    fn list_item_events(&self, item_id: ItemId) -> RepoResult<Vec<Event>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn immediate_transaction(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &NewItem) -> RepoResult<Item> {
        item.fields.validate()?;

        let record = Item {
            id: Uuid::new_v4(),
            name: item.fields.name.clone(),
            color: item.fields.color.clone(),
            price: item.fields.price,
            reference_data: item.reference_data.clone(),
            events: Vec::new(),
        };
        let reference_data = encode_reference_data(record.reference_data.as_ref())?;

        self.conn.execute(
            "INSERT INTO items (
                uuid,
                name,
                color,
                price,
                reference_data
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.color.as_deref(),
                record.price,
                reference_data,
            ],
        )?;

        Ok(record)
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        let mut refs = load_all_event_refs(self.conn)?;

        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            let mut item = parse_item_row(row)?;
            item.events = refs.remove(&item.id).unwrap_or_default();
            items.push(item);
        }

        Ok(items)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        load_item(self.conn, id)
    }

    fn update_item(&self, id: ItemId, fields: &ItemFields) -> RepoResult<Item> {
        fields.validate()?;

        let tx = self.immediate_transaction()?;
        let changed = tx.execute(
            "UPDATE items
             SET
                name = ?2,
                color = ?3,
                price = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                fields.name.as_str(),
                fields.color.as_deref(),
                fields.price,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }

        let item = load_item(&tx, id)?.ok_or(RepoError::ItemNotFound(id))?;
        tx.commit()?;
        Ok(item)
    }

    fn append_event(&self, item_id: ItemId, event_id: EventId) -> RepoResult<Item> {
        let tx = self.immediate_transaction()?;

        if !row_exists(&tx, "SELECT 1 FROM items WHERE uuid = ?1;", item_id)? {
            return Err(RepoError::ItemNotFound(item_id));
        }
        if !row_exists(&tx, "SELECT 1 FROM events WHERE uuid = ?1;", event_id)? {
            return Err(RepoError::EventNotFound(event_id));
        }

        tx.execute(
            "INSERT INTO item_events (item_uuid, position, event_uuid)
             SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2
             FROM item_events
             WHERE item_uuid = ?1;",
            params![item_id.to_string(), event_id.to_string()],
        )?;
        tx.execute(
            "UPDATE items
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [item_id.to_string()],
        )?;

        let item = load_item(&tx, item_id)?.ok_or(RepoError::ItemNotFound(item_id))?;
        tx.commit()?;
        Ok(item)
    }

    fn list_item_events(&self, item_id: ItemId) -> RepoResult<Vec<Event>> {
        if !row_exists(self.conn, "SELECT 1 FROM items WHERE uuid = ?1;", item_id)? {
            return Err(RepoError::ItemNotFound(item_id));
        }

        let mut stmt = self.conn.prepare(
            "SELECT
                ie.event_uuid AS ref_uuid,
                e.uuid AS uuid,
                e.location AS location,
                e.custodian AS custodian,
                e.timestamp AS timestamp
             FROM item_events ie
             LEFT JOIN events e ON e.uuid = ie.event_uuid
             WHERE ie.item_uuid = ?1
             ORDER BY ie.position ASC;",
        )?;
        let mut rows = stmt.query([item_id.to_string()])?;
        let mut events = Vec::new();

        while let Some(row) = rows.next()? {
            if row.get::<_, Option<String>>("uuid")?.is_none() {
                let ref_uuid: String = row.get("ref_uuid")?;
                warn!(
                    "event=item_events_expand module=repo status=dangling item_id={} event_id={}",
                    item_id, ref_uuid
                );
                continue;
            }
            events.push(read_event_columns(row)?.into_event()?);
        }

        Ok(events)
    }
}

fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };

    let mut item = parse_item_row(row)?;
    item.events = load_event_refs(conn, id)?;
    Ok(Some(item))
}

fn load_event_refs(conn: &Connection, item_id: ItemId) -> RepoResult<Vec<EventId>> {
    let mut stmt = conn.prepare(
        "SELECT event_uuid
         FROM item_events
         WHERE item_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([item_id.to_string()])?;
    let mut refs = Vec::new();

    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        refs.push(parse_uuid(&text, "item_events.event_uuid")?);
    }

    Ok(refs)
}

fn load_all_event_refs(conn: &Connection) -> RepoResult<HashMap<ItemId, Vec<EventId>>> {
    let mut stmt = conn.prepare(
        "SELECT item_uuid, event_uuid
         FROM item_events
         ORDER BY item_uuid ASC, position ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut refs: HashMap<ItemId, Vec<EventId>> = HashMap::new();

    while let Some(row) = rows.next()? {
        let item_text: String = row.get(0)?;
        let event_text: String = row.get(1)?;
        let item_id = parse_uuid(&item_text, "item_events.item_uuid")?;
        let event_id = parse_uuid(&event_text, "item_events.event_uuid")?;
        refs.entry(item_id).or_default().push(event_id);
    }

    Ok(refs)
}

fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> RepoResult<bool> {
    let found = conn
        .query_row(sql, [id.to_string()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "items.uuid")?;

    let reference_data = match row.get::<_, Option<String>>("reference_data")? {
        Some(raw) => Some(serde_json::from_str::<Value>(&raw).map_err(|err| {
            RepoError::InvalidData(format!("invalid json in items.reference_data: {err}"))
        })?),
        None => None,
    };

    let item = Item {
        id,
        name: row.get("name")?,
        color: row.get("color")?,
        price: row.get("price")?,
        reference_data,
        events: Vec::new(),
    };
    item.validate()?;
    Ok(item)
}

fn encode_reference_data(value: Option<&Value>) -> RepoResult<Option<String>> {
    value
        .map(|value| {
            serde_json::to_string(value).map_err(|err| {
                RepoError::InvalidData(format!("reference data is not serializable: {err}"))
            })
        })
        .transpose()
}
