//! Payload schema validation.
//!
//! # Responsibility
//! - Check incoming JSON against the closed item and event shapes.
//! - Convert conforming payloads into typed creation/update inputs.
//!
//! # Invariants
//! - Validation is pure and runs before any persistence attempt.
//! - A failure always carries at least one human-readable violation.

pub mod shape;

use crate::model::event::NewEvent;
use crate::model::item::ItemFields;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use shape::{FieldKind, FieldSpec, Shape, EVENT_SHAPE, ITEM_SHAPE};

/// Ordered list of shape violations for one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub shape: &'static str,
    pub violations: Vec<String>,
}

impl SchemaError {
    /// Builds a single-violation error, used for unparseable bodies.
    pub fn single(shape: &'static str, violation: impl Into<String>) -> Self {
        Self {
            shape,
            violations: vec![violation.into()],
        }
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} payload: {}",
            self.shape,
            self.violations.join("; ")
        )
    }
}

impl Error for SchemaError {}

/// Checks `value` against `shape`.
pub fn check(shape: &Shape, value: &Value) -> Result<(), SchemaError> {
    let violations = shape.violations(value);
    if violations.is_empty() {
        return Ok(());
    }
    Err(SchemaError {
        shape: shape.name,
        violations,
    })
}

/// Validates an item payload and returns its typed field set.
pub fn validate_item(value: &Value) -> Result<ItemFields, SchemaError> {
    let object = conforming_object(&ITEM_SHAPE, value)?;
    Ok(ItemFields {
        name: string_field(object, "name").unwrap_or_default(),
        color: string_field(object, "color"),
        price: object.get("price").and_then(Value::as_f64),
    })
}

/// Validates an event payload and returns its typed creation input.
pub fn validate_event(value: &Value) -> Result<NewEvent, SchemaError> {
    let object = conforming_object(&EVENT_SHAPE, value)?;
    let timestamp = object
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|value| value.with_timezone(&Utc));
    Ok(NewEvent {
        location: string_field(object, "location").unwrap_or_default(),
        custodian: string_field(object, "custodian").unwrap_or_default(),
        timestamp,
    })
}

fn conforming_object<'v>(
    shape: &Shape,
    value: &'v Value,
) -> Result<&'v Map<String, Value>, SchemaError> {
    check(shape, value)?;
    value
        .as_object()
        .ok_or_else(|| SchemaError::single(shape.name, "must be object"))
}

fn string_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    object.get(name).and_then(Value::as_str).map(str::to_string)
}
