//! Item domain model.
//!
//! # Responsibility
//! - Define the tracked supply-chain item and its mutable field set.
//! - Provide record-level validation used by repository write paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `events` is append-only and keeps insertion order.
//! - `price`, when set, is a finite number.

use crate::model::event::EventId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an item record.
pub type ItemId = Uuid;

/// Mutable item fields accepted by create and full-update operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemFields {
    pub name: String,
    pub color: Option<String>,
    pub price: Option<f64>,
}

impl ItemFields {
    /// Creates a field set with only the required `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Checks field-level invariants that the JSON shape cannot express.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        match self.price {
            Some(price) if !price.is_finite() => Err(ItemValidationError::NonFinitePrice),
            _ => Ok(()),
        }
    }
}

/// Creation input for an item.
///
/// `reference_data` is schema-less and only reachable through core callers;
/// the HTTP item shape does not accept it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewItem {
    pub fields: ItemFields,
    pub reference_data: Option<Value>,
}

impl From<ItemFields> for NewItem {
    fn from(fields: ItemFields) -> Self {
        Self {
            fields,
            reference_data: None,
        }
    }
}

/// Persisted item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub color: Option<String>,
    pub price: Option<f64>,
    /// Free-form structured value, `null` when absent.
    pub reference_data: Option<Value>,
    /// Weak references to event records, in append order.
    pub events: Vec<EventId>,
}

impl Item {
    /// Returns the mutable field set of this record.
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            name: self.name.clone(),
            color: self.color.clone(),
            price: self.price,
        }
    }

    /// Validates record-level invariants before persistence or after reads.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id.is_nil() {
            return Err(ItemValidationError::NilId);
        }
        self.fields().validate()
    }
}

/// Domain validation error for item records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    NonFinitePrice,
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::NonFinitePrice => write!(f, "/price must be a finite number"),
        }
    }
}

impl Error for ItemValidationError {}
