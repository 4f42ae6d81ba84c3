//! Supply-chain domain model.
//!
//! # Responsibility
//! - Define the canonical `Item` and `Event` records used by core logic.
//! - Keep the item -> event link as an ordered list of weak id references.
//!
//! # Invariants
//! - Every record is identified by a non-nil UUID assigned at creation.
//! - Items never embed events; `Item::events` only stores event ids.
//! - Neither record kind is deleted by any core API.

pub mod event;
pub mod item;
