//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate schema validation and repository calls into use-case APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod item_service;
