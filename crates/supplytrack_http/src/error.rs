//! HTTP error mapping.
//!
//! # Invariants
//! - Validation failures answer `400 {"errors": [...]}`.
//! - Every other failure answers `{"error": "..."}`.
//! - Storage causes are logged, never written to the response.

use crate::state::Operation;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use supplytrack_core::ServiceError;

pub const ITEM_NOT_FOUND_MESSAGE: &str = "Item not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(Vec<String>),
    NotFound,
    PayloadTooLarge,
    Storage(Operation),
}

impl ApiError {
    /// Maps a service outcome, logging the cause of storage failures.
    pub fn from_service(op: Operation, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(violations) => Self::Validation(violations),
            ServiceError::ItemNotFound(_) => Self::NotFound,
            ServiceError::Storage(cause) => {
                error!(
                    "event=store_failure module=http status=error op={} error={}",
                    op.name(),
                    cause
                );
                Self::Storage(op)
            }
        }
    }

    /// Maps an unreadable request body.
    pub fn from_rejection(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::Validation(vec![rejection.body_text()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::NotFound => json!({ "error": ITEM_NOT_FOUND_MESSAGE }),
            Self::PayloadTooLarge => json!({ "error": "Request body is too large" }),
            Self::Storage(op) => json!({ "error": op.storage_message() }),
        };
        (status, Json(body)).into_response()
    }
}
