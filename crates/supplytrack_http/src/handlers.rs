//! Item and event request handlers.
//!
//! # Invariants
//! - Every body is validated by the service before any store write.
//! - Path ids that are not UUIDs resolve to the nil id, which never names a
//!   stored item, so they answer like any unknown id.

use crate::error::ApiError;
use crate::state::{AppState, Operation};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use supplytrack_core::{Event, Item, ItemId};
use uuid::Uuid;

type JsonBody = Result<Json<Value>, JsonRejection>;

pub(crate) async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ping": supplytrack_core::ping(),
        "version": supplytrack_core::core_version(),
    }))
}

pub(crate) async fn create_item(
    State(state): State<AppState>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(payload) = body.map_err(ApiError::from_rejection)?;
    let item = state
        .store
        .run(Operation::CreateItem, move |service| {
            service.create_item(&payload)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .store
        .run(Operation::ListItems, |service| service.list_items())
        .await?;
    Ok(Json(items))
}

pub(crate) async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    let id = resolve_item_id(&item_id);
    let item = state
        .store
        .run(Operation::GetItem, move |service| service.get_item(id))
        .await?;
    Ok(Json(item))
}

pub(crate) async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    body: JsonBody,
) -> Result<Json<Item>, ApiError> {
    let Json(payload) = body.map_err(ApiError::from_rejection)?;
    let id = resolve_item_id(&item_id);
    let item = state
        .store
        .run(Operation::UpdateItem, move |service| {
            service.update_item(id, &payload)
        })
        .await?;
    Ok(Json(item))
}

pub(crate) async fn add_event(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    body: JsonBody,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(payload) = body.map_err(ApiError::from_rejection)?;
    let id = resolve_item_id(&item_id);
    let item = state
        .store
        .run(Operation::AddEvent, move |service| {
            service.add_event(id, &payload)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub(crate) async fn list_item_events(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let id = resolve_item_id(&item_id);
    let events = state
        .store
        .run(Operation::ListItemEvents, move |service| {
            service.list_item_events(id)
        })
        .await?;
    Ok(Json(events))
}

fn resolve_item_id(raw: &str) -> ItemId {
    Uuid::parse_str(raw.trim()).unwrap_or_else(|_| Uuid::nil())
}
