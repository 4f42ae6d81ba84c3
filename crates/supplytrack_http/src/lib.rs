//! HTTP surface for SupplyTrack.
//!
//! # Responsibility
//! - Expose item/event use-cases as JSON endpoints.
//! - Map service outcomes to status codes and error bodies.
//!
//! # See also
//! - `supplytrack_core::service::item_service` for the pipelines.

pub mod config;
pub mod error;
mod handlers;
mod request_log;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::{AppState, Operation, Store};

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};
use log::info;
use std::future::Future;
use tokio::net::TcpListener;

/// Builds the application router over an opened store.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/items/:item_id",
            get(handlers::get_item).put(handlers::update_item),
        )
        .route(
            "/items/:item_id/events",
            get(handlers::list_item_events).post(handlers::add_event),
        )
        .route_layer(middleware::from_fn(request_log::log_requests))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until `shutdown` resolves.
pub async fn serve<S>(config: &ServerConfig, state: AppState, shutdown: S) -> Result<(), String>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = config.validate().map_err(|err| err.to_string())?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| format!("bind {addr} failed: {err}"))?;
    let local_addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {err}"))?;
    info!("event=server_listen module=http status=ok addr={local_addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|err| format!("server failed: {err}"))
}
