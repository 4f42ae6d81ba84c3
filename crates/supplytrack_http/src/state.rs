//! Explicit store handle and shared router state.
//!
//! # Responsibility
//! - Own the database location with explicit `open` / `shutdown`.
//! - Run service calls on the blocking pool, one connection per call.
//!
//! # Invariants
//! - Migrations run once in `Store::open`, before any request.
//! - No connection is shared across requests or held between them.
//! - After `shutdown`, every call fails as a storage error.

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::error::ApiError;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use supplytrack_core::db::{self, DbError};
use supplytrack_core::{RepoError, ServiceError, ServiceResult, SqliteItemService};

/// Request-level operation, used for logs and storage error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateItem,
    ListItems,
    GetItem,
    UpdateItem,
    AddEvent,
    ListItemEvents,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateItem => "create_item",
            Self::ListItems => "list_items",
            Self::GetItem => "get_item",
            Self::UpdateItem => "update_item",
            Self::AddEvent => "add_event",
            Self::ListItemEvents => "list_item_events",
        }
    }

    pub fn storage_message(self) -> &'static str {
        match self {
            Self::CreateItem => "Failed to create the item",
            Self::ListItems => "Failed to retrieve items",
            Self::GetItem => "Failed to retrieve the item",
            Self::UpdateItem => "Failed to update the item",
            Self::AddEvent => "Failed to add the event",
            Self::ListItemEvents => "Failed to retrieve events",
        }
    }
}

/// Handle to the item/event database file.
#[derive(Debug, Clone)]
pub struct Store {
    db_path: Arc<PathBuf>,
    closed: Arc<AtomicBool>,
}

impl Store {
    /// Creates or migrates the database and returns a handle to it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        drop(db::open_db(&path)?);
        info!("event=store_open module=http status=ok");
        Ok(Self {
            db_path: Arc::new(path),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting calls on every clone of this handle.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("event=store_shutdown module=http status=ok");
            supplytrack_core::flush_logs();
        }
    }

    /// Runs `f` against a fresh connection on the blocking thread pool.
    pub async fn run<T, F>(&self, op: Operation, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteItemService<'_>) -> ServiceResult<T> + Send + 'static,
    {
        if self.is_closed() {
            error!(
                "event=store_failure module=http status=error op={} error=store_closed",
                op.name()
            );
            return Err(ApiError::Storage(op));
        }

        let path = Arc::clone(&self.db_path);
        let outcome = tokio::task::spawn_blocking(move || -> ServiceResult<T> {
            let conn = db::connect(path.as_path())
                .map_err(|err| ServiceError::Storage(RepoError::from(err)))?;
            let service = SqliteItemService::sqlite(&conn);
            f(&service)
        })
        .await;

        match outcome {
            Ok(result) => result.map_err(|err| ApiError::from_service(op, err)),
            Err(join_err) => {
                error!(
                    "event=store_failure module=http status=error op={} error_code=worker_failed error={}",
                    op.name(),
                    join_err
                );
                Err(ApiError::Storage(op))
            }
        }
    }
}

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
