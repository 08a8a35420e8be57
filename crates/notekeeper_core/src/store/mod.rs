//! Remote note store contract and implementations.
//!
//! # Responsibility
//! - Define the async CRUD contract the coordinator depends on.
//! - Keep HTTP details out of state/view orchestration.
//!
//! # Invariants
//! - Every note returned by `list`/`get` has non-null title and content.
//! - Failures are surfaced unmodified; nothing here retries.
//! - `delete` success means "the note no longer exists".

pub mod http;
pub mod memory;

use crate::model::note::{Note, NoteId, NotePatch};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single remote store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Referenced id does not exist remotely.
    NotFound(NoteId),
    /// Network, server or payload failure. Opaque to callers.
    Transport {
        /// HTTP status when the server answered at all.
        status: Option<u16>,
        message: String,
    },
}

impl StoreError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Short machine-friendly kind used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Transport { .. } => "transport",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Transport {
                status: Some(status),
                message,
            } => write!(f, "notes api returned HTTP {status}: {message}"),
            Self::Transport {
                status: None,
                message,
            } => write!(f, "notes api request failed: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Async CRUD contract for the remote notes collaborator.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Lists persisted notes matching `query`; blank or absent returns all.
    async fn list(&self, query: Option<&str>) -> StoreResult<Vec<Note>>;
    /// Gets one note by id.
    async fn get(&self, id: &str) -> StoreResult<Note>;
    /// Creates a note; the store assigns `id` and timestamps.
    async fn create(&self, note: &Note) -> StoreResult<Note>;
    /// Applies a partial update and returns the full updated note.
    async fn update(&self, id: &str, patch: &NotePatch) -> StoreResult<Note>;
    /// Deletes a note by id.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Trims `query` and drops it when blank.
pub fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|value| !value.is_empty())
}
