//! In-process note store.
//!
//! # Responsibility
//! - Implement the `NoteStore` contract without a network.
//! - Record every call so callers can assert on remote traffic.
//!
//! # Invariants
//! - Ids are uuid v4 strings; timestamps are RFC 3339 UTC strings.
//! - Search is a case-insensitive substring match on title or content.
//! - An armed failure is consumed by exactly one call.

use crate::model::note::{Note, NotePatch};
use crate::store::{normalize_query, NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List(Option<String>),
    Get(String),
    Create(Note),
    Update(String, NotePatch),
    Delete(String),
}

#[derive(Debug, Default)]
struct MemoryState {
    notes: Vec<Note>,
    calls: Vec<StoreCall>,
    fail_next: Option<StoreError>,
}

/// `NoteStore` keeping notes in memory.
#[derive(Debug, Default)]
pub struct InMemoryNoteStore {
    state: Mutex<MemoryState>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with persisted notes.
    ///
    /// Notes without an id are assigned one.
    pub fn with_notes(notes: impl IntoIterator<Item = Note>) -> Self {
        let notes = notes
            .into_iter()
            .map(|mut note| {
                if note.id.is_none() {
                    note.id = Some(Uuid::new_v4().to_string());
                }
                note
            })
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                notes,
                ..MemoryState::default()
            }),
        }
    }

    /// Makes the next call fail with `error` instead of running.
    pub fn fail_next(&self, error: StoreError) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_next = Some(error);
        }
    }

    /// Returns all calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Returns how many `list` calls were made.
    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::List(_)))
            .count()
    }

    /// Returns a snapshot of stored notes.
    pub fn notes(&self) -> Vec<Note> {
        self.state
            .lock()
            .map(|state| state.notes.clone())
            .unwrap_or_default()
    }

    fn begin(&self, call: StoreCall) -> StoreResult<MutexGuard<'_, MemoryState>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| StoreError::transport("in-memory store lock poisoned"))?;
        state.calls.push(call);
        let armed = state.fail_next.take();
        match armed {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self, query: Option<&str>) -> StoreResult<Vec<Note>> {
        let query = normalize_query(query).map(str::to_lowercase);
        let state = self.begin(StoreCall::List(query.clone()))?;
        let needle = query.unwrap_or_default();
        Ok(state
            .notes
            .iter()
            .filter(|note| note.matches_lowercase(&needle))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Note> {
        let state = self.begin(StoreCall::Get(id.to_string()))?;
        state
            .notes
            .iter()
            .find(|note| note.id() == Some(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn create(&self, note: &Note) -> StoreResult<Note> {
        let mut state = self.begin(StoreCall::Create(note.clone()))?;
        let now = now_timestamp();
        let mut created = note.clone();
        created.id = Some(Uuid::new_v4().to_string());
        created.created_at = Some(now.clone());
        created.updated_at = Some(now);
        state.notes.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &NotePatch) -> StoreResult<Note> {
        let mut state = self.begin(StoreCall::Update(id.to_string(), patch.clone()))?;
        let note = state
            .notes
            .iter_mut()
            .find(|note| note.id() == Some(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        patch.apply_to(note);
        note.updated_at = Some(now_timestamp());
        Ok(note.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut state = self.begin(StoreCall::Delete(id.to_string()))?;
        state.notes.retain(|note| note.id() != Some(id));
        Ok(())
    }
}
