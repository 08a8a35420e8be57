//! Search/filter/sort view model over the fetched note collection.
//!
//! # Responsibility
//! - Hold the last fetched collection plus the query and category inputs.
//! - Derive the visible, ordered subset on demand.
//!
//! # Invariants
//! - `collection` only contains persisted notes (every entry has an `id`).
//! - `visible()` is a pure function of `(collection, query, category)`.
//! - Visible order is most-recently-touched first; tie order is unspecified.

use crate::model::category::Category;
use crate::model::note::Note;

/// List state backing the notes list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteListView {
    collection: Vec<Note>,
    query: String,
    category: Category,
}

impl NoteListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(&self) -> &[Note] {
        &self.collection
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
    }

    /// Replaces the collection with a fresh listing.
    ///
    /// Notes without an id are dropped.
    pub fn replace_collection(&mut self, notes: Vec<Note>) {
        self.collection = notes
            .into_iter()
            .filter(|note| !note.is_transient())
            .collect();
    }

    /// Inserts `note` at the front, or replaces the entry with the same id.
    ///
    /// Returns `false` (and does nothing) for transient notes.
    pub fn upsert(&mut self, note: Note) -> bool {
        let Some(id) = note.id.clone() else {
            return false;
        };
        match self
            .collection
            .iter_mut()
            .find(|existing| existing.id() == Some(id.as_str()))
        {
            Some(existing) => *existing = note,
            None => self.collection.insert(0, note),
        }
        true
    }

    /// Replaces an existing entry only. Returns whether one was replaced.
    pub fn replace(&mut self, note: Note) -> bool {
        let Some(id) = note.id() else {
            return false;
        };
        match self
            .collection
            .iter_mut()
            .find(|existing| existing.id() == Some(id))
        {
            Some(existing) => {
                *existing = note;
                true
            }
            None => false,
        }
    }

    /// Removes the note with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.collection.len();
        self.collection.retain(|note| note.id() != Some(id));
        self.collection.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.collection.iter().find(|note| note.id() == Some(id))
    }

    /// Visible notes for the current inputs.
    pub fn visible(&self) -> Vec<Note> {
        derive_visible(&self.collection, &self.query, self.category)
    }
}

/// Filters by category, then by query, then sorts by recency descending.
pub fn derive_visible(collection: &[Note], query: &str, category: Category) -> Vec<Note> {
    let needle = query.to_lowercase();
    let mut visible: Vec<Note> = collection
        .iter()
        .filter(|note| category.admits(note))
        .filter(|note| note.matches_lowercase(&needle))
        .cloned()
        .collect();
    visible.sort_by(|a, b| b.recency_key().cmp(a.recency_key()));
    visible
}
