//! Note entity and partial-update payload.
//!
//! # Responsibility
//! - Mirror the notes API JSON shape (`camelCase` field names).
//! - Default untrusted wire values (`null`/absent title and content).
//! - Provide ordering and display helpers used by list views.
//!
//! # Invariants
//! - `id` is opaque and only ever assigned by the remote store.
//! - Timestamps are opaque strings; they are compared, never parsed.
//! - Absent optional fields are omitted when serializing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Default excerpt length used by list rows.
pub const DEFAULT_EXCERPT_CHARS: usize = 120;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Opaque server-assigned note identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = String;

/// A note as held by the client.
///
/// A note without `id` is transient: it lives only in editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    /// `null` or missing on the wire decodes as `""`.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    /// `null` or missing on the wire decodes as `""`.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Note {
    /// Creates an empty transient note, as opened by "new note".
    pub fn draft() -> Self {
        Self::default()
    }

    /// Creates a transient note with the given title and content.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Returns whether this note has never been persisted.
    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the persisted id, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Absent `starred` counts as not starred.
    pub fn is_starred(&self) -> bool {
        self.starred.unwrap_or(false)
    }

    /// Key used for most-recently-touched ordering.
    ///
    /// `updatedAt`, then `createdAt`, then the empty string.
    pub fn recency_key(&self) -> &str {
        self.updated_at
            .as_deref()
            .or(self.created_at.as_deref())
            .unwrap_or("")
    }

    /// Case-insensitive substring match on title or content.
    ///
    /// `needle_lower` must already be lowercased; empty matches everything.
    pub fn matches_lowercase(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.title.to_lowercase().contains(needle_lower)
            || self.content.to_lowercase().contains(needle_lower)
    }

    /// One-line summary of the content for list rows.
    ///
    /// Whitespace runs collapse to one space; text longer than `max_chars`
    /// is cut and suffixed with `…`.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let collapsed = WHITESPACE_RE.replace_all(&self.content, " ");
        let trimmed = collapsed.trim();
        if trimmed.chars().count() <= max_chars {
            return trimmed.to_string();
        }
        let mut cut: String = trimmed.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

/// Partial field set for `update` calls. Only `Some` fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    /// Patch touching only the star flag.
    pub fn starred(value: bool) -> Self {
        Self {
            starred: Some(value),
            ..Self::default()
        }
    }

    /// Patch carrying every editable field of `note`.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: Some(note.title.clone()),
            content: Some(note.content.clone()),
            starred: note.starred,
            tags: note.tags.clone(),
        }
    }

    /// Returns whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.starred.is_none()
            && self.tags.is_none()
    }

    /// Applies supplied fields onto `note`, leaving the rest untouched.
    pub fn apply_to(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        if let Some(starred) = self.starred {
            note.starred = Some(starred);
        }
        if let Some(tags) = &self.tags {
            note.tags = Some(tags.clone());
        }
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
