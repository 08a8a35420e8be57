//! Editor state for the currently open note.
//!
//! # Responsibility
//! - Hold a private copy of zero or one note being created or edited.
//! - Produce the normalized save payload.
//!
//! # Invariants
//! - The held note is always a copy; edits never alias collection entries.
//! - `save()` trims title/content and defaults `starred`/`tags`; `id` is
//!   carried through unchanged.

use crate::model::note::Note;

/// Editor holding at most one note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    note: Option<Note>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a copy of `note`, or an empty transient note for `None`.
    pub fn open(&mut self, note: Option<&Note>) {
        self.note = Some(note.cloned().unwrap_or_else(Note::draft));
    }

    /// Clears the editor without side effects.
    pub fn cancel(&mut self) {
        self.note = None;
    }

    pub fn is_open(&self) -> bool {
        self.note.is_some()
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    /// Id of the open note when it is persisted.
    pub fn open_id(&self) -> Option<&str> {
        self.note.as_ref().and_then(Note::id)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        if let Some(note) = self.note.as_mut() {
            note.title = title.into();
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        if let Some(note) = self.note.as_mut() {
            note.content = content.into();
        }
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        if let Some(note) = self.note.as_mut() {
            note.tags = Some(tags);
        }
    }

    /// Flips the star flag on the local copy only.
    ///
    /// Returns the new value, or `None` when nothing is open.
    pub fn toggle_star(&mut self) -> Option<bool> {
        let note = self.note.as_mut()?;
        let next = !note.is_starred();
        note.starred = Some(next);
        Some(next)
    }

    /// Copies server-owned fields of `persisted` into the open copy.
    ///
    /// Only the star flag and timestamps move; unsaved title, content and
    /// tag edits are kept. No-op unless `persisted` is the open note.
    pub fn sync_persisted(&mut self, persisted: &Note) {
        let Some(note) = self.note.as_mut() else {
            return;
        };
        if note.id.is_none() || note.id != persisted.id {
            return;
        }
        note.starred = persisted.starred;
        note.created_at = persisted.created_at.clone();
        note.updated_at = persisted.updated_at.clone();
    }

    /// Builds the normalized save payload. `None` when nothing is open.
    pub fn save(&self) -> Option<Note> {
        let note = self.note.as_ref()?;
        Some(Note {
            id: note.id.clone(),
            title: note.title.trim().to_string(),
            content: note.content.trim().to_string(),
            starred: Some(note.is_starred()),
            tags: Some(note.tags.clone().unwrap_or_default()),
            created_at: None,
            updated_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::EditorState;
    use crate::model::note::Note;

    #[test]
    fn open_none_starts_empty_transient_note() {
        let mut editor = EditorState::new();
        editor.open(None);
        let note = editor.note().unwrap();
        assert!(note.is_transient());
        assert_eq!(note.title, "");
        assert_eq!(note.content, "");
    }

    #[test]
    fn save_trims_and_defaults_fields() {
        let mut editor = EditorState::new();
        editor.open(Some(&Note::new(" Hi ", " ")));
        let payload = editor.save().unwrap();
        assert_eq!(payload.id, None);
        assert_eq!(payload.title, "Hi");
        assert_eq!(payload.content, "");
        assert_eq!(payload.starred, Some(false));
        assert_eq!(payload.tags, Some(Vec::new()));
    }

    #[test]
    fn open_copies_so_edits_do_not_leak() {
        let original = Note {
            id: Some("n1".to_string()),
            ..Note::new("title", "body")
        };
        let mut editor = EditorState::new();
        editor.open(Some(&original));
        editor.set_title("changed");
        assert_eq!(original.title, "title");
        assert_eq!(editor.save().unwrap().id.as_deref(), Some("n1"));
    }

    #[test]
    fn toggle_star_and_cancel() {
        let mut editor = EditorState::new();
        assert_eq!(editor.toggle_star(), None);
        editor.open(None);
        assert_eq!(editor.toggle_star(), Some(true));
        assert_eq!(editor.toggle_star(), Some(false));
        editor.cancel();
        assert!(!editor.is_open());
        assert_eq!(editor.save(), None);
    }

    #[test]
    fn sync_persisted_keeps_local_edits() {
        let mut editor = EditorState::new();
        let open = Note {
            id: Some("n1".to_string()),
            ..Note::new("a", "b")
        };
        editor.open(Some(&open));
        editor.set_title("draft title");

        let mut server = open.clone();
        server.starred = Some(true);
        server.updated_at = Some("2024-06-01T00:00:00Z".to_string());
        editor.sync_persisted(&server);

        let note = editor.note().unwrap();
        assert_eq!(note.title, "draft title");
        assert_eq!(note.starred, Some(true));
        assert_eq!(note.updated_at.as_deref(), Some("2024-06-01T00:00:00Z"));

        let other = Note {
            id: Some("n2".to_string()),
            starred: Some(false),
            ..Note::new("x", "y")
        };
        editor.sync_persisted(&other);
        assert_eq!(editor.note().unwrap().starred, Some(true));
    }
}
