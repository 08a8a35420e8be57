//! Coordinator wiring user actions into store calls and local state.
//!
//! # Responsibility
//! - Own the list view, the editor and the remote store handle.
//! - Apply one user action at a time and broadcast resulting UI events.
//! - Report failures without retrying or rolling anything back.
//!
//! # Invariants
//! - Local state changes only after the remote call resolves successfully.
//!   The one exception is starring a transient note, which has no remote
//!   representation.
//! - The collection only ever holds persisted notes.
//! - Cancel on a persisted note keeps it open; only unsaved edits are lost.
//! - Overlapping updates are applied in completion order, with no version
//!   token.

use crate::debounce::SearchDebouncer;
use crate::editor::EditorState;
use crate::model::category::Category;
use crate::model::note::{Note, NoteId, NotePatch};
use crate::store::{NoteStore, StoreError};
use crate::view::NoteListView;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc::UnboundedReceiver;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Editor focus derived from coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus<'a> {
    Idle,
    Editing(&'a Note),
}

/// Why an action was accepted without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The target note has no id, so there is nothing remote to touch.
    TransientNote,
    /// The action needs an open note and none is open.
    NothingOpen,
}

/// Result of a successfully handled action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Skipped(SkipReason),
}

/// Events consumed by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SearchTextChanged(String),
    FilterChanged(Category),
    NoteSelected(Option<NoteId>),
    NoteDeleted(NoteId),
    StarToggled {
        id: Option<NoteId>,
        starred: bool,
    },
    NoteSaved(Note),
    EditCancelled,
    CreateNewRequested,
    NotesLoaded(usize),
    ActionFailed {
        action: &'static str,
        error: StoreError,
    },
}

/// User intents accepted by [`Coordinator::dispatch`] and [`Coordinator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    /// Raw keystroke-level search text; debounced by `run`.
    SearchInput(String),
    /// Settled search text; triggers a remote listing immediately.
    SearchChanged(String),
    FilterChanged(Category),
    CreateNew,
    SelectNote(Note),
    DeleteNote(Note),
    ToggleStar(Note),
    EditTitle(String),
    EditContent(String),
    EditTags(Vec<String>),
    Save,
    Cancel,
    Reload,
}

/// Single-owner state container driving the notes client.
pub struct Coordinator<S: NoteStore + ?Sized> {
    store: Arc<S>,
    view: NoteListView,
    editor: EditorState,
    /// Last persisted copy of the open note, used to discard edits on cancel.
    selected: Option<Note>,
    events: broadcast::Sender<UiEvent>,
    last_error: Option<StoreError>,
    search_debounce: Duration,
}

impl<S: NoteStore + ?Sized> Coordinator<S> {
    pub fn new(store: Arc<S>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            view: NoteListView::new(),
            editor: EditorState::new(),
            selected: None,
            events,
            last_error: None,
            search_debounce: crate::config::DEFAULT_SEARCH_DEBOUNCE,
        }
    }

    /// Overrides the search quiescence window used by `run`.
    pub fn with_search_debounce(mut self, window: Duration) -> Self {
        self.search_debounce = window;
        self
    }

    /// Subscribes to UI events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    pub fn view(&self) -> &NoteListView {
        &self.view
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    /// Mutable editor access for field-level edits.
    pub fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.editor
    }

    /// Visible notes for the current query and category.
    pub fn visible(&self) -> Vec<Note> {
        self.view.visible()
    }

    pub fn focus(&self) -> Focus<'_> {
        match self.editor.note() {
            Some(note) => Focus::Editing(note),
            None => Focus::Idle,
        }
    }

    /// Most recent failure reported by any action.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Fetches the collection for the current query.
    pub async fn load(&mut self) -> Result<ActionOutcome, StoreError> {
        let query = self.view.query().to_string();
        let listed = self.store.list(Some(query.as_str())).await;
        match listed {
            Ok(notes) => {
                self.view.replace_collection(notes);
                let count = self.view.collection().len();
                info!("event=notes_load module=coordinator status=ok count={count}");
                self.emit(UiEvent::NotesLoaded(count));
                Ok(ActionOutcome::Applied)
            }
            Err(err) => Err(self.report("notes_load", err)),
        }
    }

    /// Stores the settled query and refreshes the collection from the store.
    pub async fn search_changed(
        &mut self,
        query: impl Into<String>,
    ) -> Result<ActionOutcome, StoreError> {
        let query = query.into();
        self.view.set_query(query.clone());
        self.emit(UiEvent::SearchTextChanged(query));
        self.load().await
    }

    /// Switches the local category filter. Never touches the store.
    pub fn filter_changed(&mut self, category: Category) -> ActionOutcome {
        self.view.set_category(category);
        debug!("event=filter_change module=coordinator status=ok category={category}");
        self.emit(UiEvent::FilterChanged(category));
        ActionOutcome::Applied
    }

    /// Opens an empty transient note.
    pub fn create_new(&mut self) -> ActionOutcome {
        self.editor.open(None);
        self.selected = None;
        self.emit(UiEvent::CreateNewRequested);
        ActionOutcome::Applied
    }

    /// Opens `note` in the editor, superseding whatever was open.
    pub fn select_note(&mut self, note: &Note) -> ActionOutcome {
        self.editor.open(Some(note));
        self.selected = (!note.is_transient()).then(|| note.clone());
        self.emit(UiEvent::NoteSelected(note.id.clone()));
        ActionOutcome::Applied
    }

    /// Deletes a persisted note that is present in the collection.
    ///
    /// Transient notes are skipped. An id missing from the collection is
    /// reported as `NotFound` without contacting the store.
    pub async fn delete_note(&mut self, note: &Note) -> Result<ActionOutcome, StoreError> {
        let Some(id) = note.id.clone() else {
            debug!("event=note_delete module=coordinator status=skipped reason=transient");
            return Ok(ActionOutcome::Skipped(SkipReason::TransientNote));
        };
        if !self.view.contains(&id) {
            return Err(self.report("note_delete", StoreError::NotFound(id)));
        }

        let deleted = self.store.delete(&id).await;
        if let Err(err) = deleted {
            return Err(self.report("note_delete", err));
        }

        self.view.remove(&id);
        if self.editor.open_id() == Some(id.as_str()) {
            self.editor.cancel();
            self.selected = None;
        }
        info!("event=note_delete module=coordinator status=ok id={id}");
        self.emit(UiEvent::NoteDeleted(id));
        Ok(ActionOutcome::Applied)
    }

    /// Flips the star flag of `note`.
    ///
    /// Transient notes are flipped in the editor copy only. Persisted notes
    /// are updated remotely and replaced locally once the store answers.
    pub async fn toggle_star(&mut self, note: &Note) -> Result<ActionOutcome, StoreError> {
        let Some(id) = note.id.clone() else {
            let editing_transient = self.editor.note().is_some_and(Note::is_transient);
            let starred = if editing_transient {
                self.editor.toggle_star().unwrap_or(false)
            } else {
                let mut flipped = note.clone();
                flipped.starred = Some(!note.is_starred());
                self.editor.open(Some(&flipped));
                self.selected = None;
                !note.is_starred()
            };
            self.emit(UiEvent::StarToggled { id: None, starred });
            return Ok(ActionOutcome::Applied);
        };

        let patch = NotePatch::starred(!note.is_starred());
        let result = self.store.update(&id, &patch).await;
        let updated = match result {
            Ok(updated) => updated,
            Err(err) => return Err(self.report("note_star", err)),
        };

        self.view.replace(updated.clone());
        let starred = updated.is_starred();
        if self.editor.open_id() == Some(id.as_str()) {
            self.editor.sync_persisted(&updated);
            self.selected = Some(updated);
        }
        info!("event=note_star module=coordinator status=ok id={id} starred={starred}");
        self.emit(UiEvent::StarToggled {
            id: Some(id),
            starred,
        });
        Ok(ActionOutcome::Applied)
    }

    /// Persists the open note: create when transient, update otherwise.
    pub async fn save(&mut self) -> Result<ActionOutcome, StoreError> {
        let Some(payload) = self.editor.save() else {
            return Ok(ActionOutcome::Skipped(SkipReason::NothingOpen));
        };

        let result = match payload.id.as_deref() {
            Some(id) => self.store.update(id, &NotePatch::from_note(&payload)).await,
            None => self.store.create(&payload).await,
        };
        let saved = match result {
            Ok(saved) => saved,
            Err(err) => return Err(self.report("note_save", err)),
        };

        self.view.upsert(saved.clone());
        self.editor.open(Some(&saved));
        self.selected = Some(saved.clone());
        info!(
            "event=note_save module=coordinator status=ok id={} created={}",
            saved.id().unwrap_or("-"),
            payload.is_transient()
        );
        self.emit(UiEvent::NoteSaved(saved));
        Ok(ActionOutcome::Applied)
    }

    /// Cancels editing.
    ///
    /// A transient note is closed. A persisted note stays open, reset to its
    /// last persisted copy.
    pub fn cancel(&mut self) -> ActionOutcome {
        match &self.selected {
            Some(persisted) => self.editor.open(Some(persisted)),
            None => self.editor.cancel(),
        }
        self.emit(UiEvent::EditCancelled);
        ActionOutcome::Applied
    }

    /// Handles one action. Failures are already reported when returned.
    pub async fn dispatch(&mut self, action: UserAction) -> Result<ActionOutcome, StoreError> {
        match action {
            UserAction::SearchInput(query) | UserAction::SearchChanged(query) => {
                self.search_changed(query).await
            }
            UserAction::FilterChanged(category) => Ok(self.filter_changed(category)),
            UserAction::CreateNew => Ok(self.create_new()),
            UserAction::SelectNote(note) => Ok(self.select_note(&note)),
            UserAction::DeleteNote(note) => self.delete_note(&note).await,
            UserAction::ToggleStar(note) => self.toggle_star(&note).await,
            UserAction::EditTitle(title) => Ok(self.edit(|editor| editor.set_title(title))),
            UserAction::EditContent(content) => {
                Ok(self.edit(|editor| editor.set_content(content)))
            }
            UserAction::EditTags(tags) => Ok(self.edit(|editor| editor.set_tags(tags))),
            UserAction::Save => self.save().await,
            UserAction::Cancel => Ok(self.cancel()),
            UserAction::Reload => self.load().await,
        }
    }

    /// Event loop: consumes actions one at a time until the sender closes.
    ///
    /// `SearchInput` values go through a debouncer; settled queries are
    /// handled like `SearchChanged`. Pending search input is flushed before
    /// returning.
    pub async fn run(&mut self, mut actions: UnboundedReceiver<UserAction>) {
        let (debouncer, mut settled) = SearchDebouncer::spawn(self.search_debounce);
        let mut input_open = true;

        loop {
            tokio::select! {
                action = actions.recv(), if input_open => match action {
                    Some(UserAction::SearchInput(text)) => {
                        debouncer.push(text);
                    }
                    Some(other) => {
                        let _ = self.dispatch(other).await;
                    }
                    None => input_open = false,
                },
                query = settled.recv() => match query {
                    Some(query) => {
                        let _ = self.search_changed(query).await;
                    }
                    None => break,
                },
            }

            if !input_open {
                break;
            }
        }

        drop(debouncer);
        while let Some(query) = settled.recv().await {
            let _ = self.search_changed(query).await;
        }
    }

    fn edit(&mut self, apply: impl FnOnce(&mut EditorState)) -> ActionOutcome {
        if !self.editor.is_open() {
            return ActionOutcome::Skipped(SkipReason::NothingOpen);
        }
        apply(&mut self.editor);
        ActionOutcome::Applied
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn report(&mut self, action: &'static str, err: StoreError) -> StoreError {
        warn!(
            "event={action} module=coordinator status=error kind={} error={}",
            err.kind(),
            err
        );
        self.last_error = Some(err.clone());
        self.emit(UiEvent::ActionFailed {
            action,
            error: err.clone(),
        });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionOutcome, Coordinator, Focus, SkipReason, UiEvent};
    use crate::model::note::Note;
    use crate::store::memory::{InMemoryNoteStore, StoreCall};
    use std::sync::Arc;

    #[tokio::test]
    async fn create_new_then_cancel_returns_to_idle() {
        let store = Arc::new(InMemoryNoteStore::new());
        let mut coordinator = Coordinator::new(store.clone());
        let mut events = coordinator.subscribe();

        coordinator.create_new();
        assert!(matches!(coordinator.focus(), Focus::Editing(note) if note.is_transient()));
        coordinator.cancel();
        assert_eq!(coordinator.focus(), Focus::Idle);

        assert_eq!(events.recv().await.unwrap(), UiEvent::CreateNewRequested);
        assert_eq!(events.recv().await.unwrap(), UiEvent::EditCancelled);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn save_without_open_note_is_skipped() {
        let store = Arc::new(InMemoryNoteStore::new());
        let mut coordinator = Coordinator::new(store.clone());
        let outcome = coordinator.save().await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::NothingOpen));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn deleting_transient_note_is_skipped_without_remote_call() {
        let store = Arc::new(InMemoryNoteStore::new());
        let mut coordinator = Coordinator::new(store.clone());
        let outcome = coordinator.delete_note(&Note::draft()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped(SkipReason::TransientNote));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn save_update_sends_editable_fields_only() {
        let store = Arc::new(InMemoryNoteStore::with_notes([Note {
            id: Some("n1".to_string()),
            ..Note::new("old", "body")
        }]));
        let mut coordinator = Coordinator::new(store.clone());
        coordinator.load().await.unwrap();
        let note = coordinator.view().find("n1").cloned().unwrap();

        coordinator.select_note(&note);
        coordinator.editor_mut().set_title("  new  ");
        coordinator.save().await.unwrap();

        let Some(StoreCall::Update(id, patch)) = store.calls().last().cloned() else {
            panic!("expected update call");
        };
        assert_eq!(id, "n1");
        assert_eq!(patch.title.as_deref(), Some("new"));
        assert_eq!(patch.starred, Some(false));
        assert_eq!(coordinator.view().find("n1").unwrap().title, "new");
    }
}
