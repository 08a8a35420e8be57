use notekeeper_core::{
    ActionOutcome, Category, Coordinator, Focus, InMemoryNoteStore, Note, NotePatch, StoreCall,
    StoreError, UiEvent,
};
use std::sync::Arc;

fn persisted(id: &str, title: &str, content: &str) -> Note {
    Note {
        id: Some(id.to_string()),
        ..Note::new(title, content)
    }
}

async fn loaded(store: &Arc<InMemoryNoteStore>) -> Coordinator<InMemoryNoteStore> {
    let mut coordinator = Coordinator::new(store.clone());
    coordinator.load().await.unwrap();
    coordinator
}

#[tokio::test]
async fn saving_transient_note_creates_normalized_payload() {
    let store = Arc::new(InMemoryNoteStore::new());
    let mut coordinator = loaded(&store).await;

    coordinator.create_new();
    coordinator.editor_mut().set_title(" Hi ");
    coordinator.editor_mut().set_content(" ");
    coordinator.save().await.unwrap();

    let Some(StoreCall::Create(payload)) = store.calls().last().cloned() else {
        panic!("expected a create call");
    };
    assert_eq!(payload.id, None);
    assert_eq!(payload.title, "Hi");
    assert_eq!(payload.content, "");
    assert_eq!(payload.starred, Some(false));
    assert_eq!(payload.tags, Some(Vec::new()));

    let Focus::Editing(open) = coordinator.focus() else {
        panic!("saved note should stay open");
    };
    assert!(!open.is_transient());
    assert_eq!(coordinator.view().collection().len(), 1);
    assert_eq!(coordinator.view().collection()[0].id, open.id);
}

#[tokio::test]
async fn toggling_star_on_transient_note_stays_local() {
    let store = Arc::new(InMemoryNoteStore::new());
    let mut coordinator = Coordinator::new(store.clone());

    coordinator.create_new();
    let draft = coordinator.editor().note().cloned().unwrap();
    coordinator.toggle_star(&draft).await.unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(coordinator.editor().note().unwrap().starred, Some(true));
    assert!(coordinator.view().collection().is_empty());
}

#[tokio::test]
async fn toggling_star_on_unopened_transient_note_opens_flipped_copy() {
    let store = Arc::new(InMemoryNoteStore::new());
    let mut coordinator = Coordinator::new(store.clone());
    let mut events = coordinator.subscribe();
    assert_eq!(coordinator.focus(), Focus::Idle);

    let draft = Note::new("idea", "");
    coordinator.toggle_star(&draft).await.unwrap();

    assert!(store.calls().is_empty());
    let Focus::Editing(open) = coordinator.focus() else {
        panic!("starring a transient note should open it");
    };
    assert!(open.is_transient());
    assert_eq!(open.title, "idea");
    assert_eq!(open.starred, Some(true));
    assert!(coordinator.view().collection().is_empty());
    assert_eq!(
        events.recv().await.unwrap(),
        UiEvent::StarToggled {
            id: None,
            starred: true,
        }
    );
}

#[tokio::test]
async fn star_failure_leaves_collection_and_open_note_unchanged() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "a", "b")]));
    let mut coordinator = loaded(&store).await;
    let note = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&note);
    let collection_before = coordinator.view().collection().to_vec();
    let editor_before = coordinator.editor().clone();
    let calls_before = store.calls().len();

    store.fail_next(StoreError::transport("connection reset"));
    let err = coordinator.toggle_star(&note).await.unwrap_err();

    assert!(matches!(err, StoreError::Transport { status: None, .. }));
    assert_eq!(coordinator.view().collection(), collection_before.as_slice());
    assert_eq!(coordinator.editor(), &editor_before);
    assert_eq!(store.calls().len(), calls_before + 1);
    assert_eq!(
        store.calls().last(),
        Some(&StoreCall::Update("n1".to_string(), NotePatch::starred(true)))
    );
    assert!(!store.notes()[0].is_starred());
    assert_eq!(coordinator.last_error(), Some(&err));
}

#[tokio::test]
async fn starring_open_note_takes_server_timestamp_and_keeps_edits() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "a", "b")]));
    let mut coordinator = loaded(&store).await;
    let note = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&note);
    coordinator.editor_mut().set_title("unsaved");

    coordinator.toggle_star(&note).await.unwrap();

    let server_copy = coordinator.view().find("n1").cloned().unwrap();
    assert!(server_copy.updated_at.is_some());
    let open = coordinator.editor().note().unwrap();
    assert_eq!(open.title, "unsaved");
    assert!(open.is_starred());
    assert_eq!(open.updated_at, server_copy.updated_at);
}

#[tokio::test]
async fn toggling_star_on_persisted_note_updates_collection_and_editor() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "a", "b")]));
    let mut coordinator = loaded(&store).await;
    let note = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&note);

    coordinator.toggle_star(&note).await.unwrap();

    assert_eq!(
        store.calls().last(),
        Some(&StoreCall::Update("n1".to_string(), NotePatch::starred(true)))
    );
    assert!(coordinator.view().find("n1").unwrap().is_starred());
    assert!(coordinator.editor().note().unwrap().is_starred());

    coordinator.filter_changed(Category::Starred);
    assert_eq!(coordinator.visible().len(), 1);
}

#[tokio::test]
async fn deleting_unknown_note_is_not_found_and_leaves_collection() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "a", "b")]));
    let mut coordinator = loaded(&store).await;
    let calls_before = store.calls().len();

    let err = coordinator
        .delete_note(&persisted("ghost", "x", "y"))
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::NotFound("ghost".to_string()));
    assert_eq!(coordinator.view().collection().len(), 1);
    assert_eq!(store.calls().len(), calls_before);
    assert_eq!(coordinator.last_error(), Some(&err));
}

#[tokio::test]
async fn deleting_open_note_returns_to_idle() {
    let store = Arc::new(InMemoryNoteStore::with_notes([
        persisted("n1", "a", "b"),
        persisted("n2", "c", "d"),
    ]));
    let mut coordinator = loaded(&store).await;
    let mut events = coordinator.subscribe();
    let target = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&target);

    let outcome = coordinator.delete_note(&target).await.unwrap();

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(coordinator.focus(), Focus::Idle);
    assert!(!coordinator.view().contains("n1"));
    assert_eq!(store.notes().len(), 1);
    assert_eq!(
        events.recv().await.unwrap(),
        UiEvent::NoteSelected(Some("n1".to_string()))
    );
    assert_eq!(
        events.recv().await.unwrap(),
        UiEvent::NoteDeleted("n1".to_string())
    );
}

#[tokio::test]
async fn update_failure_leaves_collection_and_open_note_unchanged() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "old", "b")]));
    let mut coordinator = loaded(&store).await;
    let mut events = coordinator.subscribe();
    let note = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&note);
    coordinator.editor_mut().set_title("edited");
    let collection_before = coordinator.view().collection().to_vec();
    let editor_before = coordinator.editor().clone();

    store.fail_next(StoreError::Transport {
        status: Some(503),
        message: "unavailable".to_string(),
    });
    let err = coordinator.save().await.unwrap_err();

    assert!(matches!(err, StoreError::Transport { status: Some(503), .. }));
    assert_eq!(coordinator.view().collection(), collection_before.as_slice());
    assert_eq!(coordinator.editor(), &editor_before);

    let _selected = events.recv().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        UiEvent::ActionFailed {
            action: "note_save",
            error: err,
        }
    );
}

#[tokio::test]
async fn cancel_on_persisted_note_discards_edits_but_keeps_it_open() {
    let store = Arc::new(InMemoryNoteStore::with_notes([persisted("n1", "title", "b")]));
    let mut coordinator = loaded(&store).await;
    let note = coordinator.view().find("n1").cloned().unwrap();
    coordinator.select_note(&note);
    coordinator.editor_mut().set_title("scratch");

    coordinator.cancel();

    let Focus::Editing(open) = coordinator.focus() else {
        panic!("persisted note should remain open");
    };
    assert_eq!(open.id(), Some("n1"));
    assert_eq!(open.title, "title");
}

#[tokio::test]
async fn filter_change_is_local_and_search_is_remote() {
    let mut starred = persisted("n1", "Rust", "ownership");
    starred.starred = Some(true);
    let store = Arc::new(InMemoryNoteStore::with_notes([
        starred,
        persisted("n2", "Go", "goroutines"),
    ]));
    let mut coordinator = loaded(&store).await;
    assert_eq!(store.list_calls(), 1);

    coordinator.filter_changed(Category::Starred);
    assert_eq!(store.list_calls(), 1);
    assert_eq!(coordinator.visible().len(), 1);

    coordinator.filter_changed(Category::All);
    coordinator.search_changed("go").await.unwrap();
    assert_eq!(store.list_calls(), 2);
    assert_eq!(coordinator.view().collection().len(), 1);
    assert_eq!(coordinator.visible()[0].id(), Some("n2"));
}

#[tokio::test]
async fn unfiltered_view_is_collection_resorted() {
    let mut a = persisted("a", "A", "");
    a.updated_at = Some("2024-01-02".to_string());
    let mut b = persisted("b", "B", "");
    b.updated_at = Some("2024-01-03".to_string());
    let mut c = persisted("c", "C", "");
    c.created_at = Some("2024-01-01".to_string());
    let store = Arc::new(InMemoryNoteStore::with_notes([a, c, b]));
    let coordinator = loaded(&store).await;

    let visible = coordinator.visible();
    assert_eq!(visible.len(), coordinator.view().collection().len());
    let ids: Vec<_> = visible.iter().filter_map(Note::id).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}
