//! Core client logic for Notekeeper.
//! Holds note state, derives list views and keeps them in step with the
//! remote notes API.

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod editor;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use config::{ClientConfig, ConfigError};
pub use coordinator::{ActionOutcome, Coordinator, Focus, SkipReason, UiEvent, UserAction};
pub use debounce::SearchDebouncer;
pub use editor::EditorState;
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::category::Category;
pub use model::note::{Note, NoteId, NotePatch, DEFAULT_EXCERPT_CHARS};
pub use store::http::HttpNoteStore;
pub use store::memory::{InMemoryNoteStore, StoreCall};
pub use store::{NoteStore, StoreError, StoreResult};
pub use view::{derive_visible, NoteListView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
