//! Client-side domain model for notes.
//!
//! # Responsibility
//! - Define the note shape exchanged with the notes API.
//! - Define the list category filter key shared by view and CLI.
//!
//! # Invariants
//! - A note is persisted iff it carries a server-assigned `id`.
//! - Decoded notes never expose a missing title or content.

pub mod category;
pub mod note;
