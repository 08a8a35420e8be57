//! JSON-over-HTTP note store.
//!
//! # Responsibility
//! - Map `NoteStore` calls onto the `{base}/notes` REST resource.
//! - Translate HTTP status codes into `StoreError` variants.
//!
//! # Invariants
//! - Ids are percent-encoded before being embedded in a path segment.
//! - `q` is only sent for non-blank queries.
//! - HTTP 404 maps to `NotFound`; every other failure is `Transport`.
//! - `delete` treats 404 as success: the note no longer exists either way.

use crate::config::ClientConfig;
use crate::model::note::{Note, NotePatch};
use crate::store::{normalize_query, NoteStore, StoreError, StoreResult};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// `NoteStore` backed by a remote notes API.
#[derive(Debug, Clone)]
pub struct HttpNoteStore {
    client: Client,
    notes_url: String,
}

impl HttpNoteStore {
    /// Builds a store from client configuration.
    pub fn new(config: &ClientConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| StoreError::transport(format!("failed to build http client: {err}")))?;
        Ok(Self::with_client(client, &config.api_url()))
    }

    /// Builds a store from an existing client and absolute API base URL.
    pub fn with_client(client: Client, api_url: &str) -> Self {
        Self {
            client,
            notes_url: format!("{}/notes", api_url.trim_end_matches('/')),
        }
    }

    /// Returns the collection URL (`{base}/notes`).
    pub fn notes_url(&self) -> &str {
        &self.notes_url
    }

    fn note_url(&self, id: &str) -> String {
        format!("{}/{}", self.notes_url, urlencoding::encode(id))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> StoreResult<reqwest::Response> {
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Transport {
            status: Some(status.as_u16()),
            message: body,
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> StoreResult<T> {
        self.send(request, id)
            .await?
            .json::<T>()
            .await
            .map_err(|err| StoreError::transport(format!("invalid notes payload: {err}")))
    }
}

#[async_trait]
impl NoteStore for HttpNoteStore {
    async fn list(&self, query: Option<&str>) -> StoreResult<Vec<Note>> {
        let mut request = self.client.get(&self.notes_url);
        if let Some(q) = normalize_query(query) {
            request = request.query(&[("q", q)]);
        }
        let notes: Vec<Note> = self.send_json(request, None).await?;
        debug!(
            "event=notes_list module=store status=ok count={} filtered={}",
            notes.len(),
            normalize_query(query).is_some()
        );
        Ok(notes)
    }

    async fn get(&self, id: &str) -> StoreResult<Note> {
        self.send_json(self.client.get(self.note_url(id)), Some(id))
            .await
    }

    async fn create(&self, note: &Note) -> StoreResult<Note> {
        let created: Note = self
            .send_json(self.client.post(&self.notes_url).json(note), None)
            .await?;
        debug!(
            "event=note_create module=store status=ok id={}",
            created.id().unwrap_or("-")
        );
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &NotePatch) -> StoreResult<Note> {
        self.send_json(self.client.put(self.note_url(id)).json(patch), Some(id))
            .await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let sent = self
            .send(self.client.delete(self.note_url(id)), Some(id))
            .await;
        match sent {
            Ok(_) => debug!("event=note_delete module=store status=ok id={id}"),
            Err(StoreError::NotFound(_)) => {
                debug!("event=note_delete module=store status=ok id={id} already_gone=true")
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}
