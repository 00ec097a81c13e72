// Append-only:
// documents are never replaced or removed
// sessions are never evicted (no TTL, lives as long as the process)

use std::sync::Arc;

use dashmap::DashMap;

use crate::document::{Document, Page};
use crate::error::NotFoundError;
use crate::types::identifiers::SessionId;

/// Documents uploaded in one session, in upload order.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    documents: Vec<Arc<Document>>,
    last_document: Option<Arc<Document>>,
}

impl SessionState {
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn last_document(&self) -> Option<&Arc<Document>> {
        self.last_document.as_ref()
    }

    fn append(&mut self, document: Arc<Document>) {
        self.documents.push(document.clone());
        self.last_document = Some(document);
    }

    /// First document whose name appears in the query (case-insensitive),
    /// else the most recent upload.
    pub fn resolve(&self, query_text: &str) -> Option<Arc<Document>> {
        let query = query_text.to_lowercase();

        self.documents
            .iter()
            .find(|doc| query.contains(&doc.filename.to_lowercase()))
            .or(self.last_document.as_ref())
            .cloned()
    }

    /// First document with exactly this name.
    pub fn find(&self, filename: &str) -> Option<Arc<Document>> {
        self.documents
            .iter()
            .find(|doc| doc.filename == filename)
            .cloned()
    }
}

/// Per-session registry of uploaded documents.
///
/// Every read-modify-write on one session is atomic with respect to
/// concurrent reads of that session.
pub trait SessionStore: Send + Sync {
    /// Snapshot of the session, creating an empty one on first use.
    fn get_or_create(&self, session_id: &SessionId) -> SessionState;

    /// Register a new document and make it the session's most recent one.
    /// Duplicate filenames are distinct documents.
    fn append_document(&self, session_id: &SessionId, filename: &str, pages: Vec<Page>) -> Arc<Document>;

    fn resolve_document(&self, session_id: &SessionId, query_text: &str) -> Option<Arc<Document>>;

    fn resolve_document_by_name(
        &self,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<Arc<Document>, NotFoundError>;
}

/// Sharded in-memory store; sessions on different shards never contend.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get_or_create(&self, session_id: &SessionId) -> SessionState {
        self.sessions.entry(session_id.clone()).or_default().clone()
    }

    fn append_document(&self, session_id: &SessionId, filename: &str, pages: Vec<Page>) -> Arc<Document> {
        // Hash outside the shard lock.
        let document = Arc::new(Document::new(filename, pages));

        let mut state = self.sessions.entry(session_id.clone()).or_default();
        state.append(document.clone());

        tracing::info!(
            session_id = %session_id,
            filename = %document.filename,
            pages = document.page_count(),
            version = %document.version,
            documents = state.documents.len(),
            "Document registered"
        );
        document
    }

    fn resolve_document(&self, session_id: &SessionId, query_text: &str) -> Option<Arc<Document>> {
        let resolved = self
            .sessions
            .get(session_id)
            .and_then(|state| state.resolve(query_text));

        tracing::debug!(
            session_id = %session_id,
            filename = resolved.as_ref().map(|d| d.filename.as_str()).unwrap_or("none"),
            "Resolved target document"
        );
        resolved
    }

    fn resolve_document_by_name(
        &self,
        session_id: &SessionId,
        filename: &str,
    ) -> Result<Arc<Document>, NotFoundError> {
        let state = self
            .sessions
            .get(session_id)
            .ok_or_else(|| NotFoundError::Session(session_id.clone()))?;

        state
            .find(filename)
            .ok_or_else(|| NotFoundError::Document(filename.to_string()))
    }
}
