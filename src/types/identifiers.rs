use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque per-client conversation key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

/// Where a resolved session id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIdSource {
    Body,
    Form,
    Header,
    Generated,
}

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        SessionId(value.into())
    }

    /// Fresh random token for clients that did not send one.
    pub fn generate() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }

    /// Resolve the session id from the transport, first non-empty wins:
    /// request body field, form field, request header, then a fresh token.
    pub fn resolve(
        body: Option<&str>,
        form: Option<&str>,
        header: Option<&str>,
    ) -> (Self, SessionIdSource) {
        let candidates = [
            (body, SessionIdSource::Body),
            (form, SessionIdSource::Form),
            (header, SessionIdSource::Header),
        ];

        let (id, source) = candidates
            .into_iter()
            .find_map(|(value, source)| match value {
                Some(v) if !v.is_empty() => Some((SessionId::new(v), source)),
                _ => None,
            })
            .unwrap_or_else(|| (SessionId::generate(), SessionIdSource::Generated));

        tracing::debug!(session_id = %id, ?source, "Resolved session id");
        (id, source)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content hash version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentVersion(String);

impl DocumentVersion {
    /// Hash of the extracted page texts, in page order.
    ///
    /// Each page is framed by its length so that moving text across a page
    /// break changes the version.
    pub fn from_pages<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let mut hasher = Sha256::new();
        for text in texts {
            hasher.update((text.len() as u64).to_le_bytes());
            hasher.update(text.as_bytes());
        }

        let hash = hasher.finalize();
        let hex = hex::encode(hash);

        DocumentVersion(format!("sha256:{hex}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
