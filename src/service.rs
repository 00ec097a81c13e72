//! Upload, chat and section listing, composed from the engine stages.
//!
//! Transport concerns (routing, CORS, templates, reading the session id off
//! the request) stay with the caller; see [`SessionId::resolve`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::config::EngineConfig;
use crate::document::{DocumentVersion, HeuristicDetector};
use crate::error::{ChatError, InputError};
use crate::extraction::{DocumentKind, Extraction, Extractor, ScratchSpace};
use crate::generation::{GenerationRequest, Generator};
use crate::prompt::{Prompt, PromptBuilder};
use crate::selection::{BudgetEnforcer, ContextResolver};
use crate::session::SessionStore;
use crate::types::context_bundle::{ContextWindow, Query};
use crate::types::identifiers::SessionId;

pub const CHAT_PAGE: &str = "/chat.html";
pub const QUIZ_PAGE: &str = "/Do-A-Test.html";

/// An uploaded file as received from the transport.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
    /// Uploaded from the quiz page: plain-text message, quiz redirect.
    pub quiz_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub message: String,
    pub redirect: String,
    pub filename: String,
    pub pages: usize,
    pub sections: usize,
    pub version: DocumentVersion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionsRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub title: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionsResponse {
    pub sections: Vec<SectionEntry>,
}

/// Everything decided for one chat turn before the answer call.
#[derive(Debug, Clone)]
pub struct PreparedTurn {
    pub prompt: Prompt,
    /// Present when the session had a document with readable text.
    pub window: Option<ContextWindow>,
    pub filename: Option<String>,
}

pub struct DocumentChat<S, G> {
    store: Arc<S>,
    generator: G,
    extractor: Extractor<HeuristicDetector>,
    scratch: ScratchSpace,
    resolver: ContextResolver,
    enforcer: BudgetEnforcer,
    builder: PromptBuilder,
    config: EngineConfig,
}

impl<S, G> DocumentChat<S, G>
where
    S: SessionStore,
    G: Generator,
{
    pub fn new(store: Arc<S>, generator: G, scratch: ScratchSpace, config: EngineConfig) -> Self {
        Self {
            store,
            generator,
            extractor: Extractor::default(),
            scratch,
            resolver: ContextResolver::new(config.default_window),
            enforcer: BudgetEnforcer::from_config(&config),
            builder: PromptBuilder,
            config,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Extract an uploaded file and register it in the session.
    ///
    /// Nothing is registered unless extraction yields readable text.
    pub fn upload(&self, session_id: &SessionId, upload: Upload) -> Result<UploadReceipt, ChatError> {
        let declared = upload
            .filename
            .as_deref()
            .ok_or(InputError::MissingField("file"))?;
        if declared.is_empty() {
            return Err(InputError::EmptyFilename.into());
        }
        let kind = DocumentKind::from_filename(declared)?;
        let filename = sanitize_filename(declared).ok_or(InputError::EmptyFilename)?;

        tracing::info!(session_id = %session_id, %filename, %kind, bytes = upload.bytes.len(), "Upload received");

        let pages = match self.extractor.extract_upload(&self.scratch, kind, &upload.bytes)? {
            Extraction::Pages(pages) => pages,
            Extraction::NoReadableText { .. } => return Err(ChatError::NoReadableText(filename)),
        };

        let document = self.store.append_document(session_id, &filename, pages);

        let (message, redirect) = if upload.quiz_mode {
            (
                format!(
                    "File {filename} uploaded successfully. Select a section to ask questions or generate a quiz."
                ),
                QUIZ_PAGE,
            )
        } else {
            (
                format!(
                    "File **{filename}** uploaded successfully. Select a section to ask questions or generate a quiz."
                ),
                CHAT_PAGE,
            )
        };

        Ok(UploadReceipt {
            message,
            redirect: redirect.to_string(),
            pages: document.page_count(),
            sections: document.section_count(),
            version: document.version.clone(),
            filename,
        })
    }

    /// Resolve the target document, select and budget its context, and
    /// assemble the instruction.
    pub fn prepare(&self, session_id: &SessionId, message: &str) -> PreparedTurn {
        let query = Query::new(message);

        let document = self
            .store
            .resolve_document(session_id, &query.raw)
            .filter(|doc| doc.has_readable_text());

        let Some(document) = document else {
            tracing::info!(session_id = %session_id, "No document context for query");
            return PreparedTurn {
                prompt: self.builder.build(&query, None),
                window: None,
                filename: None,
            };
        };

        let selection = self.resolver.resolve(document.pages(), &query);
        let mut window = self.enforcer.build_window(&selection, &self.generator);
        let prompt = self
            .enforcer
            .fit_prompt(&self.builder, &query, &document.filename, &mut window);

        PreparedTurn {
            prompt,
            window: Some(window),
            filename: Some(document.filename.clone()),
        }
    }

    /// Answer one message. Generation failures are surfaced, not retried.
    pub fn chat(&self, session_id: &SessionId, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let message = request
            .message
            .as_deref()
            .ok_or(InputError::MissingField("message"))?;

        let turn = self.prepare(session_id, message);
        let generation = GenerationRequest::single(
            &self.config.model,
            turn.prompt.text,
            self.config.temperature,
            self.config.answer_max_tokens,
        );

        let response = self
            .generator
            .generate(&generation)
            .inspect_err(|e| tracing::error!(session_id = %session_id, error = %e, "Answer generation failed"))?;

        tracing::info!(session_id = %session_id, chars = response.chars().count(), "Answer generated");
        Ok(ChatReply { response })
    }

    /// Sections of one uploaded file, in page order.
    pub fn sections(
        &self,
        session_id: &SessionId,
        request: &SectionsRequest,
    ) -> Result<SectionsResponse, ChatError> {
        let filename = request
            .filename
            .as_deref()
            .ok_or(InputError::MissingField("filename"))?;

        let document = self.store.resolve_document_by_name(session_id, filename)?;
        let sections: Vec<SectionEntry> = document
            .section_index()
            .map(|(title, page)| SectionEntry {
                title: title.to_string(),
                page,
            })
            .collect();

        tracing::info!(%filename, count = sections.len(), "Sections listed");
        Ok(SectionsResponse { sections })
    }
}

/// Last path component folded to ASCII (NFKD, combining marks dropped) and
/// reduced to `[A-Za-z0-9._-]`. Whitespace runs become `_`, and leading or
/// trailing dots and underscores are dropped.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let folded: String = base.nfkd().collect();
    let joined = folded.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(['.', '_']);

    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
