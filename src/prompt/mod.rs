//! Intent classification and instruction assembly.
//!
//! Every instruction is standalone: no prior turns are replayed, the only
//! state carried in is the document context.

pub mod templates;

use serde::{Deserialize, Serialize};

use crate::types::context_bundle::Query;

/// Query words that ask for a quiz.
pub const QUIZ_KEYWORDS: &[&str] = &["quiz", "test"];

/// Query words that ask about the uploaded document.
pub const DOCUMENT_KEYWORDS: &[&str] = &[
    "file", "document", "paper", "abstract", "summary", "résumé", "section", "chapter",
    "chapitre", "slide", "diapositive", "page",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Quiz,
    DocumentQa,
    GeneralQa,
}

impl Intent {
    /// Quiz > document-qa > general-qa. Without usable context every query
    /// is general-qa, whatever keywords it contains.
    pub fn classify(lowered_query: &str, has_context: bool) -> Self {
        let mentions = |words: &[&str]| words.iter().any(|w| lowered_query.contains(*w));

        if !has_context {
            Intent::GeneralQa
        } else if mentions(QUIZ_KEYWORDS) {
            Intent::Quiz
        } else if mentions(DOCUMENT_KEYWORDS) {
            Intent::DocumentQa
        } else {
            Intent::GeneralQa
        }
    }

    /// Whether the task template embeds the document context.
    pub fn embeds_context(&self) -> bool {
        matches!(self, Intent::Quiz | Intent::DocumentQa)
    }

    fn format_block(&self) -> &'static str {
        match self {
            Intent::Quiz => templates::PLAIN_QUIZ_FORMAT,
            Intent::DocumentQa | Intent::GeneralQa => templates::MARKDOWN_FORMAT,
        }
    }
}

/// Document context available to a prompt.
#[derive(Debug, Clone, Copy)]
pub struct Grounding<'a> {
    pub filename: &'a str,
    pub context: &'a str,
}

/// A finished instruction string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub intent: Intent,
    pub text: String,
}

impl Prompt {
    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Classify `query` and assemble its instruction.
    pub fn build(&self, query: &Query, grounding: Option<Grounding<'_>>) -> Prompt {
        let intent = Intent::classify(&query.lowered, grounding.is_some());
        let text = self.render(intent, query, grounding);

        tracing::info!(?intent, chars = text.chars().count(), "Prompt assembled");
        Prompt { intent, text }
    }

    /// Fill the template for an already-classified intent.
    pub fn render(&self, intent: Intent, query: &Query, grounding: Option<Grounding<'_>>) -> String {
        let format = intent.format_block();

        match (intent, grounding) {
            (Intent::Quiz, Some(g)) => templates::quiz(format, g.filename, g.context),
            (Intent::DocumentQa, Some(g)) => {
                templates::document_qa(format, g.filename, g.context, &query.raw)
            }
            _ => templates::general_qa(templates::MARKDOWN_FORMAT, &query.raw),
        }
    }
}
