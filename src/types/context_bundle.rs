use serde::{Deserialize, Serialize};

use crate::document::Page;

/// A user query as typed, plus its lower-cased form.
/// All keyword and pattern matching runs on `lowered`; templates embed `raw`.
#[derive(Debug, Clone)]
pub struct Query {
    pub raw: String,
    pub lowered: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let lowered = raw.to_lowercase();

        Self { raw, lowered }
    }
}

/// Which resolution rule produced a page selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SelectionRule {
    PageRange { start: u32, end: u32 },
    SectionReference { reference: String },
    DefaultWindow { size: usize },
}

/// Internal: pages chosen for a query, borrowed from the document.
#[derive(Debug, Clone)]
pub struct PageSelection<'a> {
    pub pages: Vec<&'a Page>,
    pub rule: SelectionRule,
}

impl PageSelection<'_> {
    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.page_number()).collect()
    }
}

/// How the context text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Selected pages fit the budget and were concatenated verbatim.
    Raw,
    /// Selected pages overflowed the budget and were summarized.
    Summary,
    /// Summarization failed; the raw concatenation was hard-cut to the budget.
    TruncatedFallback,
}

/// The page-text subset supplied to the generation call for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub pages: Vec<u32>,
    pub selection: SelectionRule,
    pub source: ContextSource,
    pub chars: usize,
    pub text: String,
}
