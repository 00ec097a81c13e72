pub mod budgeting;
pub mod summarize;

use std::num::IntErrorKind;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EngineConfig;
use crate::document::section::KEYWORD_REFERENCE;
use crate::document::Page;
use crate::generation::Generator;
use crate::prompt::{Grounding, Intent, Prompt, PromptBuilder};
use crate::types::context_bundle::{ContextSource, ContextWindow, PageSelection, Query, SelectionRule};
pub use budgeting::{apply_budget, clamp_prompt, concat_pages, truncate_chars, BudgetResult, PromptFit};
pub use summarize::Summarizer;

static PAGE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:pages?|slides?|diapositives?)\s+(\d+)(?:\s*[-–]\s*(\d+))?")
        .expect("page range pattern is valid")
});

/// Maps a query onto a page subsequence of one document.
///
/// Rules, first applicable wins:
/// 1. explicit page range (`pages 3-5`, `slide 2`)
/// 2. structural reference (`chapter 2`): the first page carrying a matching
///    section, then following pages up to the next page with any section
/// 3. the first `default_window` pages
///
/// A range or reference that selects nothing falls through to the next rule,
/// so the result is non-empty whenever the document has a page.
#[derive(Debug, Clone)]
pub struct ContextResolver {
    default_window: usize,
}

impl Default for ContextResolver {
    fn default() -> Self {
        Self::new(EngineConfig::v0().default_window)
    }
}

impl ContextResolver {
    pub fn new(default_window: usize) -> Self {
        Self {
            default_window: default_window.max(1),
        }
    }

    pub fn resolve<'a>(&self, pages: &'a [Page], query: &Query) -> PageSelection<'a> {
        let selection = self
            .by_page_range(pages, &query.lowered)
            .or_else(|| self.by_section_reference(pages, &query.lowered))
            .unwrap_or_else(|| self.by_default_window(pages));

        tracing::info!(
            rule = ?selection.rule,
            pages = ?selection.page_numbers(),
            "Context pages selected"
        );
        selection
    }

    fn by_page_range<'a>(&self, pages: &'a [Page], lowered: &str) -> Option<PageSelection<'a>> {
        let caps = PAGE_RANGE.captures(lowered)?;
        let start: u32 = caps.get(1)?.as_str().parse().ok()?;
        let end: u32 = match caps.get(2) {
            Some(m) => parse_range_end(m.as_str())?,
            None => start,
        };

        let selected: Vec<&Page> = pages
            .iter()
            .filter(|p| (start..=end).contains(&p.page_number()))
            .collect();

        if selected.is_empty() {
            tracing::debug!(start, end, "Page range selects nothing, falling through");
            return None;
        }

        Some(PageSelection {
            pages: selected,
            rule: SelectionRule::PageRange { start, end },
        })
    }

    fn by_section_reference<'a>(&self, pages: &'a [Page], lowered: &str) -> Option<PageSelection<'a>> {
        let reference = KEYWORD_REFERENCE.find(lowered)?.as_str();

        let first = pages
            .iter()
            .position(|p| p.sections().iter().any(|s| s.matches_reference(reference)));
        let Some(first) = first else {
            tracing::debug!(reference, "No section matches reference, falling through");
            return None;
        };

        // Read until the next heading.
        let mut selected = vec![&pages[first]];
        selected.extend(pages[first + 1..].iter().take_while(|p| !p.has_sections()));

        Some(PageSelection {
            pages: selected,
            rule: SelectionRule::SectionReference {
                reference: reference.to_string(),
            },
        })
    }

    fn by_default_window<'a>(&self, pages: &'a [Page]) -> PageSelection<'a> {
        PageSelection {
            pages: pages.iter().take(self.default_window).collect(),
            rule: SelectionRule::DefaultWindow {
                size: self.default_window,
            },
        }
    }
}

/// An end past `u32::MAX` means "to the last page".
fn parse_range_end(digits: &str) -> Option<u32> {
    match digits.parse::<u32>() {
        Ok(end) => Some(end),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u32::MAX),
        Err(_) => None,
    }
}

/// Keeps the context window within `context_budget` characters and the
/// final instruction within `prompt_budget`.
#[derive(Debug, Clone)]
pub struct BudgetEnforcer {
    context_budget: usize,
    prompt_budget: usize,
    summarizer: Summarizer,
}

impl BudgetEnforcer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            context_budget: config.context_budget,
            prompt_budget: config.prompt_budget,
            summarizer: Summarizer::from_config(config),
        }
    }

    /// Concatenate the selection under the context budget. If the budget is
    /// hit, summarize the selected pages instead; if that call fails, use the
    /// hard-cut concatenation. Never fails.
    pub fn build_window(&self, selection: &PageSelection<'_>, generator: &dyn Generator) -> ContextWindow {
        let budgeted = apply_budget(&selection.pages, self.context_budget);
        tracing::info!(
            chars = budgeted.chars_used,
            budget = self.context_budget,
            pages_included = budgeted.pages_included,
            "Context text selected"
        );

        let (text, source) = if !budgeted.overflowed() {
            (budgeted.text, ContextSource::Raw)
        } else {
            tracing::info!(cut_at_page = ?budgeted.cut_at_page, "Context over budget, summarizing");
            match self.summarizer.summarize(generator, &selection.pages) {
                Ok(summary) => (summary, ContextSource::Summary),
                Err(e) => {
                    tracing::warn!(error = %e, "Summary failed, using truncated text");
                    (budgeted.text, ContextSource::TruncatedFallback)
                }
            }
        };

        ContextWindow {
            pages: selection.page_numbers(),
            selection: selection.rule.clone(),
            source,
            chars: text.chars().count(),
            text,
        }
    }

    /// Build the instruction and, if it exceeds the prompt budget, trim the
    /// embedded context by the overflow. `window` is updated to what was
    /// actually embedded.
    pub fn fit_prompt(
        &self,
        builder: &PromptBuilder,
        query: &Query,
        filename: &str,
        window: &mut ContextWindow,
    ) -> Prompt {
        let intent = Intent::classify(&query.lowered, true);
        if !intent.embeds_context() {
            return builder.build(query, Some(Grounding { filename, context: &window.text }));
        }

        let fit = clamp_prompt(&window.text, self.prompt_budget, |context| {
            builder.render(intent, query, Some(Grounding { filename, context }))
        });
        if fit.trimmed > 0 {
            window.chars = fit.context.chars().count();
            window.text = fit.context;
        }

        tracing::info!(?intent, chars = fit.prompt.chars().count(), "Prompt assembled");
        Prompt {
            intent,
            text: fit.prompt,
        }
    }
}
