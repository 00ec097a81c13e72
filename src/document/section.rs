use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Structural keywords that introduce a numbered division, including the
/// French spellings found in course material.
pub const STRUCTURAL_KEYWORDS: &[&str] = &[
    "chapitre", "chapter", "article", "section", "partie", "part", "titre", "title", "module",
    "unité", "unite", "unit",
];

fn keyword_alternation() -> String {
    STRUCTURAL_KEYWORDS.join("|")
}

/// Keyword followed by an arabic or upper-case roman numeral, as it appears
/// in page text. Only the keyword is case-insensitive.
static KEYWORD_HEADING: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i:\b(?:{})\b)\s+(?:\d+|[IVX]+)\b", keyword_alternation());
    Regex::new(&pattern).expect("keyword heading pattern is valid")
});

/// The same vocabulary matched against a lower-cased query.
pub(crate) static KEYWORD_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\s+(?:\d+|[ivx]+)\b", keyword_alternation());
    Regex::new(&pattern).expect("keyword reference pattern is valid")
});

/// Line-initial `12.` or a standalone roman numeral (`IV.`, `IV `).
static HEADING_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+\.|[IVX]+(?:\.|\b))[ \t]*").expect("heading prefix pattern is valid")
});

static BLANK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").expect("blank line pattern is valid"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    #[error("Empty span [{start}, {end})")]
    EmptySpan { start: usize, end: usize },
    #[error("Span end {end} is past the end of the page text ({len} bytes)")]
    OutOfBounds { end: usize, len: usize },
    #[error("Span boundary {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// A heuristically detected heading and the byte span it covers within
/// its page's text. `0 <= start < end <= text.len()` holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    title: String,
    start: usize,
    end: usize,
}

impl Section {
    pub fn new(
        title: impl Into<String>,
        start: usize,
        end: usize,
        text: &str,
    ) -> Result<Self, SectionError> {
        if start >= end {
            return Err(SectionError::EmptySpan { start, end });
        }
        if end > text.len() {
            return Err(SectionError::OutOfBounds {
                end,
                len: text.len(),
            });
        }
        for offset in [start, end] {
            if !text.is_char_boundary(offset) {
                return Err(SectionError::NotCharBoundary(offset));
            }
        }

        Ok(Section {
            title: title.into(),
            start,
            end,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Case-insensitive prefix match that must end on a word boundary of
    /// the title, so `chapter 1` does not claim `Chapter 12`.
    pub fn matches_reference(&self, reference: &str) -> bool {
        let title = normalize_whitespace(&self.title.to_lowercase());
        let reference = normalize_whitespace(&reference.to_lowercase());
        if reference.is_empty() {
            return false;
        }

        match title.strip_prefix(reference.as_str()) {
            Some(rest) => !rest.starts_with(|c: char| c.is_alphanumeric()),
            None => false,
        }
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns one page's text into tagged spans.
pub trait SectionDetector {
    fn detect(&self, text: &str) -> Vec<Section>;
}

/// Keyword pass plus heading-heuristic pass.
///
/// Spans may overlap or nest; the detector favours recall and leaves
/// overlap handling to consumers.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicDetector;

impl SectionDetector for HeuristicDetector {
    fn detect(&self, text: &str) -> Vec<Section> {
        let mut found = keyword_pass(text);
        found.extend(heading_pass(text));

        let sections = finalize(found);
        if !sections.is_empty() {
            tracing::debug!(
                titles = ?sections.iter().map(Section::title).collect::<Vec<_>>(),
                "Sections detected"
            );
        }
        sections
    }
}

/// Detect with the default heuristics.
pub fn detect_sections(text: &str) -> Vec<Section> {
    HeuristicDetector.detect(text)
}

/// Drop repeated titles (first occurrence wins), then order by start offset.
pub(crate) fn finalize(candidates: Vec<Section>) -> Vec<Section> {
    let mut seen = BTreeSet::new();
    let mut sections: Vec<Section> = candidates
        .into_iter()
        .filter(|s| seen.insert(s.title.clone()))
        .collect();

    // Stable: ties keep detection order.
    sections.sort_by_key(|s| s.start);
    sections
}

/// Each keyword match spans up to the next keyword match or end of text.
fn keyword_pass(text: &str) -> Vec<Section> {
    let starts: Vec<usize> = KEYWORD_HEADING.find_iter(text).map(|m| m.start()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            let title = text[start..end].lines().next().unwrap_or_default().trim();
            Section::new(title, start, end, text).ok()
        })
        .collect()
}

/// Numbered lines: an all-caps remainder is a one-line heading, anything
/// else runs to the next blank line.
fn heading_pass(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut offset = 0;

    for raw_line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw_line.len();

        let line = raw_line.trim_end_matches(['\n', '\r']);
        let Some(prefix) = HEADING_PREFIX.find(line) else {
            continue;
        };
        let rest = line[prefix.end()..].trim_end();
        if rest.is_empty() {
            continue;
        }

        let end = if is_upper_heading(rest) {
            line_start + line.trim_end().len()
        } else {
            let tail = &text[line_start..];
            line_start + BLANK_LINE.find(tail).map_or(tail.len(), |m| m.start())
        };

        let title = text[line_start..end].trim();
        if let Ok(section) = Section::new(title, line_start, end, text) {
            sections.push(section);
        }
    }

    sections
}

fn is_upper_heading(rest: &str) -> bool {
    let len = rest.chars().count();
    let mut chars = rest.chars();
    let starts_upper = chars.next().is_some_and(|c| c.is_uppercase());

    starts_upper
        && (6..=50).contains(&len)
        && chars.all(|c| c.is_whitespace() || (c.is_alphabetic() && !c.is_lowercase()))
}
