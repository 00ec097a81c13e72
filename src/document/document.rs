use chrono::{DateTime, Utc};
use serde::Serialize;

use super::section::{finalize, Section, SectionDetector};
use crate::types::identifiers::DocumentVersion;

/// One page or slide: its text and the sections detected in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    page_number: u32,
    text: String,
    sections: Vec<Section>,
}

impl Page {
    /// Build a page and run section detection over its text.
    pub fn detect<D: SectionDetector + ?Sized>(
        page_number: u32,
        text: impl Into<String>,
        detector: &D,
    ) -> Self {
        let text = text.into();
        let sections = detector.detect(&text);

        Page {
            page_number,
            text,
            sections,
        }
    }

    /// Slide variant: a non-empty title placeholder is itself a section at
    /// offset 0, ahead of anything the detector finds.
    pub fn detect_slide<D: SectionDetector + ?Sized>(
        page_number: u32,
        text: impl Into<String>,
        title: Option<&str>,
        detector: &D,
    ) -> Self {
        let text = text.into();

        let mut candidates = Vec::new();
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            // The slide text begins with the trimmed title.
            if let Ok(section) = Section::new(title, 0, title.len(), &text) {
                candidates.push(section);
            }
        }
        candidates.extend(detector.detect(&text));

        Page {
            page_number,
            text,
            sections: finalize(candidates),
        }
    }

    /// A page whose text could not be read.
    pub fn unreadable(page_number: u32) -> Self {
        Page {
            page_number,
            text: String::new(),
            sections: Vec::new(),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn has_sections(&self) -> bool {
        !self.sections.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One uploaded file's extracted representation. Never mutated once built.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub filename: String,
    pub version: DocumentVersion,
    pub uploaded_at: DateTime<Utc>, // informational only
    pages: Vec<Page>,
}

impl Document {
    pub fn new(filename: impl Into<String>, pages: Vec<Page>) -> Self {
        let version = DocumentVersion::from_pages(pages.iter().map(Page::text));

        Document {
            filename: filename.into(),
            version,
            uploaded_at: Utc::now(),
            pages,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// True when at least one page has non-whitespace text.
    pub fn has_readable_text(&self) -> bool {
        self.pages.iter().any(|p| !p.is_blank())
    }

    pub fn section_count(&self) -> usize {
        self.pages.iter().map(|p| p.sections.len()).sum()
    }

    /// `(title, page_number)` pairs in page order, then section order.
    pub fn section_index(&self) -> impl Iterator<Item = (&str, u32)> {
        self.pages
            .iter()
            .flat_map(|p| p.sections.iter().map(move |s| (s.title(), p.page_number)))
    }
}
