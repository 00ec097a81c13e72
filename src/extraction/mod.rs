//! Raw document bytes to page-indexed text.
//!
//! Container-level failures abort with [`ExtractionError`]. A page that
//! cannot be read degrades to empty text and extraction carries on. A file
//! where no page has readable text is reported as
//! [`Extraction::NoReadableText`], never as an empty success.

pub mod pdf;
pub mod scratch;
pub mod slides;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::{HeuristicDetector, Page, SectionDetector};
use crate::error::InputError;
pub use pdf::PdfReader;
pub use scratch::{ScratchSpace, StagedUpload};
pub use slides::SlideDeckReader;

/// Declared document kind, taken from the upload's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    SlideDeck,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Result<Self, InputError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "pptx" => Ok(DocumentKind::SlideDeck),
            _ => Err(InputError::UnsupportedKind(filename.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::SlideDeck => "pptx",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not parse {kind} file: {reason}")]
    Corrupt { kind: DocumentKind, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of a successful parse.
#[derive(Debug, Clone)]
pub enum Extraction {
    Pages(Vec<Page>),
    /// Every page was empty or whitespace after extraction.
    NoReadableText { kind: DocumentKind, page_count: usize },
}

/// Text of one page as read from the container, before section detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPage {
    /// `None` when the page could not be read.
    pub text: Option<String>,
    /// Slide title placeholder text, if any.
    pub title: Option<String>,
}

impl RawPage {
    pub fn from_text(text: impl Into<String>) -> Self {
        RawPage {
            text: Some(text.into()),
            title: None,
        }
    }

    pub fn unreadable() -> Self {
        RawPage::default()
    }
}

/// Reads the per-page text of one container format.
pub trait PageReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, ExtractionError>;
}

pub struct Extractor<D = HeuristicDetector> {
    detector: D,
}

impl Default for Extractor<HeuristicDetector> {
    fn default() -> Self {
        Self {
            detector: HeuristicDetector,
        }
    }
}

impl<D> Extractor<D>
where
    D: SectionDetector,
{
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// Stage `bytes` in `scratch`, extract, and release the staged file on
    /// every exit path.
    pub fn extract_upload(
        &self,
        scratch: &ScratchSpace,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<Extraction, ExtractionError> {
        let staged = scratch.stage(kind, bytes)?;
        let result = self.extract_file(kind, staged.path());

        if let Err(e) = staged.release() {
            tracing::warn!(error = %e, "Failed to remove staged upload");
        }
        result
    }

    pub fn extract_file(&self, kind: DocumentKind, path: &Path) -> Result<Extraction, ExtractionError> {
        let raw = match kind {
            DocumentKind::Pdf => PdfReader.read_pages(path),
            DocumentKind::SlideDeck => SlideDeckReader.read_pages(path),
        }
        .inspect_err(|e| tracing::error!(%kind, error = %e, "Extraction failed"))?;

        Ok(self.assemble(kind, raw))
    }

    /// Number pages from 1, detect sections, and tag the all-blank case.
    pub fn assemble(&self, kind: DocumentKind, raw: Vec<RawPage>) -> Extraction {
        let pages: Vec<Page> = raw
            .into_iter()
            .zip(1u32..)
            .map(|(raw, number)| match raw.text {
                None => Page::unreadable(number),
                Some(text) => {
                    tracing::info!(page = number, chars = text.chars().count(), "Page extracted");
                    match kind {
                        DocumentKind::Pdf => Page::detect(number, text, &self.detector),
                        DocumentKind::SlideDeck => {
                            Page::detect_slide(number, text, raw.title.as_deref(), &self.detector)
                        }
                    }
                }
            })
            .collect();

        if pages.iter().all(Page::is_blank) {
            tracing::warn!(%kind, pages = pages.len(), "No readable text extracted");
            return Extraction::NoReadableText {
                kind,
                page_count: pages.len(),
            };
        }

        tracing::info!(%kind, pages = pages.len(), "Extraction complete");
        Extraction::Pages(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("Notes.PDF"), Ok(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("deck.pptx"), Ok(DocumentKind::SlideDeck));
        assert!(DocumentKind::from_filename("deck.ppt").is_err());
        assert!(DocumentKind::from_filename("pdf").is_err());
    }

    #[test]
    fn unreadable_pages_keep_their_slot() {
        let extraction = Extractor::default().assemble(
            DocumentKind::Pdf,
            vec![RawPage::unreadable(), RawPage::from_text("Chapter 1 Basics")],
        );

        let Extraction::Pages(pages) = extraction else {
            panic!("expected pages");
        };
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number(), 1);
        assert!(pages[0].is_blank());
        assert!(pages[0].sections().is_empty());
        assert_eq!(pages[1].page_number(), 2);
        assert_eq!(pages[1].sections()[0].title(), "Chapter 1 Basics");
    }

    #[test]
    fn whitespace_only_is_no_readable_text() {
        let extraction = Extractor::default().assemble(
            DocumentKind::SlideDeck,
            vec![RawPage::from_text("  \n"), RawPage::unreadable()],
        );

        assert!(matches!(
            extraction,
            Extraction::NoReadableText {
                kind: DocumentKind::SlideDeck,
                page_count: 2
            }
        ));
    }
}
