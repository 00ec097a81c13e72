use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use super::{DocumentKind, ExtractionError, PageReader, RawPage};

/// Paged documents via `lopdf`, one text extraction per page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReader;

impl PageReader for PdfReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<RawPage>, ExtractionError> {
        // lopdf and its font decoding can panic on malformed input.
        let document = match catch_unwind(AssertUnwindSafe(|| lopdf::Document::load(path))) {
            Ok(Ok(document)) => document,
            Ok(Err(e)) => return Err(corrupt(e.to_string())),
            Err(_panic) => return Err(corrupt("parser panicked".to_string())),
        };

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        tracing::debug!(pages = page_numbers.len(), path = %path.display(), "PDF opened");

        let pages = page_numbers
            .into_iter()
            .map(|number| {
                match catch_unwind(AssertUnwindSafe(|| document.extract_text(&[number]))) {
                    Ok(Ok(text)) => RawPage::from_text(text),
                    Ok(Err(e)) => {
                        tracing::warn!(page = number, error = %e, "PDF page unreadable");
                        RawPage::unreadable()
                    }
                    Err(_panic) => {
                        tracing::warn!(page = number, "PDF page extraction panicked");
                        RawPage::unreadable()
                    }
                }
            })
            .collect();

        Ok(pages)
    }
}

fn corrupt(reason: String) -> ExtractionError {
    ExtractionError::Corrupt {
        kind: DocumentKind::Pdf,
        reason,
    }
}
