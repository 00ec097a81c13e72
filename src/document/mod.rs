pub mod document;
pub mod section;

pub use crate::types::identifiers::DocumentVersion;
pub use document::{Document, Page};
pub use section::{
    detect_sections, HeuristicDetector, Section, SectionDetector, SectionError,
    STRUCTURAL_KEYWORDS,
};
