pub mod context_bundle;
pub mod identifiers;

pub use context_bundle::{ContextSource, ContextWindow, PageSelection, Query, SelectionRule};
pub use identifiers::{DocumentVersion, SessionId, SessionIdSource};
