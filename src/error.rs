//! Operation-level error taxonomy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::generation::GenerationError;
use crate::types::identifiers::SessionId;

/// Missing or invalid caller input. Reported as-is, never retried, and no
/// state is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("No file selected")]
    EmptyFilename,
    #[error("Unsupported document type: {0}")]
    UnsupportedKind(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("Unknown session: {0}")]
    Session(SessionId),
    #[error("File {0} not found")]
    Document(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("No readable text was extracted from {0}")]
    NoReadableText(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl ChatError {
    /// Failure status for the transport layer.
    pub fn status(&self) -> u16 {
        match self {
            ChatError::Input(_) => 400,
            ChatError::NotFound(_) => 404,
            ChatError::NoReadableText(_) => 422,
            ChatError::Extraction(_) | ChatError::Generation(_) => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

/// `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
