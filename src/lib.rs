//! Document-grounded chat engine for uploaded course material.
//!
//! `docchat-core` extracts page text from PDF and slide-deck uploads, detects
//! structural sections, keeps per-session document registries, resolves each
//! query to a page subsequence, enforces character budgets (summarizing
//! through the generation service when needed), and assembles the final
//! instruction for one of three intents: quiz, document question, or general
//! question.
//!
//! Selection and prompt assembly are deterministic: identical documents and
//! queries produce identical context windows and instructions. Only the
//! generation service is non-deterministic, and it sits behind the
//! [`generation::Generator`] trait.

pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod generation;
pub mod prompt;
pub mod selection;
pub mod service;
pub mod session;
pub mod types;

pub use config::EngineConfig;
pub use error::{ChatError, ErrorBody};
pub use service::DocumentChat;
