use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid budget: {0}")]
    InvalidBudget(&'static str),
}

// Serializable, comparable, explicit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Max characters of page text in the context window (`B`).
    pub context_budget: usize,
    /// Max characters of the full instruction string (`P`).
    pub prompt_budget: usize,
    /// Pages taken when the query names no range or section.
    pub default_window: usize,
    /// Characters of page text sent to the summarizer.
    pub summary_input_limit: usize,
    pub summary_word_limit: usize,
    pub model: String,
    pub temperature: f32,
    pub answer_max_tokens: u32,
    pub summary_max_tokens: u32,
}

impl EngineConfig {
    pub fn v0() -> Self {
        Self {
            context_budget: 6000,
            prompt_budget: 7000,
            default_window: 10,
            summary_input_limit: 10_000,
            summary_word_limit: 500,
            model: "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".into(),
            temperature: 0.7,
            answer_max_tokens: 1024,
            summary_max_tokens: 750,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context_budget == 0 {
            return Err(ConfigError::InvalidBudget("context_budget must be positive"));
        }
        if self.prompt_budget == 0 {
            return Err(ConfigError::InvalidBudget("prompt_budget must be positive"));
        }
        if self.default_window == 0 {
            return Err(ConfigError::InvalidBudget("default_window must be positive"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::v0()
    }
}
