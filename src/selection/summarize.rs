use crate::config::EngineConfig;
use crate::document::Page;
use crate::generation::{GenerationError, GenerationRequest, Generator};

use super::budgeting::{concat_pages, truncate_chars};

/// Condenses an over-budget page selection through the generation service.
#[derive(Debug, Clone)]
pub struct Summarizer {
    model: String,
    temperature: f32,
    max_tokens: u32,
    input_limit: usize,
    word_limit: usize,
}

impl Summarizer {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.summary_max_tokens,
            input_limit: config.summary_input_limit,
            word_limit: config.summary_word_limit,
        }
    }

    /// The request sent for `pages`: at most `input_limit` characters of
    /// their concatenated text.
    pub fn request(&self, pages: &[&Page]) -> GenerationRequest {
        let text = concat_pages(pages);
        let excerpt = truncate_chars(&text, self.input_limit);
        let prompt = format!(
            "Summarize the following content in at most {} words, keeping the key points: {}",
            self.word_limit, excerpt
        );

        GenerationRequest::single(&self.model, prompt, self.temperature, self.max_tokens)
    }

    pub fn summarize(
        &self,
        generator: &dyn Generator,
        pages: &[&Page],
    ) -> Result<String, GenerationError> {
        let summary = generator.generate(&self.request(pages))?;
        tracing::info!(chars = summary.chars().count(), "Summary generated");
        Ok(summary)
    }
}
