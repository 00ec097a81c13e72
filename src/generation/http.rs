use reqwest::blocking::Client;

use super::wire::{parse_completion, request_body};
use super::{GenerationError, GenerationRequest, Generator};

pub const TOGETHER_ENDPOINT: &str = "https://api.together.xyz/v1/chat/completions";

/// Blocking client for an OpenAI-compatible chat-completions endpoint.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpGenerator {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

impl Generator for HttpGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = request_body(request)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        if !status.is_success() {
            tracing::error!(%status, model = %request.model, "Generation request rejected");
            return Err(GenerationError::Unavailable(format!("HTTP {status}: {text}")));
        }

        parse_completion(&text)
    }
}
