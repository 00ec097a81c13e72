//! OpenAI-compatible chat-completions payloads.

use serde::Deserialize;

use super::{GenerationError, GenerationRequest};

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// The request body is the request itself; field names already match.
pub fn request_body(request: &GenerationRequest) -> Result<serde_json::Value, GenerationError> {
    serde_json::to_value(request).map_err(|e| GenerationError::Unavailable(e.to_string()))
}

/// Text of the first choice.
pub fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Unavailable(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::Unavailable("response has no content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_carries_model_parameters() {
        let request = GenerationRequest::single("m", "hello", 0.5, 64);
        let body = request_body(&request).unwrap();

        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["max_tokens"], 64);
    }

    #[test]
    fn first_choice_content_is_returned() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Answer"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Answer");
    }

    #[test]
    fn empty_choices_are_unavailable() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(GenerationError::Unavailable(_))
        ));
        assert!(parse_completion("not json").is_err());
    }
}
