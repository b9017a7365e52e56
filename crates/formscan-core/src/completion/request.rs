//! Completion request types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use super::response::CompletionResponse;

/// Output format requested from the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object.
    JsonObject,
}

/// Request for a single completion.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(
    name = "CompletionRequestBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(private, name = "build_inner", error = "CompletionRequestError")
)]
pub struct CompletionRequest {
    /// Unique identifier for this request.
    #[builder(default = "Uuid::now_v7()")]
    pub request_id: Uuid,
    /// System instructions.
    #[builder(default)]
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    /// Requested output format.
    #[builder(default)]
    pub response_format: ResponseFormat,
    /// Sampling temperature.
    #[builder(default)]
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens.
    #[builder(default)]
    pub max_tokens: Option<u32>,
}

/// Error type for CompletionRequest builder.
pub type CompletionRequestError = derive_builder::UninitializedFieldError;

impl CompletionRequestBuilder {
    /// Build the request.
    pub fn build(self) -> Result<CompletionRequest, CompletionRequestError> {
        self.build_inner()
    }
}

impl CompletionRequest {
    /// Create a new text request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            system: None,
            prompt: prompt.into(),
            response_format: ResponseFormat::Text,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Create a builder for this request.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// Returns true if the caller asked for a JSON object.
    pub fn wants_json(&self) -> bool {
        self.response_format == ResponseFormat::JsonObject
    }

    /// Create a response for this request with the given content.
    pub fn reply(&self, content: impl Into<String>) -> CompletionResponse {
        CompletionResponse::new(self.request_id, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = CompletionRequest::builder()
            .with_system("extract fields")
            .with_prompt("OCR text")
            .with_response_format(ResponseFormat::JsonObject)
            .with_temperature(0.0)
            .build()
            .unwrap();

        assert!(request.wants_json());
        assert_eq!(request.system.as_deref(), Some("extract fields"));
        assert_eq!(request.max_tokens, None);
    }

    #[test]
    fn test_reply_carries_request_id() {
        let request = CompletionRequest::new("hi");
        assert_eq!(request.reply("{}").request_id, request.request_id);
    }
}
