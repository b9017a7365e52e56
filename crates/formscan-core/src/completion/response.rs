//! Completion response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response from a single completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Request ID this response corresponds to.
    pub request_id: Uuid,
    /// The generated content.
    pub content: String,
    /// Tokens consumed by prompt and completion, when reported.
    #[serde(default)]
    pub total_tokens: Option<u32>,
}

impl CompletionResponse {
    /// Create a new response with the given content.
    pub fn new(request_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            request_id,
            content: content.into(),
            total_tokens: None,
        }
    }

    /// Set the token usage.
    pub fn with_total_tokens(mut self, total_tokens: u32) -> Self {
        self.total_tokens = Some(total_tokens);
        self
    }
}
