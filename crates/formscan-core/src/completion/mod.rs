//! Generative language capability.

mod request;
mod response;

pub use request::{CompletionRequest, CompletionRequestBuilder, CompletionRequestError, ResponseFormat};
pub use response::CompletionResponse;

use crate::{Context, Result};

/// Trait for generative language backends.
///
/// Implement this trait to plug a chat-completion model into the field
/// interpreter.
#[async_trait::async_trait]
pub trait LanguageProvider: Send + Sync {
    /// Completes a prompt and returns the generated text.
    async fn complete(
        &self,
        context: &Context,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse>;
}
