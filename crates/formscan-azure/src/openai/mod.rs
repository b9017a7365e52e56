//! Azure OpenAI chat completions as a [`LanguageProvider`].

mod wire;

use std::fmt;

use formscan_core::{CompletionRequest, CompletionResponse, Context, LanguageProvider, ResponseFormat};
use tracing::{debug, info, warn};
use url::Url;

use self::wire::{ChatMessage, ChatRequest, ChatResponse, ResponseFormatBody};
use crate::client::read_json;
use crate::{AzClient, AzConfig, Error, Result, TRACING_TARGET_OPENAI};

/// Header carrying the Azure OpenAI resource key.
const API_KEY_HEADER: &str = "api-key";

/// Azure OpenAI chat client implementing [`LanguageProvider`].
#[derive(Clone)]
pub struct OpenAiChat {
    client: AzClient,
    deployment: String,
    api_version: String,
}

impl OpenAiChat {
    /// Deployment used when none is configured.
    pub const DEFAULT_DEPLOYMENT: &'static str = "gpt-4o";

    /// REST API version used when none is configured.
    pub const DEFAULT_API_VERSION: &'static str = "2024-02-01";

    /// Create a new provider for one model deployment.
    pub fn new(
        config: AzConfig,
        deployment: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self> {
        let deployment = deployment.into();
        if deployment.trim().is_empty() {
            return Err(Error::config("Missing model deployment name"));
        }

        Ok(Self {
            client: AzClient::new(config, API_KEY_HEADER)?,
            deployment,
            api_version: api_version.into(),
        })
    }

    /// Model deployment name.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Chat completions URL of the deployment.
    pub fn completions_url(&self) -> Url {
        let path = format!("openai/deployments/{}/chat/completions", self.deployment);
        self.client
            .config()
            .url(&path, &[("api-version", self.api_version.as_str())])
    }

    /// Sends one chat completion.
    pub async fn chat(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let url = self.completions_url();
        let body = chat_body(request);

        debug!(
            target: TRACING_TARGET_OPENAI,
            request_id = %request.request_id,
            deployment = %self.deployment,
            prompt_len = request.prompt.len(),
            response_format = %request.response_format,
            "Sending chat completion"
        );

        let response = self
            .client
            .execute_with_retry("chat", |http| http.post(url.clone()).json(&body))
            .await?;
        let reply: ChatResponse = read_json(response).await?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::invalid_response("Completion has no choices", None))?;

        if choice.finish_reason.as_deref() == Some("length") {
            warn!(
                target: TRACING_TARGET_OPENAI,
                request_id = %request.request_id,
                max_tokens = request.max_tokens,
                "Completion was cut off at the token limit"
            );
        }

        let content = choice
            .message
            .content
            .ok_or_else(|| Error::invalid_response("Completion has no content", None))?;

        let response = request.reply(content);
        Ok(match reply.usage {
            Some(usage) => response.with_total_tokens(usage.total_tokens),
            None => response,
        })
    }
}

/// Builds the request body: optional system message, then the prompt.
fn chat_body(request: &CompletionRequest) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.as_deref() {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.prompt,
    });

    ChatRequest {
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: match request.response_format {
            ResponseFormat::JsonObject => Some(ResponseFormatBody {
                kind: "json_object",
            }),
            ResponseFormat::Text => None,
        },
    }
}

impl fmt::Debug for OpenAiChat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiChat")
            .field("endpoint", &self.client.config().endpoint().as_str())
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl LanguageProvider for OpenAiChat {
    async fn complete(
        &self,
        context: &Context,
        request: &CompletionRequest,
    ) -> formscan_core::Result<CompletionResponse> {
        let response = self.chat(request).await?;

        info!(
            target: TRACING_TARGET_OPENAI,
            run_id = %context.run_id(),
            deployment = %self.deployment,
            total_tokens = response.total_tokens,
            "Chat completion received"
        );

        Ok(response)
    }
}
