//! Azure connection arguments.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{AzConfig, DocumentIntelligence, OpenAiChat, Result};

/// Connection settings for Azure AI Document Intelligence.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct DocumentIntelligenceArgs {
    /// Document Intelligence resource endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            id = "document_intelligence_endpoint",
            long = "document-intelligence-endpoint",
            env = "AZURE_DOCUMENT_INTELLIGENCE_ENDPOINT"
        )
    )]
    pub endpoint: String,

    /// Document Intelligence resource key
    #[cfg_attr(
        feature = "config",
        arg(
            id = "document_intelligence_key",
            long = "document-intelligence-key",
            env = "AZURE_DOCUMENT_INTELLIGENCE_KEY",
            hide_env_values = true
        )
    )]
    pub key: String,

    /// Document Intelligence REST API version
    #[cfg_attr(
        feature = "config",
        arg(
            id = "document_intelligence_api_version",
            long = "document-intelligence-api-version",
            env = "AZURE_DOCUMENT_INTELLIGENCE_API_VERSION",
            default_value = DocumentIntelligence::DEFAULT_API_VERSION
        )
    )]
    #[serde(default = "default_document_api_version")]
    pub api_version: String,
}

fn default_document_api_version() -> String {
    DocumentIntelligence::DEFAULT_API_VERSION.to_string()
}

impl DocumentIntelligenceArgs {
    /// Create settings with the default API version.
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            key: key.into(),
            api_version: default_document_api_version(),
        }
    }

    /// Builds the OCR provider.
    pub fn build(&self) -> Result<DocumentIntelligence> {
        let config = AzConfig::new(&self.endpoint, self.key.clone())?;
        DocumentIntelligence::new(config, self.api_version.clone())
    }
}

/// Connection settings for Azure OpenAI chat completions.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct OpenAiArgs {
    /// Azure OpenAI resource endpoint
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_endpoint",
            long = "openai-endpoint",
            env = "AZURE_OPENAI_ENDPOINT"
        )
    )]
    pub endpoint: String,

    /// Azure OpenAI resource key
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_key",
            long = "openai-key",
            env = "AZURE_OPENAI_KEY",
            hide_env_values = true
        )
    )]
    pub key: String,

    /// Chat model deployment name
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_model",
            long = "openai-model",
            env = "AZURE_OPENAI_MODEL",
            default_value = OpenAiChat::DEFAULT_DEPLOYMENT
        )
    )]
    #[serde(default = "default_model")]
    pub model: String,

    /// Azure OpenAI REST API version
    #[cfg_attr(
        feature = "config",
        arg(
            id = "openai_api_version",
            long = "openai-api-version",
            env = "AZURE_OPENAI_API_VERSION",
            default_value = OpenAiChat::DEFAULT_API_VERSION
        )
    )]
    #[serde(default = "default_openai_api_version")]
    pub api_version: String,
}

fn default_model() -> String {
    OpenAiChat::DEFAULT_DEPLOYMENT.to_string()
}

fn default_openai_api_version() -> String {
    OpenAiChat::DEFAULT_API_VERSION.to_string()
}

impl OpenAiArgs {
    /// Create settings with the default model and API version.
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            key: key.into(),
            model: default_model(),
            api_version: default_openai_api_version(),
        }
    }

    /// Set the model deployment.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builds the language provider.
    pub fn build(&self) -> Result<OpenAiChat> {
        let config = AzConfig::new(&self.endpoint, self.key.clone())?;
        OpenAiChat::new(config, self.model.clone(), self.api_version.clone())
    }
}

impl fmt::Debug for DocumentIntelligenceArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentIntelligenceArgs")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for OpenAiArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiArgs")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_defaults() {
        let args = OpenAiArgs::new("https://res.openai.azure.com", "k");
        assert_eq!(args.model, "gpt-4o");
        assert_eq!(args.api_version, "2024-02-01");

        let args = DocumentIntelligenceArgs::new("https://res.cognitiveservices.azure.com", "k");
        assert_eq!(args.api_version, "2024-11-30");
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"endpoint":"https://res.openai.azure.com","key":"k"}"#;
        let args: OpenAiArgs = serde_json::from_str(json).unwrap();
        assert_eq!(args.model, "gpt-4o");
    }

    #[test]
    fn test_build() {
        let chat = OpenAiArgs::new("https://res.openai.azure.com", "k")
            .with_model("gpt-4o-mini")
            .build()
            .unwrap();
        assert_eq!(chat.deployment(), "gpt-4o-mini");

        let missing = DocumentIntelligenceArgs::new("https://res.cognitiveservices.azure.com", "");
        assert!(matches!(missing.build(), Err(Error::Config { .. })));
    }
}
