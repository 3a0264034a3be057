//! Chat-completion backed answers

use crate::config::StockConfig;
use crate::error::{Result, StockError};
use dashboard_llm::providers::OpenAIProvider;
use dashboard_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::debug;

/// Forwards questions to a chat-completion model
#[derive(Clone)]
pub struct RemoteResponder {
    provider: Arc<dyn LLMProvider>,
    model: String,
    system_prompt: String,
    max_tokens: usize,
    temperature: f32,
}

impl std::fmt::Debug for RemoteResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteResponder")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl RemoteResponder {
    /// Wrap a provider, taking sampling settings from the config
    pub fn new(provider: Arc<dyn LLMProvider>, config: &StockConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// OpenAI-backed responder, or `None` when no API key is configured
    pub fn from_config(config: &StockConfig) -> Result<Option<Self>> {
        let Some(openai) = config.openai_config() else {
            return Ok(None);
        };
        let provider = OpenAIProvider::with_config(openai)?;
        Ok(Some(Self::new(Arc::new(provider), config)))
    }

    /// Model the responder asks
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn build_request(&self, text: &str) -> CompletionRequest {
        CompletionRequest::builder(self.model.clone())
            .system(self.system_prompt.clone())
            .add_message(Message::user(text))
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .build()
    }

    /// Ask the model; the answer is trimmed and must be non-empty
    pub async fn respond(&self, text: &str) -> Result<String> {
        let response = self.provider.complete(self.build_request(text)).await?;
        debug!(
            provider = %self.provider.name(),
            tokens = response.usage.total(),
            "Remote completion received"
        );

        let answer = response.message.text().trim();
        if answer.is_empty() {
            return Err(StockError::EmptyCompletion(self.provider.name().to_string()));
        }
        Ok(answer.to_string())
    }
}
