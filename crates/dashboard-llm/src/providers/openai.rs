//! OpenAI provider implementation
//!
//! This module implements the LLMProvider trait for OpenAI's chat completion
//! API. See: https://platform.openai.com/docs/api-reference/chat
//!
//! Credentials are not read here; callers build an [`OpenAIConfig`] from
//! their own configuration.
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```no_run
//! use dashboard_llm::{CompletionRequest, Message, LLMProvider};
//! use dashboard_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::new("sk-..."))?;
//!
//!     let request = CompletionRequest::builder("gpt-4")
//!         .system("You are a helpful stock market assistant.")
//!         .add_message(Message::user("How did Tesla do this year?"))
//!         .max_tokens(300)
//!         .temperature(0.7)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Using with OpenAI-compatible APIs
//!
//! ```no_run
//! use dashboard_llm::providers::{OpenAIProvider, OpenAIConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // For local LLM deployments (e.g., llama.cpp, vLLM, LM Studio)
//! let local_config = OpenAIConfig::new("not-needed")
//!     .with_api_base("http://localhost:1234/v1")
//!     .with_timeout(60);
//!
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, Result, StopReason,
    TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication
    pub api_key: String,

    /// Base URL for the OpenAI API (default: "https://api.openai.com/v1")
    /// Can be customized for OpenAI-compatible APIs like Azure OpenAI, local deployments, etc.
    pub api_base: String,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create a new config with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// OpenAI provider
///
/// Works with GPT chat models (gpt-4, gpt-4o, gpt-3.5-turbo, ...) and with
/// any server exposing the same `/chat/completions` endpoint.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from a configuration
    ///
    /// A blank API key is a configuration error.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "OpenAI API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, api_base = %self.config.api_base))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!("Sending request to OpenAI API at {}", self.config.api_base);

        let openai_request = OpenAIRequest::from_request(request);
        let model = openai_request.model.clone();

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&openai_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;

            return Err(match status.as_u16() {
                401 => LLMError::AuthenticationFailed,
                429 => LLMError::RateLimitExceeded(error_text),
                400 => LLMError::InvalidRequest(error_text),
                404 => LLMError::ModelNotFound(model),
                _ => LLMError::RequestFailed(format!("HTTP {status}: {error_text}")),
            });
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        openai_response.into_completion()
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

impl OpenAIRequest {
    /// System prompt goes first in the messages array
    fn from_request(request: CompletionRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system,
            });
        }
        messages.extend(request.messages.into_iter().map(|m| OpenAIMessage {
            role: m.role.as_str().to_string(),
            content: m.content,
        }));

        Self {
            model: request.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

impl OpenAIResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let usage = self
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        // OpenAI can return multiple choices; only the first is used
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let finish_reason = choice.finish_reason.unwrap_or_default();
        debug!(
            "Received response - stop_reason: {}, tokens: {}/{}",
            finish_reason, usage.input_tokens, usage.output_tokens
        );

        Ok(CompletionResponse {
            message: Message::assistant(choice.message.content.unwrap_or_default()),
            stop_reason: map_stop_reason(&finish_reason),
            usage,
        })
    }
}

/// Map OpenAI finish reason to our format
fn map_stop_reason(reason: &str) -> StopReason {
    match reason {
        "stop" => StopReason::EndTurn,
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => {
            debug!("Unknown stop reason: {}", reason);
            StopReason::EndTurn
        }
    }
}
