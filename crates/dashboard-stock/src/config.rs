//! Configuration for the dashboard's data pipeline and assistant

use crate::error::{Result, StockError};
use crate::retry::RetryPolicy;
use dashboard_llm::providers::OpenAIConfig;
use std::fmt;
use std::time::Duration;

/// System prompt sent with every remote assistant request
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful stock market assistant.";

/// Configuration for fetching, analysis and the chat assistant
#[derive(Clone)]
pub struct StockConfig {
    /// Length of the trailing history window in calendar days
    pub lookback_days: u32,

    /// Total fetch attempts before giving up
    pub max_attempts: u32,

    /// Delay after the first failed attempt
    pub initial_retry_delay: Duration,

    /// Factor applied to the delay after each failure
    pub backoff_multiplier: f64,

    /// Chat model used by the remote assistant
    pub model: String,

    /// Output token cap for the remote assistant
    pub max_tokens: usize,

    /// Sampling temperature for the remote assistant
    pub temperature: f32,

    /// System prompt for the remote assistant
    pub system_prompt: String,

    /// Request timeout for the remote assistant
    pub llm_timeout: Duration,

    /// OpenAI API key (remote assistant disabled when absent)
    pub openai_api_key: Option<String>,

    /// OpenAI-compatible base URL override
    pub openai_api_base: Option<String>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            lookback_days: 365,
            max_attempts: 3,
            initial_retry_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            model: "gpt-4".to_string(),
            max_tokens: 300,
            temperature: 0.7,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            llm_timeout: Duration::from_secs(30),
            openai_api_key: None,
            openai_api_base: None,
        }
    }
}

impl fmt::Debug for StockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StockConfig")
            .field("lookback_days", &self.lookback_days)
            .field("max_attempts", &self.max_attempts)
            .field("initial_retry_delay", &self.initial_retry_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("llm_timeout", &self.llm_timeout)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_api_base", &self.openai_api_base)
            .finish_non_exhaustive()
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(StockError::ConfigError(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.lookback_days == 0 {
            return Err(StockError::ConfigError(
                "lookback_days must be greater than 0".to_string(),
            ));
        }

        if !(self.backoff_multiplier.is_finite() && self.backoff_multiplier > 0.0) {
            return Err(StockError::ConfigError(format!(
                "backoff_multiplier must be positive, got {}",
                self.backoff_multiplier
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    /// Retry policy for the market data fetch
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            self.initial_retry_delay,
            self.backoff_multiplier,
        )
    }

    /// Whether a remote assistant credential is configured
    pub fn has_remote_credentials(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Provider configuration for the remote assistant, if a key is set
    pub fn openai_config(&self) -> Option<OpenAIConfig> {
        let key = self.openai_api_key.as_ref()?;
        let mut config = OpenAIConfig::new(key.clone()).with_timeout(self.llm_timeout.as_secs());
        if let Some(base) = &self.openai_api_base {
            config = config.with_api_base(base.clone());
        }
        Some(config)
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    lookback_days: Option<u32>,
    max_attempts: Option<u32>,
    initial_retry_delay: Option<Duration>,
    backoff_multiplier: Option<f64>,
    model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    llm_timeout: Option<Duration>,
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
}

impl StockConfigBuilder {
    /// Set the trailing history window
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set total fetch attempts
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Set the delay after the first failed attempt
    pub fn initial_retry_delay(mut self, delay: Duration) -> Self {
        self.initial_retry_delay = Some(delay);
        self
    }

    /// Set the backoff multiplier
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the output token cap
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the remote assistant request timeout
    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    /// Set the OpenAI API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the OpenAI-compatible base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Load `OPENAI_API_KEY` and `OPENAI_API_BASE` from the environment
    pub fn with_env_keys(self) -> Self {
        self.with_keys_from(|key| std::env::var(key).ok())
    }

    /// Load `OPENAI_MODEL` from the environment
    pub fn from_env_model(self) -> Self {
        self.with_model_from(|key| std::env::var(key).ok())
    }

    /// Load credentials from an arbitrary variable lookup
    ///
    /// Blank values count as unset.
    pub fn with_keys_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = non_blank(lookup("OPENAI_API_KEY")) {
            self.openai_api_key = Some(key);
        }
        if let Some(base) = non_blank(lookup("OPENAI_API_BASE")) {
            self.openai_api_base = Some(base);
        }
        self
    }

    /// Load the model name from an arbitrary variable lookup
    pub fn with_model_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = non_blank(lookup("OPENAI_MODEL")) {
            self.model = Some(model);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            initial_retry_delay: self
                .initial_retry_delay
                .unwrap_or(defaults.initial_retry_delay),
            backoff_multiplier: self.backoff_multiplier.unwrap_or(defaults.backoff_multiplier),
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            system_prompt: self.system_prompt.unwrap_or(defaults.system_prompt),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            openai_api_key: self.openai_api_key,
            openai_api_base: self.openai_api_base,
        };

        config.validate()?;
        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
