//! Question answering for the dashboard chat widget
//!
//! The remote model is preferred when configured. Any remote failure falls
//! back to the local keyword responder; callers always get an answer.

pub mod local;
pub mod remote;

pub use local::{LocalResponder, Question};
pub use remote::RemoteResponder;

use crate::config::StockConfig;
use crate::error::Result;
use crate::snapshot::MarketSnapshot;
use tracing::{info, warn};

/// Which responder produced an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Remote,
    Local,
}

/// A reply to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Remote-first assistant with local fallback
#[derive(Debug, Clone, Default)]
pub struct StockAssistant {
    remote: Option<RemoteResponder>,
    local: LocalResponder,
}

impl StockAssistant {
    /// Assistant that only answers locally
    pub fn local_only() -> Self {
        Self::default()
    }

    /// Assistant that asks `remote` first
    pub fn with_remote(remote: RemoteResponder) -> Self {
        Self {
            remote: Some(remote),
            local: LocalResponder::new(),
        }
    }

    /// Remote-backed when the config carries an API key, local otherwise
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        Ok(match RemoteResponder::from_config(config)? {
            Some(remote) => {
                info!(model = %remote.model(), "Remote assistant enabled");
                Self::with_remote(remote)
            }
            None => {
                info!("No OpenAI API key configured, using local assistant");
                Self::local_only()
            }
        })
    }

    /// Whether a remote responder is configured
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Answer a question
    pub async fn respond(&self, text: &str, snapshot: &MarketSnapshot) -> Answer {
        if let Some(remote) = &self.remote {
            match remote.respond(text).await {
                Ok(answer) => {
                    return Answer {
                        text: answer,
                        source: AnswerSource::Remote,
                    };
                }
                Err(e) => {
                    warn!(error = %e, "Remote assistant failed, falling back to local answer");
                }
            }
        }

        Answer {
            text: self.local.respond(text, snapshot),
            source: AnswerSource::Local,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::remote::tests::StubProvider;
    use super::*;
    use crate::registry::CompanyRegistry;
    use crate::table::CompanyTable;
    use chrono::{Duration, NaiveDate};
    use dashboard_llm::LLMError;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn snapshot() -> MarketSnapshot {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut tables = HashMap::new();
        tables.insert(
            "Apple".to_string(),
            CompanyTable::from_closes([(start, 10.0), (start + Duration::days(1), 30.0)]),
        );
        MarketSnapshot::from_tables(CompanyRegistry::default(), tables)
    }

    #[tokio::test]
    async fn test_local_only() {
        let assistant = StockAssistant::local_only();
        assert!(!assistant.has_remote());

        let answer = assistant.respond("apple average", &snapshot()).await;
        assert_eq!(answer.source, AnswerSource::Local);
        assert_eq!(
            answer.text,
            "The average closing price of Apple over the past year was $20.00."
        );
    }

    #[tokio::test]
    async fn test_remote_answer_preferred() {
        let provider = Arc::new(StubProvider::answering("Apple looks fine."));
        let assistant =
            StockAssistant::with_remote(RemoteResponder::new(provider, &StockConfig::default()));

        let answer = assistant.respond("apple average", &snapshot()).await;
        assert_eq!(answer.source, AnswerSource::Remote);
        assert_eq!(answer.text, "Apple looks fine.");
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back() {
        let provider = Arc::new(StubProvider::failing(|| LLMError::AuthenticationFailed));
        let assistant =
            StockAssistant::with_remote(RemoteResponder::new(provider, &StockConfig::default()));

        let answer = assistant.respond("What is the highest of Apple?", &snapshot()).await;
        assert_eq!(answer.source, AnswerSource::Local);
        assert_eq!(
            answer.text,
            "The highest closing price of Apple in the past year was $30.00 on 2024-01-02."
        );
    }

    #[tokio::test]
    async fn test_empty_remote_answer_falls_back() {
        let provider = Arc::new(StubProvider::answering(""));
        let assistant =
            StockAssistant::with_remote(RemoteResponder::new(provider, &StockConfig::default()));

        let answer = assistant.respond("hello", &snapshot()).await;
        assert_eq!(answer.source, AnswerSource::Local);
        assert_eq!(answer.text, local::UNKNOWN_COMPANY_REPLY);
    }

    #[test]
    fn test_from_config_without_key() {
        let assistant = StockAssistant::from_config(&StockConfig::default()).unwrap();
        assert!(!assistant.has_remote());
    }
}
