//! Resilient one-year history fetch

use crate::api::MarketDataSource;
use crate::config::StockConfig;
use crate::error::StockError;
use crate::retry::RetryPolicy;
use crate::table::RawMarketTable;
use chrono::{Duration, Utc};
use tracing::{error, info};

/// Fetches trailing daily history through a [`MarketDataSource`], retrying
/// with exponential backoff
///
/// A fetch never fails: when every attempt errors or comes back empty the
/// result is [`RawMarketTable::empty`].
pub struct MarketDataFetcher<S> {
    source: S,
    policy: RetryPolicy,
    lookback_days: u32,
}

impl<S: MarketDataSource> MarketDataFetcher<S> {
    /// Fetcher using the configured retry policy and lookback window
    pub fn new(source: S, config: &StockConfig) -> Self {
        Self {
            source,
            policy: config.retry_policy(),
            lookback_days: config.lookback_days,
        }
    }

    /// Override the retry policy
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the lookback window ending now for every ticker
    pub async fn fetch(&self, tickers: &[String]) -> RawMarketTable {
        let end = Utc::now();
        let start = end - Duration::days(i64::from(self.lookback_days));
        info!(
            tickers = %tickers.join(","),
            start = %start.date_naive(),
            end = %end.date_naive(),
            "Fetching market data"
        );

        let source = &self.source;
        let outcome = self
            .policy
            .execute("fetch_stock_data", || async move {
                let table = source.fetch_history(tickers, start, end).await?;
                if table.is_empty() {
                    return Err(StockError::DataUnavailable {
                        symbol: tickers.join(","),
                        reason: "empty result".to_string(),
                    });
                }
                Ok::<_, StockError>(table)
            })
            .await;

        match outcome {
            Some(Ok(table)) => {
                info!(rows = table.row_count(), "Market data fetched");
                table
            }
            Some(Err(e)) => {
                error!(
                    error = %e,
                    attempts = self.policy.max_attempts,
                    "Failed to fetch market data after retries"
                );
                RawMarketTable::empty()
            }
            None => {
                error!("Market data fetch configured with zero attempts");
                RawMarketTable::empty()
            }
        }
    }
}
