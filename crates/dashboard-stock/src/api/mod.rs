//! Market data sources

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::table::RawMarketTable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A provider of daily OHLCV history for several tickers at once
///
/// One call is one fetch attempt. Implementations return whatever rows they
/// obtained; the fetcher decides whether an empty table counts as a failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Daily history for `tickers` between `start` and `end`
    async fn fetch_history(
        &self,
        tickers: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RawMarketTable>;
}
