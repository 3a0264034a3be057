//! Yahoo Finance market data source

use super::MarketDataSource;
use crate::error::{Result, StockError};
use crate::table::{PriceField, RawBar, RawMarketTable};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
///
/// Tickers are requested concurrently. A ticker that fails or returns no
/// quotes is left out of the combined table; only when every ticker comes
/// back empty is the attempt reported as failed.
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Daily bars for one symbol
    async fn fetch_symbol(
        provider: &yahoo::YahooConnector,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<RawBar>> {
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(RawBar {
                    open: finite(q.open),
                    high: finite(q.high),
                    low: finite(q.low),
                    close: finite(q.close),
                    volume: Some(q.volume as f64),
                    adj_close: finite(q.adjclose),
                    ..RawBar::new(date)
                })
            })
            .collect())
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn to_offset(ts: DateTime<Utc>, label: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ts.timestamp())
        .map_err(|e| StockError::YahooFinanceError(format!("Invalid {label} timestamp: {e}")))
}

#[async_trait]
impl MarketDataSource for YahooFinanceClient {
    async fn fetch_history(
        &self,
        tickers: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<RawMarketTable> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let start_odt = to_offset(start, "start")?;
        let end_odt = to_offset(end, "end")?;

        let results = join_all(
            tickers
                .iter()
                .map(|symbol| Self::fetch_symbol(&provider, symbol, start_odt, end_odt)),
        )
        .await;

        let mut table = RawMarketTable::with_fields(PriceField::ALL);
        for (symbol, result) in tickers.iter().zip(results) {
            match result {
                Ok(bars) if bars.is_empty() => {
                    warn!(symbol = %symbol, "No quotes returned");
                }
                Ok(bars) => {
                    debug!(symbol = %symbol, rows = bars.len(), "Fetched quote history");
                    table.insert_series(symbol.clone(), bars);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Quote history request failed");
                }
            }
        }

        if table.is_empty() {
            return Err(StockError::DataUnavailable {
                symbol: tickers.join(","),
                reason: "no quotes returned for any ticker".to_string(),
            });
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CompanyTable;

    #[test]
    fn test_finite_filter() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_history() {
        let client = YahooFinanceClient::new();
        let end = Utc::now();
        let start = end - chrono::Duration::days(30);
        let tickers = vec!["AAPL".to_string(), "MSFT".to_string()];

        let table = client.fetch_history(&tickers, start, end).await.unwrap();
        assert!(!table.is_empty());

        let apple = CompanyTable::from_raw(&table, "AAPL");
        assert!(!apple.is_empty());
        assert!(apple.defined_closes().all(|(_, c)| c > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_unknown_ticker_is_skipped() {
        let client = YahooFinanceClient::new();
        let end = Utc::now();
        let start = end - chrono::Duration::days(10);
        let tickers = vec!["AAPL".to_string(), "NOT-A-REAL-TICKER-XYZ".to_string()];

        let table = client.fetch_history(&tickers, start, end).await.unwrap();
        assert!(table.series("NOT-A-REAL-TICKER-XYZ").is_empty());
        assert!(!table.series("AAPL").is_empty());
    }
}
