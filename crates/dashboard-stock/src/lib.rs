//! Market data pipeline for the stock dashboard
//!
//! This crate turns one year of daily prices for a fixed set of companies
//! into everything the web front end serves:
//!
//! - Resilient fetching from Yahoo Finance with exponential backoff
//! - Per-company tables with MA20, MA50 and 20-day volatility
//! - Plotly chart fragments, with placeholders for missing data
//! - A chat assistant backed by OpenAI, falling back to local keyword answers
//!
//! # Example
//!
//! ```rust,ignore
//! use dashboard_stock::{
//!     CompanyRegistry, MarketDataFetcher, MarketSnapshot, StockAssistant, StockConfig,
//!     YahooFinanceClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env_keys().build()?;
//!     let fetcher = MarketDataFetcher::new(YahooFinanceClient::new(), &config);
//!     let snapshot = MarketSnapshot::load(&fetcher, CompanyRegistry::default()).await;
//!
//!     let assistant = StockAssistant::from_config(&config)?;
//!     let answer = assistant.respond("What is the trend for Apple?", &snapshot).await;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod assistant;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod registry;
pub mod retry;
pub mod snapshot;
pub mod table;

pub use api::{MarketDataSource, YahooFinanceClient};
pub use assistant::{Answer, AnswerSource, LocalResponder, RemoteResponder, StockAssistant};
pub use chart::{ChartFragment, FragmentKind, render_chart};
pub use config::{StockConfig, StockConfigBuilder};
pub use error::{Result, StockError};
pub use fetcher::MarketDataFetcher;
pub use registry::{COMPANIES, Company, CompanyRegistry};
pub use retry::RetryPolicy;
pub use snapshot::{CompanySnapshot, MarketSnapshot, TickerSummary};
pub use table::{CompanyTable, DailyRow, PriceField, RawBar, RawMarketTable};
