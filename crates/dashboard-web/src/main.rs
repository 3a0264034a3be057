//! Stock dashboard server
//!
//! Loads one year of prices for the tracked companies, renders their charts
//! and serves the dashboard with its chat assistant.
//!
//! # Usage
//!
//! ```bash
//! # Optional: enable the remote assistant
//! export OPENAI_API_KEY="sk-..."
//!
//! cargo run --bin stock-dashboard -- --port 5005
//! ```

use anyhow::Context;
use clap::Parser;
use dashboard_stock::{
    CompanyRegistry, MarketDataFetcher, MarketSnapshot, StockAssistant, StockConfig,
    YahooFinanceClient,
};
use dashboard_utils::ServerConfig;
use dashboard_web::{AppState, router};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "stock-dashboard")]
#[command(about = "Live stock dashboard with an AI assistant", long_about = None)]
struct Args {
    /// Address to bind (overrides DASHBOARD_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides DASHBOARD_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Days of history to load
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Skip the market data fetch and serve placeholders
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dashboard_utils::init_tracing();

    let args = Args::parse();

    let mut server = ServerConfig::from_env().context("invalid server configuration")?;
    if let Some(host) = args.host {
        server = server.with_host(host);
    }
    if let Some(port) = args.port {
        server = server.with_port(port);
    }

    let mut builder = StockConfig::builder().with_env_keys().from_env_model();
    if let Some(days) = args.lookback_days {
        builder = builder.lookback_days(days);
    }
    let config = builder.build().context("invalid dashboard configuration")?;
    info!(?config, "Starting stock dashboard");

    let registry = CompanyRegistry::default();
    let snapshot = if args.offline {
        warn!("Offline mode, skipping market data fetch");
        MarketSnapshot::empty(registry)
    } else {
        MarketSnapshot::load(
            &MarketDataFetcher::new(YahooFinanceClient::new(), &config),
            registry,
        )
        .await
    };

    let assistant = StockAssistant::from_config(&config)?;
    let state = AppState::new(snapshot, assistant)?;
    let app = router(state);

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(%address, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
