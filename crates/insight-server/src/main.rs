//! NSE Market-Insight HTTP Server
//!
//! Axum server rendering a single page: pick a ticker, download its history
//! and read what the analytics agent makes of it.

mod config;
mod handlers;
mod page;
mod state;

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider};
use market_insight::{
    InsightSession, LlmAgentFactory, MarketDataProvider, StaticMarketData, TickerUniverse,
    YahooMarketData,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{MarketSource, ServerConfig};
use crate::page::PageRenderer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = ServerConfig::from_env()?;

    // Initialize LLM provider
    let provider = agent_runtime::build_provider(config.llm_provider)?;
    report_provider(provider.as_ref()).await;

    let market: Arc<dyn MarketDataProvider> = match config.market {
        MarketSource::Yahoo => Arc::new(YahooMarketData::new(config.yahoo.clone())),
        MarketSource::Static => {
            tracing::warn!("⚠ Using static market data - prices are not real");
            Arc::new(StaticMarketData::new())
        }
    };

    let tickers = match &config.tickers_file {
        Some(path) => TickerUniverse::load(path).await?,
        None => TickerUniverse::builtin(),
    };
    tracing::info!("{} tickers available", tickers.len());

    let agents = Arc::new(LlmAgentFactory::new(
        provider.clone(),
        GenerationOptions::for_model(&config.llm_model),
    ));
    let session = InsightSession::open(config.session.clone(), market, agents).await?;
    tracing::info!(
        data_dir = %session.data_dir().display(),
        plot_dir = %session.plot_dir().display(),
        cache = config.session.cache_insights,
        phase = %session.phase(),
        "session ready"
    );

    let state = AppState::new(session, tickers, PageRenderer::new()?, provider);
    let app = handlers::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 market insight running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /              - Insight page");
    tracing::info!("  POST /select        - Save Option");
    tracing::info!("  POST /clear         - Clear data and plots");
    tracing::info!("  GET  /plot/{{file}}   - Chart images");
    tracing::info!("  GET  /health        - Health check");
    tracing::info!("  GET  /api/tickers   - Candidate tickers");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn report_provider(provider: &dyn LlmProvider) {
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to {}", provider.name());
            if let Ok(models) = provider.list_models().await {
                tracing::debug!("{} models available", models.len());
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not available - insights will fail", provider.name());
        }
    }
}
