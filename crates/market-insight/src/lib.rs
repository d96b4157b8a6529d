//! # market-insight
//!
//! Pick an NSE ticker, download its daily history, and let an analytics
//! agent describe it, recommend analyses and draw charts.
//!
//! ## Working directories
//!
//! ```text
//! ┌──────────────┐  save_option   ┌──────────────┐  render   ┌──────────────┐
//! │    Empty     │ ─────────────▶ │  DataLoaded  │ ────────▶ │   Analyzed   │
//! │ data/ empty  │                │ data/X.csv   │           │ data/X.csv   │
//! │ plot/ empty  │ ◀───────────── │ plot/ empty  │           │ plot/*.svg   │
//! └──────────────┘     clear      └──────────────┘           └──────────────┘
//! ```
//!
//! The data directory never holds more than one dataset and the plot
//! directory only ever holds charts of that dataset. Both are written
//! exclusively through [`reconcile`].

pub mod cache;
pub mod dataset;
pub mod error;
pub mod insight;
pub mod market;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod tickers;

pub use error::{InsightError, Result};
pub use insight::{AnalyticsAgent, AnalyticsAgentFactory, InsightAdapter, LlmAgentFactory};
pub use market::{DataFetcher, MarketDataProvider, StaticMarketData, YahooConfig, YahooMarketData};
pub use model::{DatasetFile, InsightBundle, PlotOutcome, PriceBar, SessionPhase, Ticker};
pub use session::{InsightSession, InsightView, RenderState, SessionConfig};
pub use tickers::TickerUniverse;
