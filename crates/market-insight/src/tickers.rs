//! Candidate Tickers
//!
//! The finite list of symbols a user may pick from.

use std::path::Path;

use crate::error::{InsightError, Result};
use crate::model::Ticker;

/// NIFTY large caps offered when no list file is configured
pub const NSE_LARGE_CAPS: &[&str] = &[
    "RELIANCE", "TCS", "HDFCBANK", "INFY", "ICICIBANK", "HINDUNILVR", "ITC", "SBIN",
    "BHARTIARTL", "KOTAKBANK", "LT", "WIPRO", "AXISBANK", "MARUTI", "M&M",
];

/// Ordered, de-duplicated set of selectable tickers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerUniverse {
    tickers: Vec<Ticker>,
}

impl TickerUniverse {
    pub fn builtin() -> Self {
        Self::from_symbols(NSE_LARGE_CAPS.iter().copied())
            .unwrap_or_else(|_| Self { tickers: Vec::new() })
    }

    /// Build from symbols, dropping duplicates and keeping first-seen order
    pub fn from_symbols<'a>(symbols: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut tickers: Vec<Ticker> = Vec::new();
        for symbol in symbols {
            let ticker = Ticker::parse(symbol)?;
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Ok(Self { tickers })
    }

    /// Parse a list with one symbol per line; blank lines and `#` comments are skipped
    pub fn parse(text: &str) -> Result<Self> {
        let universe = Self::from_symbols(
            text.lines()
                .map(|line| line.split('#').next().unwrap_or_default().trim())
                .filter(|line| !line.is_empty()),
        )?;

        if universe.is_empty() {
            return Err(InsightError::InvalidTicker("ticker list is empty".into()));
        }
        Ok(universe)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| InsightError::io(path, e))?;
        let universe = Self::parse(&text)?;
        tracing::info!(path = %path.display(), count = universe.len(), "ticker list loaded");
        Ok(universe)
    }

    /// Resolve user input to a listed ticker
    pub fn resolve(&self, raw: &str) -> Result<Ticker> {
        let ticker = Ticker::parse(raw)?;
        if self.tickers.contains(&ticker) {
            Ok(ticker)
        } else {
            Err(InsightError::InvalidTicker(raw.trim().to_string()))
        }
    }

    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl Default for TickerUniverse {
    fn default() -> Self {
        Self::builtin()
    }
}
