//! Yahoo Finance market data

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

use super::MarketDataProvider;
use crate::error::{InsightError, Result};
use crate::model::{PriceBar, Ticker};

/// Decimal places kept from the provider's floating point prices
const PRICE_SCALE: u32 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YahooConfig {
    /// Exchange suffix appended to every symbol (".NS" for NSE, empty for US)
    pub suffix: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            suffix: ".NS".into(),
        }
    }
}

/// Full daily history from the Yahoo Finance chart API
pub struct YahooMarketData {
    config: YahooConfig,
}

impl YahooMarketData {
    pub const fn new(config: YahooConfig) -> Self {
        Self { config }
    }

    /// Symbol as Yahoo knows it ("TCS" -> "TCS.NS")
    pub fn provider_symbol(&self, ticker: &Ticker) -> String {
        let symbol = ticker.as_str();
        let suffix = self.config.suffix.trim();
        if suffix.is_empty() || symbol.starts_with('^') || symbol.ends_with(&suffix.to_uppercase()) {
            symbol.to_string()
        } else {
            format!("{symbol}{suffix}")
        }
    }

    fn price(value: f64) -> Decimal {
        Decimal::from_f64(value)
            .unwrap_or_default()
            .round_dp(PRICE_SCALE)
            .normalize()
    }

    fn convert(quote: &yahoo::Quote) -> Option<PriceBar> {
        #[allow(clippy::cast_possible_wrap)]
        let date = DateTime::<Utc>::from_timestamp(quote.timestamp as i64, 0)?.date_naive();
        Some(PriceBar {
            date,
            open: Self::price(quote.open),
            high: Self::price(quote.high),
            low: Self::price(quote.low),
            close: Self::price(quote.close),
            adj_close: Self::price(quote.adjclose),
            volume: quote.volume,
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooMarketData {
    async fn history(&self, symbol: &Ticker) -> Result<Vec<PriceBar>> {
        let provider_symbol = self.provider_symbol(symbol);
        let fail = |e: &dyn std::fmt::Display| InsightError::fetch(symbol.as_str(), e);

        let connector = yahoo::YahooConnector::new().map_err(|e| fail(&e))?;

        let start = OffsetDateTime::UNIX_EPOCH;
        let end = OffsetDateTime::now_utc();

        tracing::debug!(symbol = %provider_symbol, "requesting full price history");
        let response = connector
            .get_quote_history(&provider_symbol, start, end)
            .await
            .map_err(|e| fail(&e))?;
        let quotes = response.quotes().map_err(|e| fail(&e))?;

        Ok(quotes.iter().filter_map(Self::convert).collect())
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[test]
    fn test_provider_symbol_appends_suffix() {
        let yahoo = YahooMarketData::new(YahooConfig::default());
        assert_eq!(yahoo.provider_symbol(&ticker("TCS")), "TCS.NS");
        assert_eq!(yahoo.provider_symbol(&ticker("TCS.NS")), "TCS.NS");
        assert_eq!(yahoo.provider_symbol(&ticker("^NSEI")), "^NSEI");
    }

    #[test]
    fn test_provider_symbol_without_suffix() {
        let yahoo = YahooMarketData::new(YahooConfig {
            suffix: String::new(),
        });
        assert_eq!(yahoo.provider_symbol(&ticker("AAPL")), "AAPL");
    }

    #[test]
    fn test_price_rounding() {
        assert_eq!(YahooMarketData::price(3812.349_987_5).to_string(), "3812.35");
        assert_eq!(YahooMarketData::price(f64::NAN), Decimal::ZERO);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_history() {
        let yahoo = YahooMarketData::new(YahooConfig::default());
        let bars = yahoo.history(&ticker("TCS")).await.unwrap();
        assert!(!bars.is_empty());
    }
}
