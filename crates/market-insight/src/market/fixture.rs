//! Static Market Data
//!
//! For demos and testing. Generates deterministic daily bars from a table of
//! reference prices, without touching the network.

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::MarketDataProvider;
use crate::error::{InsightError, Result};
use crate::model::{PriceBar, Ticker};

/// Offline provider with deterministic prices
pub struct StaticMarketData {
    rows: usize,
    start: NaiveDate,
}

impl Default for StaticMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self {
            rows: 250,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        }
    }

    /// Number of trading days to generate
    pub const fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Reference price for a symbol
    fn base_price(symbol: &str) -> Option<Decimal> {
        match symbol {
            "RELIANCE" => Some(dec!(2950)),
            "TCS" => Some(dec!(3850)),
            "HDFCBANK" => Some(dec!(1650)),
            "INFY" => Some(dec!(1520)),
            "ICICIBANK" => Some(dec!(1120)),
            "HINDUNILVR" => Some(dec!(2410)),
            "ITC" => Some(dec!(435)),
            "SBIN" => Some(dec!(780)),
            "BHARTIARTL" => Some(dec!(1330)),
            "KOTAKBANK" => Some(dec!(1740)),
            "LT" => Some(dec!(3560)),
            "WIPRO" => Some(dec!(480)),
            "AXISBANK" => Some(dec!(1090)),
            "MARUTI" => Some(dec!(12150)),
            "M&M" => Some(dec!(2810)),
            _ => None,
        }
    }

    fn trading_days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..)
            .map(move |offset| start + Duration::days(offset))
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .take(self.rows)
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketData {
    async fn history(&self, symbol: &Ticker) -> Result<Vec<PriceBar>> {
        let base = Self::base_price(symbol.as_str())
            .ok_or_else(|| InsightError::fetch(symbol.as_str(), "symbol not found"))?;

        // Sawtooth around a slow uptrend: visible swings, fully reproducible
        let step = (base / dec!(400)).round_dp(2);
        let drift = (base / dec!(2000)).round_dp(2);

        let bars = self
            .trading_days()
            .enumerate()
            .map(|(i, date)| {
                let i = i64::try_from(i).unwrap_or(i64::MAX);
                let swing = Decimal::from(i % 20 - 10) * step;
                let close = base + Decimal::from(i) * drift + swing;
                PriceBar {
                    date,
                    open: close - step,
                    high: close + step * dec!(2),
                    low: close - step * dec!(2),
                    close,
                    adj_close: close,
                    volume: 1_000_000 + u64::try_from(i % 7).unwrap_or(0) * 125_000,
                }
            })
            .collect();

        Ok(bars)
    }

    fn name(&self) -> &str {
        "StaticMarketData"
    }
}
