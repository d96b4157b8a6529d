//! Dataset File Format
//!
//! CSV encoding of price history plus the compact summary handed to the
//! analytics agent.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{InsightError, Result};
use crate::model::{PriceBar, Ticker};

/// Rows of recent history quoted verbatim in the summary
const RECENT_ROWS: usize = 10;

/// Serialize bars as CSV with a `Date,Open,High,Low,Close,Adj Close,Volume` header
pub fn encode(bars: &[PriceBar]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for bar in bars {
        writer.serialize(bar)?;
    }
    writer
        .into_inner()
        .map_err(|e| InsightError::Csv(e.into_error().into()))
}

/// Parse CSV produced by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<Vec<PriceBar>> {
    let mut reader = csv::Reader::from_reader(bytes);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<PriceBar>, _>>()
        .map_err(InsightError::from)
}

/// Read and parse a dataset file
pub async fn load(path: &Path) -> Result<Vec<PriceBar>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| InsightError::io(path, e))?;
    decode(&bytes)
}

/// Condensed view of a dataset, small enough to put in a prompt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetSummary {
    pub ticker: Ticker,
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min_close: Decimal,
    pub max_close: Decimal,
    pub first_close: Decimal,
    pub last: PriceBar,
    pub recent: Vec<PriceBar>,
}

impl DatasetSummary {
    /// Returns `None` for an empty dataset
    pub fn from_bars(ticker: Ticker, bars: &[PriceBar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let (min_close, max_close) = bars.iter().fold((first.close, first.close), |(lo, hi), b| {
            (lo.min(b.close), hi.max(b.close))
        });

        Some(Self {
            ticker,
            rows: bars.len(),
            first_date: first.date,
            last_date: last.date,
            min_close,
            max_close,
            first_close: first.close,
            last: last.clone(),
            recent: bars[bars.len().saturating_sub(RECENT_ROWS)..].to_vec(),
        })
    }

    /// Percentage change of the close over the whole history
    pub fn total_return_percent(&self) -> Option<Decimal> {
        if self.first_close.is_zero() {
            return None;
        }
        Some(((self.last.close - self.first_close) / self.first_close * Decimal::ONE_HUNDRED).round_dp(2))
    }

    /// Plain-text rendering used in prompts
    pub fn to_prompt_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ticker: {}", self.ticker)?;
        writeln!(
            f,
            "Rows: {} daily bars from {} to {}",
            self.rows, self.first_date, self.last_date
        )?;
        writeln!(f, "Columns: Date, Open, High, Low, Close, Adj Close, Volume")?;
        writeln!(f, "Close range: {} to {}", self.min_close, self.max_close)?;
        if let Some(change) = self.total_return_percent() {
            writeln!(f, "Change over period: {change}%")?;
        }
        writeln!(f, "\nMost recent rows:")?;
        writeln!(f, "Date,Open,High,Low,Close,Adj Close,Volume")?;
        for bar in &self.recent {
            writeln!(
                f,
                "{},{},{},{},{},{},{}",
                bar.date, bar.open, bar.high, bar.low, bar.close, bar.adj_close, bar.volume
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - dec!(5),
            high: close + dec!(10),
            low: close - dec!(10),
            close,
            adj_close: close,
            volume: 1_000 * u64::from(day),
        }
    }

    #[test]
    fn test_encode_writes_header() {
        let csv = encode(&[bar(2, dec!(3800.5))]).unwrap();
        let text = String::from_utf8(csv).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Open,High,Low,Close,Adj Close,Volume"));
        assert_eq!(lines.next(), Some("2024-01-02,3795.5,3810.5,3790.5,3800.5,3800.5,2000"));
    }

    #[test]
    fn test_decode_reads_encoded_rows() {
        let bars = vec![bar(2, dec!(100)), bar(3, dec!(104.25))];
        let decoded = decode(&encode(&bars).unwrap()).unwrap();
        assert_eq!(decoded, bars);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"Date,Open\nyesterday,abc\n").is_err());
    }

    #[test]
    fn test_summary_statistics() {
        let bars: Vec<_> = (1..=12).map(|d| bar(d, Decimal::from(100 + d))).collect();
        let summary = DatasetSummary::from_bars(Ticker::parse("TCS").unwrap(), &bars).unwrap();

        assert_eq!(summary.rows, 12);
        assert_eq!(summary.min_close, dec!(101));
        assert_eq!(summary.max_close, dec!(112));
        assert_eq!(summary.recent.len(), 10);
        assert_eq!(summary.recent[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(summary.total_return_percent(), Some(dec!(10.89)));

        let text = summary.to_prompt_text();
        assert!(text.contains("Ticker: TCS"));
        assert!(text.contains("from 2024-01-01 to 2024-01-12"));
    }

    #[test]
    fn test_summary_of_empty_dataset() {
        assert!(DatasetSummary::from_bars(Ticker::parse("TCS").unwrap(), &[]).is_none());
    }
}
