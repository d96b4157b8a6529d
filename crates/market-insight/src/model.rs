//! Domain Models
//!
//! Core data types for ticker selection, dataset files and insights.
//! Uses `rust_decimal` for all prices - never use f64 for money!

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

/// A tradable instrument symbol (e.g., "TCS", "INFY")
///
/// The symbol doubles as the dataset file name, so it is restricted to
/// characters that are safe in a path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_uppercase();
        let valid = !symbol.is_empty()
            && !symbol.starts_with('.')
            && !symbol.contains("..")
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&' | '_' | '^'));

        if valid {
            Ok(Self(symbol))
        } else {
            Err(InsightError::InvalidTicker(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the dataset file for this ticker
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = InsightError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One daily row of price history
///
/// Field names follow the column headers of the dataset file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Open")]
    pub open: Decimal,

    #[serde(rename = "High")]
    pub high: Decimal,

    #[serde(rename = "Low")]
    pub low: Decimal,

    #[serde(rename = "Close")]
    pub close: Decimal,

    #[serde(rename = "Adj Close")]
    pub adj_close: Decimal,

    #[serde(rename = "Volume")]
    pub volume: u64,
}

/// The single dataset file living in the data directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetFile {
    pub ticker: Ticker,
    pub path: PathBuf,
}

impl DatasetFile {
    /// Recover the dataset identity from a file found on disk
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| InsightError::InvalidTicker(path.display().to_string()))?;

        Ok(Self {
            ticker: Ticker::parse(stem)?,
            path,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Result of one visualization request
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlotOutcome {
    Created { prompt: usize, path: PathBuf },
    Failed { prompt: usize, reason: String },
}

impl PlotOutcome {
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Description, recommendation and chart outcomes for one dataset
///
/// `description == None` is the "no description" sentinel: the agent could
/// not describe the data and the page shows an error banner instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InsightBundle {
    pub ticker: Ticker,
    pub description: Option<String>,
    pub recommendation: Option<String>,
    pub plots: Vec<PlotOutcome>,
}

impl InsightBundle {
    /// Bundle for an agent that could not be reached at all
    pub const fn unavailable(ticker: Ticker) -> Self {
        Self {
            ticker,
            description: None,
            recommendation: None,
            plots: Vec::new(),
        }
    }

    pub const fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn created_plots(&self) -> usize {
        self.plots.iter().filter(|p| p.is_created()).count()
    }

    pub fn failed_plots(&self) -> impl Iterator<Item = (usize, &str)> {
        self.plots.iter().filter_map(|p| match p {
            PlotOutcome::Failed { prompt, reason } => Some((*prompt, reason.as_str())),
            PlotOutcome::Created { .. } => None,
        })
    }
}

/// Where the session is in its `Empty → DataLoaded → Analyzed` lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Empty,
    DataLoaded,
    Analyzed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::DataLoaded => write!(f, "data_loaded"),
            Self::Analyzed => write!(f, "analyzed"),
        }
    }
}
