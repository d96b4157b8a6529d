//! Error Types for Market Insight

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    /// A data or plot directory could not be reconciled
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The market-data provider failed
    #[error("Failed to fetch {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    /// The market-data provider answered with no rows
    #[error("No price history returned for {0}")]
    EmptyDataset(String),

    /// The analytics agent could not produce a result
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// More than one dataset file, which reconciliation must never allow
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Agent error: {0}")]
    Agent(#[from] agent_core::AgentError),
}

impl InsightError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn fetch(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is one of the failures that abort a user action
    pub const fn aborts_action(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Fetch { .. } | Self::EmptyDataset(_) | Self::InvalidTicker(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Io { path, .. } => format!("Could not update {}.", path.display()),
            Self::Fetch { symbol, .. } => {
                format!("Could not download price data for {symbol}. Please try again.")
            }
            Self::EmptyDataset(symbol) => format!("No price data is available for {symbol}."),
            Self::InvalidTicker(symbol) => format!("'{symbol}' is not a supported ticker."),
            Self::Agent(e) => e.user_message(),
            Self::Analysis(_) => "Error: occurs while generating description".into(),
            Self::InvariantViolation(_) | Self::Csv(_) => "An unexpected error occurred.".into(),
        }
    }
}
