//! Market Data
//!
//! Provider abstraction and the fetch adapter that turns a ticker into the
//! dataset file.

mod fixture;
mod yahoo;

pub use fixture::StaticMarketData;
pub use yahoo::{YahooConfig, YahooMarketData};

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::dataset;
use crate::error::{InsightError, Result};
use crate::model::{DatasetFile, PriceBar, Ticker};
use crate::reconcile;

/// Market-data provider trait (Strategy pattern)
///
/// Implementations report upstream problems as [`InsightError::Fetch`].
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Full daily price history for a symbol, oldest first
    async fn history(&self, symbol: &Ticker) -> Result<Vec<PriceBar>>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Downloads a ticker and makes it the sole dataset file
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    data_dir: PathBuf,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            data_dir: data_dir.into(),
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Download `ticker` and write it as the only file in the data directory.
    ///
    /// Nothing on disk changes unless the download produced at least one row.
    pub async fn fetch(&self, ticker: &Ticker) -> Result<DatasetFile> {
        let bars = self.provider.history(ticker).await?;
        if bars.is_empty() {
            return Err(InsightError::EmptyDataset(ticker.to_string()));
        }

        let contents = dataset::encode(&bars)?;
        let path = reconcile::ensure_single(&self.data_dir, &ticker.file_name(), &contents).await?;

        tracing::info!(
            %ticker,
            rows = bars.len(),
            provider = self.provider.name(),
            "price history saved"
        );

        Ok(DatasetFile {
            ticker: ticker.clone(),
            path,
        })
    }
}
