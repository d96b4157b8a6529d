//! Session State
//!
//! Explicit per-session state: the selection, the two working directories,
//! and the `Empty → DataLoaded → Analyzed` lifecycle. Callers hold one
//! `InsightSession` and pass it by reference instead of poking at the
//! directories directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{DatasetKey, InsightCache};
use crate::error::{InsightError, Result};
use crate::insight::{AnalyticsAgentFactory, InsightAdapter};
use crate::market::{DataFetcher, MarketDataProvider};
use crate::model::{DatasetFile, InsightBundle, SessionPhase, Ticker};
use crate::reconcile;

/// Where the session keeps its files
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub data_dir: PathBuf,
    pub plot_dir: PathBuf,
    /// Reuse the last bundle while the dataset is unchanged
    pub cache_insights: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            plot_dir: PathBuf::from("plot"),
            cache_insights: false,
        }
    }
}

/// The currently chosen ticker
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionStore {
    current: Option<Ticker>,
}

impl SelectionStore {
    pub fn set(&mut self, ticker: Ticker) {
        self.current = Some(ticker);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub const fn current(&self) -> Option<&Ticker> {
        self.current.as_ref()
    }
}

/// What a render found
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RenderState {
    /// No dataset: nothing to show, not an error
    Empty,
    Analyzed(InsightView),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InsightView {
    pub dataset: DatasetFile,
    pub bundle: InsightBundle,
    /// Plot files on disk after the analysis, sorted by name
    pub plot_files: Vec<PathBuf>,
    pub from_cache: bool,
}

pub struct InsightSession {
    config: SessionConfig,
    selection: SelectionStore,
    fetcher: DataFetcher,
    insights: InsightAdapter,
    cache: Option<InsightCache>,
    dataset: Option<DatasetFile>,
    generation: u64,
    analyzed: Option<DatasetKey>,
}

impl InsightSession {
    /// Create the working directories and pick up a dataset left by a previous run
    pub async fn open(
        config: SessionConfig,
        market: Arc<dyn MarketDataProvider>,
        agents: Arc<dyn AnalyticsAgentFactory>,
    ) -> Result<Self> {
        for dir in [&config.data_dir, &config.plot_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| InsightError::io(dir, e))?;
        }

        let dataset = InsightAdapter::current_dataset(&config.data_dir).await?;
        let mut selection = SelectionStore::default();
        if let Some(existing) = &dataset {
            tracing::info!(ticker = %existing.ticker, "resuming with existing dataset");
            selection.set(existing.ticker.clone());
        }

        Ok(Self {
            fetcher: DataFetcher::new(market, config.data_dir.clone()),
            insights: InsightAdapter::new(agents),
            cache: config.cache_insights.then(InsightCache::new),
            selection,
            dataset,
            generation: 0,
            analyzed: None,
            config,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn plot_dir(&self) -> &Path {
        &self.config.plot_dir
    }

    pub const fn selection(&self) -> Option<&Ticker> {
        self.selection.current()
    }

    pub fn market_provider(&self) -> &str {
        self.fetcher.provider_name()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.dataset, &self.analyzed) {
            (None, _) => SessionPhase::Empty,
            (Some(dataset), Some(key)) if *key == self.key_for(dataset) => SessionPhase::Analyzed,
            (Some(_), _) => SessionPhase::DataLoaded,
        }
    }

    /// "Save Option": download `ticker` and make it the only dataset.
    ///
    /// On failure the previous dataset and selection stay as they were.
    pub async fn save_option(&mut self, ticker: Ticker) -> Result<DatasetFile> {
        let dataset = match self.fetcher.fetch(&ticker).await {
            Ok(dataset) => dataset,
            Err(e) => {
                if matches!(e, InsightError::Io { .. }) {
                    self.resync().await;
                }
                return Err(e);
            }
        };

        self.generation += 1;
        self.dataset = Some(dataset.clone());
        self.analyzed = None;
        self.selection.set(ticker);
        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate();
        }

        // The next analysis resets the plot directory again before drawing
        if let Err(e) = reconcile::reset(&self.config.plot_dir).await {
            tracing::warn!(error = %e, "stale plots left until the next analysis");
        }
        Ok(dataset)
    }

    /// Re-read the data directory after a reconciliation failure
    async fn resync(&mut self) {
        self.analyzed = None;
        self.dataset = InsightAdapter::current_dataset(&self.config.data_dir)
            .await
            .ok()
            .flatten();
        match &self.dataset {
            Some(dataset) => self.selection.set(dataset.ticker.clone()),
            None => self.selection.clear(),
        }
    }

    /// "Clear": back to `Empty` from any phase
    pub async fn clear(&mut self) -> Result<()> {
        reconcile::reset(&self.config.data_dir).await?;
        self.dataset = None;
        self.analyzed = None;
        self.selection.clear();
        if let Some(cache) = self.cache.as_mut() {
            cache.invalidate();
        }

        reconcile::reset(&self.config.plot_dir).await?;
        tracing::info!("session cleared");
        Ok(())
    }

    /// Produce everything the page shows.
    ///
    /// Analysis runs whenever a dataset exists; with caching off it runs on
    /// every call.
    pub async fn render(&mut self) -> Result<RenderState> {
        let Some(dataset) = InsightAdapter::current_dataset(&self.config.data_dir).await? else {
            self.dataset = None;
            self.analyzed = None;
            return Ok(RenderState::Empty);
        };

        if self.dataset.as_ref() != Some(&dataset) {
            // Changed behind our back; treat it as a new fetch
            self.generation += 1;
            self.dataset = Some(dataset.clone());
        }
        let key = self.key_for(&dataset);

        let cached = self
            .cache
            .as_mut()
            .and_then(|cache| cache.get(&key).cloned());
        let from_cache = cached.is_some();
        let bundle = match cached {
            Some(bundle) => bundle,
            None => {
                let bundle = self
                    .insights
                    .analyze_dataset(&dataset, &self.config.plot_dir)
                    .await?;
                if let Some(cache) = self.cache.as_mut() {
                    cache.put(key.clone(), bundle.clone());
                    tracing::debug!(hits = cache.hits(), misses = cache.misses(), "insight cache stored");
                }
                bundle
            }
        };
        self.analyzed = Some(key);

        let plot_files = reconcile::list_files(&self.config.plot_dir).await?;
        Ok(RenderState::Analyzed(InsightView {
            dataset,
            bundle,
            plot_files,
            from_cache,
        }))
    }

    fn key_for(&self, dataset: &DatasetFile) -> DatasetKey {
        DatasetKey::new(dataset, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::testing::ScriptedFactory;
    use crate::insight::VISUALIZATION_PROMPTS;
    use crate::market::StaticMarketData;

    struct Harness {
        _tmp: tempfile::TempDir,
        factory: Arc<ScriptedFactory>,
        session: InsightSession,
    }

    async fn harness_with(cache_insights: bool, factory: ScriptedFactory) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            data_dir: tmp.path().join("data"),
            plot_dir: tmp.path().join("plot"),
            cache_insights,
        };
        let factory = Arc::new(factory);
        let session = InsightSession::open(
            config,
            Arc::new(StaticMarketData::new().with_rows(40)),
            factory.clone(),
        )
        .await
        .unwrap();
        Harness {
            _tmp: tmp,
            factory,
            session,
        }
    }

    async fn harness() -> Harness {
        harness_with(false, ScriptedFactory::default()).await
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn ticker(s: &str) -> Ticker {
        Ticker::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_select_tcs_then_infy() {
        let mut h = harness().await;

        h.session.save_option(ticker("TCS")).await.unwrap();
        assert_eq!(names(h.session.data_dir()), vec!["TCS.csv"]);

        h.session.save_option(ticker("INFY")).await.unwrap();
        assert_eq!(names(h.session.data_dir()), vec!["INFY.csv"]);
        assert_eq!(h.session.selection().unwrap().as_str(), "INFY");
    }

    #[tokio::test]
    async fn test_many_saves_keep_one_file() {
        let mut h = harness().await;
        for symbol in ["SBIN", "TCS", "TCS", "ITC", "WIPRO", "INFY"] {
            h.session.save_option(ticker(symbol)).await.unwrap();
            assert_eq!(names(h.session.data_dir()), vec![format!("{symbol}.csv")]);
        }
    }

    #[tokio::test]
    async fn test_failed_save_keeps_selection_and_file() {
        let mut h = harness().await;
        h.session.save_option(ticker("TCS")).await.unwrap();

        assert!(h.session.save_option(ticker("NOTLISTED")).await.is_err());
        assert_eq!(names(h.session.data_dir()), vec!["TCS.csv"]);
        assert_eq!(h.session.selection().unwrap().as_str(), "TCS");
    }

    #[tokio::test]
    async fn test_empty_render_is_silent_and_skips_agent() {
        let mut h = harness().await;

        assert_eq!(h.session.render().await.unwrap(), RenderState::Empty);
        assert_eq!(h.factory.connects(), 0);
        assert_eq!(h.session.phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_clear_then_render() {
        let mut h = harness().await;
        h.session.save_option(ticker("TCS")).await.unwrap();
        h.session.render().await.unwrap();
        assert!(!names(h.session.plot_dir()).is_empty());

        h.session.clear().await.unwrap();
        assert_eq!(h.session.render().await.unwrap(), RenderState::Empty);
        assert!(names(h.session.data_dir()).is_empty());
        assert!(names(h.session.plot_dir()).is_empty());
        assert!(h.session.selection().is_none());
        assert_eq!(h.factory.connects(), 1);
    }

    #[tokio::test]
    async fn test_phase_transitions() {
        let mut h = harness().await;
        assert_eq!(h.session.phase(), SessionPhase::Empty);

        h.session.save_option(ticker("TCS")).await.unwrap();
        assert_eq!(h.session.phase(), SessionPhase::DataLoaded);

        h.session.render().await.unwrap();
        assert_eq!(h.session.phase(), SessionPhase::Analyzed);

        h.session.save_option(ticker("INFY")).await.unwrap();
        assert_eq!(h.session.phase(), SessionPhase::DataLoaded);

        h.session.clear().await.unwrap();
        assert_eq!(h.session.phase(), SessionPhase::Empty);
    }

    #[tokio::test]
    async fn test_render_reruns_analysis_without_cache() {
        let mut h = harness().await;
        h.session.save_option(ticker("TCS")).await.unwrap();

        h.session.render().await.unwrap();
        h.session.render().await.unwrap();
        assert_eq!(h.factory.connects(), 2);
    }

    #[tokio::test]
    async fn test_cache_reuses_bundle_until_next_fetch() {
        let mut h = harness_with(true, ScriptedFactory::default()).await;
        h.session.save_option(ticker("TCS")).await.unwrap();

        let first = h.session.render().await.unwrap();
        let second = h.session.render().await.unwrap();
        assert_eq!(h.factory.connects(), 1);
        let (RenderState::Analyzed(a), RenderState::Analyzed(b)) = (first, second) else {
            panic!("expected analyzed renders");
        };
        assert!(!a.from_cache);
        assert!(b.from_cache);
        assert_eq!(a.plot_files, b.plot_files);

        h.session.save_option(ticker("TCS")).await.unwrap();
        h.session.render().await.unwrap();
        assert_eq!(h.factory.connects(), 2);
    }

    #[tokio::test]
    async fn test_plots_never_mix_datasets() {
        let mut h = harness().await;
        h.session.save_option(ticker("TCS")).await.unwrap();
        h.session.render().await.unwrap();

        h.session.save_option(ticker("INFY")).await.unwrap();
        assert!(names(h.session.plot_dir()).is_empty());

        let RenderState::Analyzed(view) = h.session.render().await.unwrap() else {
            panic!("expected analyzed render");
        };
        assert_eq!(view.plot_files.len(), VISUALIZATION_PROMPTS.len());
        assert!(names(h.session.plot_dir()).iter().all(|n| n.contains("INFY")));
    }

    #[tokio::test]
    async fn test_partial_plots_still_render() {
        let factory = ScriptedFactory {
            failing_prompts: vec![1],
            ..Default::default()
        };
        let mut h = harness_with(false, factory).await;
        h.session.save_option(ticker("TCS")).await.unwrap();

        let RenderState::Analyzed(view) = h.session.render().await.unwrap() else {
            panic!("expected analyzed render");
        };
        assert_eq!(view.plot_files.len(), VISUALIZATION_PROMPTS.len() - 1);
        assert!(view.bundle.has_description());
    }

    #[tokio::test]
    async fn test_open_resumes_existing_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("data");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::write(data_dir.join("ITC.csv"), b"").unwrap();

        let session = InsightSession::open(
            SessionConfig {
                data_dir,
                plot_dir: tmp.path().join("plot"),
                cache_insights: false,
            },
            Arc::new(StaticMarketData::new()),
            Arc::new(ScriptedFactory::default()),
        )
        .await
        .unwrap();

        assert_eq!(session.selection().unwrap().as_str(), "ITC");
        assert_eq!(session.phase(), SessionPhase::DataLoaded);
        assert!(tmp.path().join("plot").is_dir());
    }

    #[tokio::test]
    async fn test_render_reports_agent_side_of_partial_failure() {
        let factory = ScriptedFactory {
            fail_description: true,
            ..Default::default()
        };
        let mut h = harness_with(false, factory).await;
        h.session.save_option(ticker("TCS")).await.unwrap();

        let RenderState::Analyzed(view) = h.session.render().await.unwrap() else {
            panic!("expected analyzed render");
        };
        assert!(view.bundle.description.is_none());
        assert_eq!(h.factory.seen.lock().unwrap().as_slice(), ["TCS.csv"]);
    }

    #[tokio::test]
    async fn test_blocked_data_dir_keeps_previous_dataset() {
        let mut h = harness().await;
        h.session.save_option(ticker("TCS")).await.unwrap();
        std::fs::create_dir(h.session.data_dir().join("stuck")).unwrap();

        let err = h.session.save_option(ticker("INFY")).await.unwrap_err();
        assert!(matches!(err, InsightError::Io { .. }));
        assert!(h.session.data_dir().join("TCS.csv").is_file());
        assert!(!h.session.data_dir().join("INFY.csv").exists());
        assert_eq!(h.session.selection().unwrap().as_str(), "TCS");
        assert_eq!(h.session.phase(), SessionPhase::DataLoaded);
    }

    #[tokio::test]
    async fn test_stuck_plot_dir_does_not_fail_selection() {
        let mut h = harness().await;
        std::fs::create_dir(h.session.plot_dir().join("stuck")).unwrap();

        let dataset = h.session.save_option(ticker("TCS")).await.unwrap();
        assert_eq!(dataset.file_name(), "TCS.csv");
        assert_eq!(h.session.selection().unwrap().as_str(), "TCS");
        assert_eq!(h.session.phase(), SessionPhase::DataLoaded);
    }
}
