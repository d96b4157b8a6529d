//! Insight Generation
//!
//! The analytics agent is an external collaborator behind
//! [`AnalyticsAgent`]; [`InsightAdapter`] enforces the preconditions and the
//! failure semantics around it.

mod llm;
mod prompts;

pub use llm::{LlmAgentFactory, LlmAnalyticsAgent, extract_svg};
pub use prompts::{
    CHART_PROMPT, DESCRIPTION_PROMPT, RECOMMENDATION_PROMPT, VISUALIZATION_PROMPTS,
    VisualizationPrompt,
};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{InsightError, Result};
use crate::model::{DatasetFile, InsightBundle, PlotOutcome};
use crate::reconcile;

/// A chart produced by the agent, not yet placed on disk
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedChart {
    /// Bare file name chosen by the agent (e.g. "02-rsi.svg")
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Analytics agent bound to one dataset
#[async_trait]
pub trait AnalyticsAgent: Send + Sync {
    /// Natural-language description of the dataset
    async fn dataset_description(&self) -> Result<String>;

    /// Suggested analyses for the dataset
    async fn analysis_recommendation(&self) -> Result<String>;

    /// Render one chart for a visualization prompt
    async fn visualization(&self, prompt: &VisualizationPrompt) -> Result<RenderedChart>;
}

/// Creates an agent for a dataset file (the "file path + credential" handshake)
#[async_trait]
pub trait AnalyticsAgentFactory: Send + Sync {
    async fn connect(&self, dataset: &DatasetFile) -> Result<Box<dyn AnalyticsAgent>>;
}

/// Runs the agent over the current dataset and fills the plot directory
pub struct InsightAdapter {
    factory: Arc<dyn AnalyticsAgentFactory>,
    prompts: &'static [VisualizationPrompt],
}

impl InsightAdapter {
    pub fn new(factory: Arc<dyn AnalyticsAgentFactory>) -> Self {
        Self {
            factory,
            prompts: VISUALIZATION_PROMPTS,
        }
    }

    pub const fn with_prompts(mut self, prompts: &'static [VisualizationPrompt]) -> Self {
        self.prompts = prompts;
        self
    }

    /// The single dataset file in `data_dir`, if any.
    ///
    /// More than one file means reconciliation was bypassed and is reported
    /// as an invariant violation.
    pub async fn current_dataset(data_dir: &Path) -> Result<Option<DatasetFile>> {
        match reconcile::list_files(data_dir).await?.as_slice() {
            [] => Ok(None),
            [single] => DatasetFile::from_path(single).map(Some),
            many => Err(InsightError::InvariantViolation(format!(
                "{} dataset files in {}",
                many.len(),
                data_dir.display()
            ))),
        }
    }

    /// Analyze whatever dataset `data_dir` holds.
    ///
    /// Returns `Ok(None)` without contacting the agent when there is no dataset.
    pub async fn analyze(&self, data_dir: &Path, plot_dir: &Path) -> Result<Option<InsightBundle>> {
        let Some(dataset) = Self::current_dataset(data_dir).await? else {
            tracing::debug!("no dataset, skipping analysis");
            return Ok(None);
        };
        self.analyze_dataset(&dataset, plot_dir).await.map(Some)
    }

    /// Regenerate insights for `dataset`.
    ///
    /// The plot directory is emptied before the agent is contacted. Text
    /// failures become `None` fields; chart failures are recorded per prompt
    /// and never stop the remaining prompts.
    pub async fn analyze_dataset(&self, dataset: &DatasetFile, plot_dir: &Path) -> Result<InsightBundle> {
        reconcile::reset(plot_dir).await?;

        let agent = match self.factory.connect(dataset).await {
            Ok(agent) => agent,
            Err(e) => {
                tracing::error!(ticker = %dataset.ticker, error = %e, "analytics agent unavailable");
                return Ok(InsightBundle::unavailable(dataset.ticker.clone()));
            }
        };

        let description = text_or_none("description", agent.dataset_description().await);
        let recommendation = text_or_none("recommendation", agent.analysis_recommendation().await);

        let mut plots = Vec::with_capacity(self.prompts.len());
        for prompt in self.prompts {
            plots.push(Self::render_plot(agent.as_ref(), prompt, plot_dir).await);
        }

        let bundle = InsightBundle {
            ticker: dataset.ticker.clone(),
            description,
            recommendation,
            plots,
        };
        tracing::info!(
            ticker = %bundle.ticker,
            described = bundle.has_description(),
            plots = bundle.created_plots(),
            failed = bundle.failed_plots().count(),
            "insights generated"
        );
        Ok(bundle)
    }

    async fn render_plot(
        agent: &dyn AnalyticsAgent,
        prompt: &VisualizationPrompt,
        plot_dir: &Path,
    ) -> PlotOutcome {
        let stored = match agent.visualization(prompt).await {
            Ok(chart) => reconcile::add_file(plot_dir, &chart.file_name, &chart.bytes).await,
            Err(e) => Err(e),
        };

        match stored {
            Ok(path) => PlotOutcome::Created {
                prompt: prompt.index,
                path,
            },
            Err(e) => {
                tracing::warn!(prompt = prompt.slug, error = %e, "visualization failed");
                PlotOutcome::Failed {
                    prompt: prompt.index,
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn text_or_none(what: &str, result: Result<String>) -> Option<String> {
    match result {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            tracing::warn!("agent returned an empty {what}");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "agent failed to produce a {what}");
            None
        }
    }
}
