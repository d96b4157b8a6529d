//! LLM-backed analytics agent
//!
//! Description and recommendation are plain completions over a dataset
//! summary. Charts are requested as self-contained SVG documents.

use std::sync::Arc;

use agent_core::{GenerationOptions, LlmProvider};
use async_trait::async_trait;

use super::prompts::{CHART_PROMPT, DESCRIPTION_PROMPT, RECOMMENDATION_PROMPT, VisualizationPrompt};
use super::{AnalyticsAgent, AnalyticsAgentFactory, RenderedChart};
use crate::dataset::{self, DatasetSummary};
use crate::error::{InsightError, Result};
use crate::model::{DatasetFile, PriceBar};

/// Trailing rows handed to the model when drawing a chart
const CHART_ROWS: usize = 120;

/// Token budget for SVG answers, which are much longer than prose
const CHART_MAX_TOKENS: u32 = 6000;

/// Connects an [`LlmAnalyticsAgent`] to each dataset
pub struct LlmAgentFactory {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl LlmAgentFactory {
    pub const fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }
}

#[async_trait]
impl AnalyticsAgentFactory for LlmAgentFactory {
    async fn connect(&self, dataset: &DatasetFile) -> Result<Box<dyn AnalyticsAgent>> {
        let bars = dataset::load(dataset.path()).await?;
        let summary = DatasetSummary::from_bars(dataset.ticker.clone(), &bars)
            .ok_or_else(|| InsightError::Analysis(format!("{} has no rows", dataset.file_name())))?;

        Ok(Box::new(LlmAnalyticsAgent {
            provider: self.provider.clone(),
            options: self.options.clone(),
            summary: summary.to_prompt_text(),
            chart_data: chart_csv(&bars)?,
        }))
    }
}

/// Agent answering from one dataset through an LLM provider
pub struct LlmAnalyticsAgent {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    summary: String,
    chart_data: String,
}

impl LlmAnalyticsAgent {
    fn chart_request(&self, prompt: &VisualizationPrompt) -> String {
        format!(
            "Chart request: {}\n\nDataset summary:\n{}\nDaily rows (CSV):\n{}",
            prompt.text, self.summary, self.chart_data
        )
    }
}

#[async_trait]
impl AnalyticsAgent for LlmAnalyticsAgent {
    async fn dataset_description(&self) -> Result<String> {
        Ok(self
            .provider
            .ask(DESCRIPTION_PROMPT, &self.summary, &self.options)
            .await?)
    }

    async fn analysis_recommendation(&self) -> Result<String> {
        Ok(self
            .provider
            .ask(RECOMMENDATION_PROMPT, &self.summary, &self.options)
            .await?)
    }

    async fn visualization(&self, prompt: &VisualizationPrompt) -> Result<RenderedChart> {
        let options = self.options.clone().with_max_tokens(CHART_MAX_TOKENS);
        let answer = self
            .provider
            .ask(CHART_PROMPT, &self.chart_request(prompt), &options)
            .await?;

        let svg = extract_svg(&answer).ok_or_else(|| {
            InsightError::Analysis(format!("no SVG document in answer for '{}'", prompt.slug))
        })?;

        Ok(RenderedChart {
            file_name: format!("{:02}-{}.svg", prompt.index, prompt.slug),
            bytes: svg.as_bytes().to_vec(),
        })
    }
}

/// The outermost `<svg ...>...</svg>` element in a model answer.
///
/// Models often wrap the document in prose or code fences; everything
/// outside the element is dropped.
pub fn extract_svg(answer: &str) -> Option<&str> {
    const CLOSE: &str = "</svg>";
    let start = answer.find("<svg")?;
    let end = answer.rfind(CLOSE)? + CLOSE.len();
    (end > start).then(|| &answer[start..end])
}

fn chart_csv(bars: &[PriceBar]) -> Result<String> {
    let tail = &bars[bars.len().saturating_sub(CHART_ROWS)..];
    let bytes = dataset::encode(tail)?;
    String::from_utf8(bytes).map_err(|e| InsightError::Analysis(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use agent_core::{AgentError, Completion, Message, ModelInfo};

    use super::*;
    use crate::insight::VISUALIZATION_PROMPTS;
    use crate::market::{DataFetcher, StaticMarketData};
    use crate::model::Ticker;

    /// Answers from a queue and records the prompts it saw
    struct Scripted {
        answers: Mutex<Vec<String>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().rev().map(|s| (*s).to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn health_check(&self) -> agent_core::Result<bool> {
            Ok(true)
        }

        async fn complete(
            &self,
            messages: &[Message],
            options: &GenerationOptions,
        ) -> agent_core::Result<Completion> {
            self.requests.lock().unwrap().push(messages.to_vec());
            let content = self
                .answers
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AgentError::ProviderUnavailable("script exhausted".into()))?;
            Ok(Completion {
                content,
                model: options.model.clone(),
                truncated: false,
            })
        }

        async fn list_models(&self) -> agent_core::Result<Vec<ModelInfo>> {
            Ok(Vec::new())
        }
    }

    async fn saved_dataset(dir: &std::path::Path) -> DatasetFile {
        DataFetcher::new(Arc::new(StaticMarketData::new().with_rows(200)), dir)
            .fetch(&Ticker::parse("TCS").unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_extract_svg_strips_fences() {
        let answer = "Here you go:\n```svg\n<svg width=\"10\"><rect/></svg>\n```\nEnjoy";
        assert_eq!(extract_svg(answer), Some("<svg width=\"10\"><rect/></svg>"));
    }

    #[test]
    fn test_extract_svg_keeps_nested_elements() {
        let answer = "<svg><svg id=\"inner\"></svg></svg>";
        assert_eq!(extract_svg(answer), Some(answer));
    }

    #[test]
    fn test_extract_svg_missing_or_reversed() {
        assert_eq!(extract_svg("I cannot draw charts."), None);
        assert_eq!(extract_svg("</svg> then <svg"), None);
    }

    #[tokio::test]
    async fn test_agent_uses_summary_and_names_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let dataset = saved_dataset(tmp.path()).await;
        let provider = Arc::new(Scripted::new(&[
            "TCS rose steadily.",
            "1. Check drawdowns",
            "```\n<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>\n```",
        ]));

        let factory = LlmAgentFactory::new(provider.clone(), GenerationOptions::default());
        let agent = factory.connect(&dataset).await.unwrap();

        assert_eq!(agent.dataset_description().await.unwrap(), "TCS rose steadily.");
        assert_eq!(agent.analysis_recommendation().await.unwrap(), "1. Check drawdowns");

        let chart = agent.visualization(&VISUALIZATION_PROMPTS[2]).await.unwrap();
        assert_eq!(chart.file_name, "02-rsi.svg");
        assert!(chart.bytes.starts_with(b"<svg"));

        let requests = provider.requests.lock().unwrap();
        assert!(requests[0][1].content.contains("Ticker: TCS"));
        assert!(requests[0][1].content.contains("Rows: 200"));
        let chart_prompt = &requests[2][1].content;
        assert!(chart_prompt.contains("RSI"));
        // header plus the trailing CHART_ROWS rows
        let csv_lines = chart_prompt.split("Daily rows (CSV):\n").nth(1).unwrap().lines().count();
        assert_eq!(csv_lines, CHART_ROWS + 1);
    }

    #[tokio::test]
    async fn test_answer_without_svg_fails_that_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let dataset = saved_dataset(tmp.path()).await;
        let provider = Arc::new(Scripted::new(&["Sorry, I can only describe charts."]));

        let agent = LlmAgentFactory::new(provider, GenerationOptions::default())
            .connect(&dataset)
            .await
            .unwrap();
        let err = agent.visualization(&VISUALIZATION_PROMPTS[0]).await.unwrap_err();
        assert!(matches!(err, InsightError::Analysis(msg) if msg.contains("candlestick")));
    }

    #[tokio::test]
    async fn test_connect_rejects_empty_dataset() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("TCS.csv");
        std::fs::write(&path, "Date,Open,High,Low,Close,Adj Close,Volume\n").unwrap();
        let dataset = DatasetFile::from_path(&path).unwrap();

        let result = LlmAgentFactory::new(Arc::new(Scripted::new(&[])), GenerationOptions::default())
            .connect(&dataset)
            .await;
        assert!(matches!(result, Err(InsightError::Analysis(_))));
    }
}
