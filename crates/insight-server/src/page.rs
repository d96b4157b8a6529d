//! Page Rendering
//!
//! Pure read of the session state into HTML. The template is compiled into
//! the binary and auto-escaped.

use market_insight::{RenderState, Ticker, TickerUniverse};
use minijinja::Environment;
use serde::Serialize;

pub const PAGE_TITLE: &str = "NSE Market-Insight";

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// One-shot message shown above the insights after an action
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flash {
    Selected(Ticker),
    Error(String),
}

/// Everything a page render needs
pub struct Page<'a> {
    pub tickers: &'a TickerUniverse,
    pub selected: Option<&'a Ticker>,
    pub flash: Option<Flash>,
    pub state: &'a RenderState,
    pub market: &'a str,
    pub agent: &'a str,
}

#[derive(Serialize)]
struct FlashView {
    kind: &'static str,
    text: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        match flash {
            Flash::Selected(ticker) => Self {
                kind: "info",
                text: format!("You selected: {ticker}"),
            },
            Flash::Error(text) => Self { kind: "error", text },
        }
    }
}

#[derive(Serialize)]
struct InsightsView {
    ticker: String,
    description: Option<String>,
    recommendation: Option<String>,
    plots: Vec<String>,
    failed_plots: usize,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'static str,
    tickers: Vec<&'a str>,
    selected: Option<&'a str>,
    flash: Option<FlashView>,
    insights: Option<InsightsView>,
    market: &'a str,
    agent: &'a str,
}

pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, page: Page<'_>) -> Result<String, minijinja::Error> {
        let insights = match page.state {
            RenderState::Empty => None,
            RenderState::Analyzed(view) => Some(InsightsView {
                ticker: view.bundle.ticker.to_string(),
                description: view.bundle.description.clone(),
                recommendation: view.bundle.recommendation.clone(),
                plots: view
                    .plot_files
                    .iter()
                    .filter_map(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .collect(),
                failed_plots: view.bundle.failed_plots().count(),
            }),
        };

        let view = PageView {
            title: PAGE_TITLE,
            tickers: page.tickers.iter().map(Ticker::as_str).collect(),
            selected: page.selected.map(Ticker::as_str),
            flash: page.flash.map(FlashView::from),
            insights,
            market: page.market,
            agent: page.agent,
        };

        self.env.get_template("index.html")?.render(view)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use market_insight::{DatasetFile, InsightBundle, InsightView, PlotOutcome};

    use super::*;

    fn analyzed(description: Option<&str>) -> RenderState {
        let dataset = DatasetFile::from_path("data/TCS.csv").unwrap();
        RenderState::Analyzed(InsightView {
            bundle: InsightBundle {
                ticker: dataset.ticker.clone(),
                description: description.map(str::to_string),
                recommendation: Some("1. Compare <RSI> with volume".into()),
                plots: vec![
                    PlotOutcome::Created {
                        prompt: 0,
                        path: "plot/00-candlestick.svg".into(),
                    },
                    PlotOutcome::Failed {
                        prompt: 1,
                        reason: "no svg".into(),
                    },
                ],
            },
            dataset,
            plot_files: vec![PathBuf::from("plot/00-candlestick.svg")],
            from_cache: false,
        })
    }

    fn render(state: &RenderState, flash: Option<Flash>) -> String {
        let tickers = TickerUniverse::builtin();
        let selected = Ticker::parse("TCS").unwrap();
        PageRenderer::new()
            .unwrap()
            .render(Page {
                tickers: &tickers,
                selected: Some(&selected),
                flash,
                state,
                market: "Static",
                agent: "scripted",
            })
            .unwrap()
    }

    #[test]
    fn test_empty_page_has_controls_only() {
        let html = render(&RenderState::Empty, None);
        assert!(html.contains("<h1>NSE Market-Insight</h1>"));
        assert!(html.contains("Save Option"));
        assert!(html.contains("<option value=\"TCS\" selected>"));
        assert!(!html.contains("Description of the company data"));
        assert!(!html.contains("Error: occurs while generating description"));
        assert!(html.contains("About this app"));
    }

    #[test]
    fn test_analyzed_page() {
        let html = render(
            &analyzed(Some("TCS rose 12%")),
            Some(Flash::Selected(Ticker::parse("TCS").unwrap())),
        );
        assert!(html.contains("You selected: TCS"));
        assert!(html.contains("Description of the company data"));
        assert!(html.contains("TCS rose 12%"));
        assert!(html.contains("<img src=\"/plot/00-candlestick.svg\""));
        assert!(html.contains("1 chart(s) could not be generated."));
        assert!(html.contains("Recommended analysis"));
    }

    #[test]
    fn test_missing_description_shows_banner_only() {
        let html = render(&analyzed(None), None);
        assert!(html.contains("Error: occurs while generating description"));
        assert!(!html.contains("Description of the company data"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_agent_text_is_escaped() {
        let html = render(&analyzed(Some("a <script>")), None);
        assert!(html.contains("a &lt;script&gt;"));
        assert!(html.contains("Compare &lt;RSI&gt;"));
    }

    #[test]
    fn test_error_flash() {
        let html = render(&RenderState::Empty, Some(Flash::Error("Download failed".into())));
        assert!(html.contains("class=\"flash error\">Download failed"));
    }
}
