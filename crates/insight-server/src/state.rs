//! Application State

use std::path::PathBuf;
use std::sync::Arc;

use agent_core::LlmProvider;
use market_insight::{InsightSession, TickerUniverse};
use tokio::sync::Mutex;

use crate::page::{Flash, PageRenderer};

/// The session plus the message to show on the next page view
pub struct UiSession {
    pub session: InsightSession,
    pub flash: Option<Flash>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Held for the whole request: the directories have one writer at a time
    pub ui: Arc<Mutex<UiSession>>,

    /// Tickers the user may pick from
    pub tickers: Arc<TickerUniverse>,

    pub pages: Arc<PageRenderer>,

    /// LLM provider behind the analytics agent (OpenAI, Ollama)
    pub provider: Arc<dyn LlmProvider>,

    /// Served under `/plot`
    pub plot_dir: PathBuf,
}

impl AppState {
    pub fn new(
        session: InsightSession,
        tickers: TickerUniverse,
        pages: PageRenderer,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let plot_dir = session.plot_dir().to_path_buf();
        Self {
            ui: Arc::new(Mutex::new(UiSession {
                session,
                flash: None,
            })),
            tickers: Arc::new(tickers),
            pages: Arc::new(pages),
            provider,
            plot_dir,
        }
    }
}
