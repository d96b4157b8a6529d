//! Server Configuration
//!
//! Everything is read from the environment (a `.env` file is loaded first).

use std::path::PathBuf;

use agent_runtime::ProviderKind;
use market_insight::{SessionConfig, YahooConfig};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Where price history comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarketSource {
    Yahoo,
    /// Deterministic offline prices
    Static,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub session: SessionConfig,
    pub tickers_file: Option<PathBuf>,
    pub llm_provider: ProviderKind,
    pub llm_model: String,
    pub market: MarketSource,
    pub yahoo: YahooConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let llm_provider = match var("LLM_PROVIDER") {
            Some(name) => ProviderKind::parse(&name)
                .map_err(|e| ConfigError::invalid("LLM_PROVIDER", &name, e))?,
            None => ProviderKind::OpenAi,
        };

        let market = match var("MARKET_DATA").as_deref() {
            None | Some("yahoo") => MarketSource::Yahoo,
            Some("static") => MarketSource::Static,
            Some(other) => {
                return Err(ConfigError::invalid("MARKET_DATA", other, "expected yahoo or static"));
            }
        };

        let cache_insights = match var("INSIGHT_CACHE") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::invalid("INSIGHT_CACHE", &raw, "expected true or false")
            })?,
            None => false,
        };

        let defaults = SessionConfig::default();
        Ok(Self {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            session: SessionConfig {
                data_dir: var("DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
                plot_dir: var("PLOT_DIR").map_or(defaults.plot_dir, PathBuf::from),
                cache_insights,
            },
            tickers_file: var("TICKERS_FILE").map(PathBuf::from),
            llm_model: var("LLM_MODEL").unwrap_or_else(|| llm_provider.default_model().into()),
            llm_provider,
            market,
            // An explicitly empty suffix is meaningful (US symbols)
            yahoo: lookup("TICKER_SUFFIX")
                .map(|suffix| YahooConfig {
                    suffix: suffix.trim().to_string(),
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
