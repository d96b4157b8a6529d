//! # agent-runtime
//!
//! Runtime providers for the market insight agent.
//!
//! ## Providers
//!
//! - **OpenAI** (default): hosted chat completions, authenticated with `OPENAI_API_KEY`
//! - **Ollama** (default): local LLM inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{ProviderKind, build_provider};
//!
//! let provider = build_provider(ProviderKind::parse("openai")?)?;
//! ```

use std::sync::Arc;

#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};
#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use agent_core::{AgentError, GenerationOptions, LlmProvider, Message, Result, Role};

/// Which backend the analytics agent talks to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
}

impl ProviderKind {
    /// Parse a provider name, case-insensitive
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(AgentError::Config(format!("unknown LLM provider '{other}'"))),
        }
    }

    /// Model used when none is configured
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
        }
    }
}

/// Build a provider from environment configuration
pub fn build_provider(kind: ProviderKind) -> Result<Arc<dyn LlmProvider>> {
    match kind {
        #[cfg(feature = "openai")]
        ProviderKind::OpenAi => Ok(Arc::new(OpenAiProvider::from_env()?)),
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::from_env())),
        #[allow(unreachable_patterns)]
        other => Err(AgentError::Config(format!(
            "provider {other:?} not compiled into this build"
        ))),
    }
}
