//! # agent-core
//!
//! Provider-agnostic LLM abstraction backing the market insight agent.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  market-insight agent                    │
//! │  ┌─────────────────┐        ┌─────────────────────────┐  │
//! │  │  Prompt builder │ ─────▶ │  LlmProvider (Strategy) │  │
//! │  └─────────────────┘        └─────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//!                                 │ Ollama │ OpenAI │ fake │
//! ```
//!
//! The `LlmProvider` trait lets the analytics agent run against a local
//! Ollama model, the hosted OpenAI API, or a scripted fake in tests without
//! touching the agent logic.

pub mod error;
pub mod message;
pub mod provider;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};
