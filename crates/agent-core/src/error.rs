//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with nothing usable
    #[error("Empty completion from {0}")]
    EmptyCompletion(String),

    /// Configuration error (missing credential, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::EmptyCompletion(_) => "The AI service returned an empty answer.".into(),
            Self::RateLimited(_) => "Too many requests to the AI service. Please wait a moment.".into(),
            Self::Auth(_) => "Authentication with the AI service failed. Check the API key.".into(),
            Self::Config(msg) => format!("The AI service is not configured: {msg}"),
            _ => "An unexpected error occurred.".into(),
        }
    }
}
