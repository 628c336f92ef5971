//! Text generator port
//!
//! Defines the interface for communicating with a text-generation provider.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during a generation call
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Prompt-in, text-out generation
///
/// The answer loop and the critic both depend only on this trait, so
/// providers can be swapped without touching the use cases.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier used in logs
    fn model(&self) -> &str {
        "unknown"
    }

    /// Send a prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
