//! Retriever port
//!
//! Defines the interface to the external knowledge index.

use async_trait::async_trait;
use ragloop_domain::Passage;
use thiserror::Error;

/// Errors that can occur while looking up passages
#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Source of passages for a query
///
/// Implementations must surface provider failures as [`RetrievalError`].
/// An empty vector means the index reported zero matches, never that the
/// lookup failed.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return passages for `query`, best match first
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError>;
}
