//! Retriever backed by an HTTP search service.
//!
//! The service receives `{"query": "...", "k": 3}` and answers with a list
//! of passages. Both the plain shape (`passages` / `content`) and the
//! document-store shape (`documents` / `page_content`) are accepted.

use crate::config::FileRetrieverConfig;
use async_trait::async_trait;
use ragloop_application::ports::retriever::{RetrievalError, Retriever};
use ragloop_domain::core::string::truncate_str;
use ragloop_domain::{Metadata, Passage};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(alias = "documents")]
    passages: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(alias = "page_content")]
    content: String,
    #[serde(default)]
    metadata: Metadata,
}

/// Parse a search response body into passages, preserving order
pub fn parse_search_response(body: &str) -> Result<Vec<Passage>, RetrievalError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::InvalidResponse(format!("malformed body: {}", e)))?;

    Ok(response
        .passages
        .into_iter()
        .map(|hit| Passage {
            content: hit.content,
            metadata: hit.metadata,
        })
        .collect())
}

fn map_transport_error(e: reqwest::Error) -> RetrievalError {
    if e.is_timeout() {
        RetrievalError::Timeout
    } else if e.is_connect() {
        RetrievalError::Connection(e.to_string())
    } else {
        RetrievalError::RequestFailed(e.to_string())
    }
}

/// [`Retriever`] posting queries to a search endpoint
pub struct HttpRetriever {
    client: reqwest::Client,
    url: String,
    k: usize,
    api_key: Option<String>,
}

impl HttpRetriever {
    pub fn new(url: impl Into<String>, k: usize, timeout: Duration) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            k,
            api_key: None,
        })
    }

    /// Build from the `[retriever]` section.
    pub fn from_config(config: &FileRetrieverConfig) -> Result<Self, RetrievalError> {
        let url = config
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| RetrievalError::Other("retriever.url is not configured".to_string()))?;

        Ok(Self::new(
            url,
            config.effective_k(),
            Duration::from_secs(config.timeout_seconds),
        )?
        .with_api_key(config.resolve_api_key()))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<Passage>, RetrievalError> {
        info!("Searching for: '{}'", truncate_str(query, 100));

        let mut request = self.client.post(&self.url).json(&SearchRequest {
            query,
            k: self.k,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(RetrievalError::RequestFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate_str(&body, 300)
            )));
        }

        let passages = parse_search_response(&body)?;
        info!("Found {} relevant passage(s)", passages.len());
        for (i, passage) in passages.iter().enumerate() {
            debug!(
                "Passage {} source: {}",
                i + 1,
                passage.source().unwrap_or("unknown")
            );
        }
        Ok(passages)
    }
}
