//! Retriever configuration from TOML (`[retriever]` section)

use ragloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Raw retriever configuration from TOML
///
/// # Example
///
/// ```toml
/// [retriever]
/// url = "http://localhost:8000/search"
/// k = 3
/// api_key_env = "RAGLOOP_SEARCH_KEY"   # optional bearer token
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetrieverConfig {
    /// Search endpoint receiving `{"query", "k"}`
    pub url: Option<String>,
    /// Passages requested per question
    pub k: usize,
    /// Environment variable holding the bearer token
    pub api_key_env: Option<String>,
    /// Inline bearer token (prefer `api_key_env`)
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for FileRetrieverConfig {
    fn default() -> Self {
        Self {
            url: None,
            k: 3,
            api_key_env: None,
            api_key: None,
            timeout_seconds: 30,
        }
    }
}

impl FileRetrieverConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            issues.push(ConfigIssue::missing(
                "retriever.url",
                "retriever.url is not set; questions cannot be answered without a search endpoint",
            ));
        }
        if self.k == 0 {
            issues.push(ConfigIssue::below_minimum("retriever.k", 0, 1));
        }
        issues
    }

    /// Resolve the bearer token, preferring the environment over the inline value.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// `k` with the same floor as [`validate`](Self::validate) reports
    pub fn effective_k(&self) -> usize {
        self.k.max(1)
    }
}
