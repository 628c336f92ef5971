//! Context value object — the prompt text assembled from retrieved passages.

use super::passage::Passage;
use crate::core::string::prefix_chars;

/// Separator placed between passage contents.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Concatenated passage content for one question (Value Object)
///
/// Derived from the passages of a single retrieval call, in retrieval order.
/// Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    text: String,
}

impl Context {
    /// Join the passages' content with [`CONTEXT_SEPARATOR`], preserving order.
    pub fn from_passages(passages: &[Passage]) -> Self {
        let text = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The first `max_chars` characters, used to bound critique prompts.
    pub fn preview(&self, max_chars: usize) -> &str {
        prefix_chars(&self.text, max_chars)
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
