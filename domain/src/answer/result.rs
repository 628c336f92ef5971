//! Answer result value objects

use serde::{Deserialize, Serialize};

/// Why the critique loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The critic approved the current answer.
    Approved,
    /// The iteration budget ran out while the critic still asked for changes.
    BudgetExhausted,
    /// A revision call failed; the previous answer was kept.
    RevisionFailed,
    /// The critic could not evaluate the answer and fell back to approval.
    CriticUnavailable,
}

impl Termination {
    /// Whether the final answer actually passed the quality gate
    pub fn passed_quality_gate(&self) -> bool {
        matches!(self, Termination::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Approved => "approved",
            Termination::BudgetExhausted => "budget_exhausted",
            Termination::RevisionFailed => "revision_failed",
            Termination::CriticUnavailable => "critic_unavailable",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of answering one question (Value Object)
///
/// Immutable once constructed. Only `question` and `answer` outlive the
/// call, reduced into a conversation exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    pub question: String,
    pub answer: String,
    pub context: String,
    /// Number of passages returned by retrieval
    #[serde(rename = "sources")]
    pub source_count: usize,
    /// Critique calls performed
    pub critique_passes: usize,
    /// Successful revisions applied
    pub revisions: usize,
    pub termination: Termination,
}
