//! Verdict and Critique value objects

use serde::{Deserialize, Serialize};

/// Note attached to an approving critique.
pub(crate) const SATISFACTORY_NOTE: &str = "Answer is satisfactory";

/// Note attached to a critique that fell back to approval after a failure.
pub(crate) const DEGRADED_NOTE: &str = "Error in critique, accepting answer";

/// Outcome of evaluating one candidate answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    NeedsImprovement { feedback: String },
}

impl Verdict {
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }

    /// Feedback to feed into a revision, if any
    pub fn feedback(&self) -> Option<&str> {
        match self {
            Verdict::Approved => None,
            Verdict::NeedsImprovement { feedback } => Some(feedback),
        }
    }
}

/// A verdict plus the critic's diagnostic note (Value Object)
///
/// `degraded` marks a critique that could not be obtained and was replaced
/// by an approval so that answer delivery is never blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    pub verdict: Verdict,
    pub note: String,
    pub degraded: bool,
}

impl Critique {
    pub fn approved() -> Self {
        Self {
            verdict: Verdict::Approved,
            note: SATISFACTORY_NOTE.to_string(),
            degraded: false,
        }
    }

    pub fn needs_improvement(feedback: impl Into<String>) -> Self {
        let feedback = feedback.into();
        Self {
            note: feedback.clone(),
            verdict: Verdict::NeedsImprovement { feedback },
            degraded: false,
        }
    }

    /// Approval substituted for a critique whose evaluation call failed
    pub fn degraded() -> Self {
        Self {
            verdict: Verdict::Approved,
            note: DEGRADED_NOTE.to_string(),
            degraded: true,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verdict.is_approved()
    }
}
