//! Agent parameters — answer loop control.
//!
//! [`AgentParams`] groups the static parameters that control
//! [`AnswerQuestionUseCase`](crate::use_cases::answer_question::AnswerQuestionUseCase).

use ragloop_domain::DEFAULT_HISTORY_CAPACITY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Answer loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Maximum critique passes per question, including the first one.
    pub max_iterations: usize,
    /// Number of exchanges kept in conversation memory.
    pub history_capacity: usize,
    /// Number of most recent exchanges rendered into prompts.
    pub history_window: usize,
    /// Characters of context shown to the critic.
    pub context_preview_chars: usize,
    /// Upper bound on the duration of a whole run.
    pub timeout: Option<Duration>,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_iterations: 2,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_window: 3,
            context_preview_chars: 500,
            timeout: None,
        }
    }
}

impl AgentParams {
    // ==================== Builder Methods ====================

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_context_preview_chars(mut self, chars: usize) -> Self {
        self.context_preview_chars = chars;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Critique budget actually used by the loop; at least one pass always runs.
    pub fn effective_max_iterations(&self) -> usize {
        self.max_iterations.max(1)
    }
}
