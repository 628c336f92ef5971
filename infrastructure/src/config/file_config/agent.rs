//! Agent configuration from TOML (`[agent]` section)

use ragloop_application::AgentParams;
use ragloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_iterations = 2           # critique passes, including the first
/// history_capacity = 5         # exchanges remembered
/// history_window = 3           # exchanges rendered into prompts
/// context_preview_chars = 500  # context shown to the critic
/// timeout_seconds = 120        # whole-run deadline (unset = none)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub max_iterations: usize,
    pub history_capacity: usize,
    pub history_window: usize,
    pub context_preview_chars: usize,
    pub timeout_seconds: Option<u64>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = AgentParams::default();
        Self {
            max_iterations: params.max_iterations,
            history_capacity: params.history_capacity,
            history_window: params.history_window,
            context_preview_chars: params.context_preview_chars,
            timeout_seconds: None,
        }
    }
}

impl FileAgentConfig {
    /// Report values that the answer loop will silently raise.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_iterations == 0 {
            issues.push(ConfigIssue::below_minimum("agent.max_iterations", 0, 1));
        }
        if self.history_capacity == 0 {
            issues.push(ConfigIssue::below_minimum("agent.history_capacity", 0, 1));
        }
        if self.timeout_seconds == Some(0) {
            issues.push(ConfigIssue::below_minimum("agent.timeout_seconds", 0, 1));
        }
        issues
    }

    pub fn to_agent_params(&self) -> AgentParams {
        AgentParams::default()
            .with_max_iterations(self.max_iterations.max(1))
            .with_history_capacity(self.history_capacity.max(1))
            .with_history_window(self.history_window)
            .with_context_preview_chars(self.context_preview_chars)
            .with_timeout(
                self.timeout_seconds
                    .map(|secs| Duration::from_secs(secs.max(1))),
            )
    }
}
