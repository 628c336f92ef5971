//! Stages of the answer loop

use serde::{Deserialize, Serialize};

/// A stage of one question run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Retrieving,
    Generating,
    Critiquing,
    Revising,
    Finalizing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Retrieving => "retrieving",
            Stage::Generating => "generating",
            Stage::Critiquing => "critiquing",
            Stage::Revising => "revising",
            Stage::Finalizing => "finalizing",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
