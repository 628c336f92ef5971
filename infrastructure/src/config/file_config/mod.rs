//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod generator;
mod logging;
mod output;
mod retriever;
mod server;

pub use agent::FileAgentConfig;
pub use generator::{FileAzureConfig, FileGeneratorConfig, FileOpenAiConfig, GeneratorProvider};
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use retriever::FileRetrieverConfig;
pub use server::FileServerConfig;

use ragloop_application::AgentParams;
use ragloop_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Answer loop settings
    pub agent: FileAgentConfig,
    /// Search endpoint settings
    pub retriever: FileRetrieverConfig,
    /// Chat completions settings
    pub generator: FileGeneratorConfig,
    /// HTTP server settings
    pub server: FileServerConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file settings
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Out-of-range numbers are warnings (they get normalized); values a
    /// provider cannot work without are errors.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.agent.validate());
        issues.extend(self.retriever.validate());
        issues.extend(self.generator.validate());
        issues
    }

    pub fn agent_params(&self) -> AgentParams {
        self.agent.to_agent_params()
    }
}
