//! Infrastructure layer for ragloop
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;
pub mod retrieval;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAgentConfig, FileConfig, FileGeneratorConfig, FileLoggingConfig,
    FileOutputConfig, FileRetrieverConfig, FileServerConfig, GeneratorProvider,
};
pub use logging::JsonlConversationLogger;
pub use providers::{ChatEndpoint, OpenAiChatGenerator};
pub use retrieval::HttpRetriever;
