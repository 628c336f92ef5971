//! Text generation providers.
//!
//! - [`openai::OpenAiChatGenerator`] — OpenAI and Azure OpenAI chat completions

pub mod openai;

pub use openai::{ChatEndpoint, OpenAiChatGenerator};
