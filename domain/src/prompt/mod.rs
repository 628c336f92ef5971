//! Prompt domain
//!
//! Templates for the draft, revision and critique prompts.

mod template;

pub use template::PromptTemplate;
