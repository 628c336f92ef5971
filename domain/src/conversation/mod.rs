//! Conversation domain
//!
//! Short rolling history of question/answer pairs used to resolve
//! follow-up questions.

mod memory;

pub use memory::{ConversationMemory, DEFAULT_HISTORY_CAPACITY, Exchange};
