//! Application layer for ragloop
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::AgentParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    progress::{NoProgress, ProgressNotifier},
    retriever::{RetrievalError, Retriever},
    text_generator::{GenerationError, TextGenerator},
};
pub use use_cases::answer_question::{
    AnswerQuestionError, AnswerQuestionInput, AnswerQuestionUseCase,
};
pub use use_cases::critique_answer::{Critic, LlmCritic};
