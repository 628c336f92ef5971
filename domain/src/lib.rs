//! Domain layer for ragloop
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Answer loop
//!
//! A question is answered from retrieved [`Passage`]s joined into a
//! [`Context`]. The draft answer goes through a bounded self-critique loop:
//! each pass yields a [`Critique`] whose [`Verdict`] either approves the
//! answer or asks for a revision with feedback.
//!
//! ## Conversation memory
//!
//! [`ConversationMemory`] keeps the last few [`Exchange`]s so follow-up
//! questions can refer to earlier answers.

pub mod answer;
pub mod config;
pub mod conversation;
pub mod core;
pub mod critique;
pub mod prompt;
pub mod retrieval;

// Re-export commonly used types
pub use answer::{AnswerResult, Stage, Termination};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::{ConversationMemory, DEFAULT_HISTORY_CAPACITY, Exchange};
pub use core::{error::DomainError, question::Question};
pub use critique::{Critique, Verdict, parse_critique_response};
pub use prompt::PromptTemplate;
pub use retrieval::{Context, Metadata, Passage};
