//! Presentation layer for ragloop
//!
//! This crate contains CLI definitions, output formatters, progress
//! reporters, the interactive chat interface and the HTTP API.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;
pub mod server;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{Cli, OutputFormat};
pub use config::{OutputConfig, ReplConfig};
pub use output::console::{AnswerView, ConsoleFormatter};
pub use progress::reporter::{ProgressReporter, SimpleProgress, progress_for_stderr};
pub use server::{AppState, create_router, serve};
