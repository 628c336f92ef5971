//! Output formatting

pub mod console;

pub use console::{AnswerView, ConsoleFormatter};
