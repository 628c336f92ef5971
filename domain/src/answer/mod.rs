//! Answer domain - the stages of one question run and its terminal output.

mod result;
mod stage;

pub use result::{AnswerResult, Termination};
pub use stage::Stage;
