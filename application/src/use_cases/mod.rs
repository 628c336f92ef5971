//! Application use cases
//!
//! - [`answer_question`] — the retrieve / draft / critique / revise loop
//! - [`critique_answer`] — the quality gate used inside that loop

pub mod answer_question;
pub mod critique_answer;
