//! Progress reporting

pub mod reporter;

pub use reporter::{ProgressReporter, SimpleProgress, progress_for_stderr};
