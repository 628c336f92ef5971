//! Progress notification port
//!
//! Defines the interface for reporting progress while a question is answered.

use ragloop_domain::{Critique, Stage};

/// Callback for progress updates during one question run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain text, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts. `iteration` is 1-based for critique and
    /// revision stages and 0 otherwise.
    fn on_stage_start(&self, stage: Stage, iteration: usize);

    /// Called when the critic returns its verdict for a pass
    fn on_critique(&self, _iteration: usize, _max_iterations: usize, _critique: &Critique) {}

    /// Called when the run is over, successfully or not
    fn on_finished(&self, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage, _iteration: usize) {}
    fn on_finished(&self, _success: bool) {}
}
