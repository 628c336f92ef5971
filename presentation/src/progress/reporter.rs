//! Progress reporting for the answer loop

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use ragloop_application::ports::progress::ProgressNotifier;
use ragloop_domain::{Critique, Stage};
use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

fn stage_display_name(stage: Stage, iteration: usize) -> String {
    match stage {
        Stage::Retrieving => "Retrieving passages".to_string(),
        Stage::Generating => "Drafting answer".to_string(),
        Stage::Critiquing => format!("Critique pass {}", iteration),
        Stage::Revising => format!("Revising answer ({})", iteration),
        Stage::Finalizing => "Finalizing".to_string(),
    }
}

fn critique_summary(critique: &Critique) -> String {
    if critique.degraded {
        format!("{} critic unavailable, accepting answer", "!".yellow())
    } else if critique.is_approved() {
        format!("{} approved", "v".green())
    } else {
        format!("{} {}", "x".yellow(), critique.note)
    }
}

/// Reports progress with a spinner that follows the current stage
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut spinner) = self.spinner.lock() {
            f(&mut spinner);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage, iteration: usize) {
        self.with_spinner(|spinner| {
            let pb = spinner.get_or_insert_with(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            });
            pb.set_prefix(stage_display_name(stage, iteration));
            pb.set_message("...");
        });
    }

    fn on_critique(&self, iteration: usize, max_iterations: usize, critique: &Critique) {
        self.with_spinner(|spinner| {
            if let Some(pb) = spinner.as_ref() {
                pb.println(format!(
                    "  [{}/{}] {}",
                    iteration,
                    max_iterations,
                    critique_summary(critique)
                ));
            }
        });
    }

    fn on_finished(&self, success: bool) {
        self.with_spinner(|spinner| {
            if let Some(pb) = spinner.take() {
                if success {
                    pb.finish_and_clear();
                } else {
                    pb.abandon_with_message("failed".red().to_string());
                }
            }
        });
    }
}

/// Line-per-stage progress on stderr, for when stderr is not a terminal
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage, iteration: usize) {
        eprintln!("{} {}", "->".cyan(), stage_display_name(stage, iteration).bold());
    }

    fn on_critique(&self, iteration: usize, max_iterations: usize, critique: &Critique) {
        eprintln!(
            "  [{}/{}] {}",
            iteration,
            max_iterations,
            critique_summary(critique)
        );
    }

    fn on_finished(&self, success: bool) {
        if !success {
            eprintln!("  {} failed", "x".red());
        }
    }
}

/// Pick the progress display for the current stderr
pub fn progress_for_stderr() -> Box<dyn ProgressNotifier> {
    if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    }
}
