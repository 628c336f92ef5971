//! Console output formatter for answers

use colored::Colorize;
use ragloop_domain::{AnswerResult, Exchange, Termination};
use serde::{Deserialize, Serialize};

/// Public shape of an answer: what the CLI's JSON mode and `/ask` return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerView {
    pub question: String,
    pub answer: String,
    pub sources: usize,
}

impl From<&AnswerResult> for AnswerView {
    fn from(result: &AnswerResult) -> Self {
        Self {
            question: result.question.clone(),
            answer: result.answer.clone(),
            sources: result.source_count,
        }
    }
}

/// Formats answers for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an answer with its source summary
    pub fn format(result: &AnswerResult) -> String {
        let mut output = String::new();

        output.push_str(&format!("{} {}\n\n", "Q:".cyan().bold(), result.question));
        output.push_str(&format!("{} {}\n\n", "A:".green().bold(), result.answer));
        output.push_str(&Self::footer(result));

        output
    }

    /// Format as JSON
    pub fn format_json(result: &AnswerResult) -> String {
        serde_json::to_string_pretty(&AnswerView::from(result)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the conversation memory for `/history`
    pub fn format_history(exchanges: &[Exchange]) -> String {
        if exchanges.is_empty() {
            return format!("{}\n", "No conversation history yet.".dimmed());
        }

        let mut output = String::new();
        for (i, exchange) in exchanges.iter().enumerate() {
            output.push_str(&format!(
                "{} {}\n",
                format!("[{}] Q:", i + 1).cyan().bold(),
                exchange.question
            ));
            output.push_str(&format!("    {} {}\n", "A:".green(), exchange.answer));
        }
        output
    }

    fn footer(result: &AnswerResult) -> String {
        let outcome = match result.termination {
            Termination::Approved => "approved",
            Termination::BudgetExhausted => "not approved, iteration budget reached",
            Termination::RevisionFailed => "revision failed, kept previous answer",
            Termination::CriticUnavailable => "critic unavailable, accepted as is",
        };
        let outcome = if result.termination.passed_quality_gate() {
            outcome.green()
        } else {
            outcome.yellow()
        };

        format!(
            "{}\n",
            format!(
                "Sources: {} | critique passes: {} | revisions: {} | {}",
                result.source_count, result.critique_passes, result.revisions, outcome
            )
            .dimmed()
        )
    }
}
