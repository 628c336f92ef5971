//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use ragloop_application::{
    AnswerQuestionInput, AnswerQuestionUseCase, NoProgress, ProgressNotifier,
};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A line that is not a question
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Quit,
    Help,
    Clear,
    History,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a trimmed, non-empty line. Returns `None` for questions.
    fn parse(line: &str) -> Option<Self> {
        match line.to_lowercase().as_str() {
            "quit" | "exit" | "q" => return Some(ReplCommand::Quit),
            _ => {}
        }

        if !line.starts_with('/') {
            return None;
        }

        Some(match line {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/history" => ReplCommand::History,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<AnswerQuestionUseCase>,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(use_case: Arc<AnswerQuestionUseCase>) -> Self {
        Self {
            use_case,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.config.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.config.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        let params = self.use_case.params();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│             ragloop - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Model: {} | critique passes: {} | remembers {} exchange(s)",
            self.use_case.generator_model(),
            params.effective_max_iterations(),
            params.history_capacity.max(1)
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?       - Show this help");
        println!("  /history            - Show conversation history");
        println!("  /clear              - Forget conversation history");
        println!("  /quit, quit, exit   - Exit chat");
        println!();
    }

    /// Handle a command. Returns true if the REPL should exit.
    fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                true
            }
            ReplCommand::Help => {
                println!();
                Self::print_help();
                false
            }
            ReplCommand::Clear => {
                self.use_case.clear_history();
                println!("{}", "Conversation history cleared.".green());
                false
            }
            ReplCommand::History => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::format_history(&self.use_case.history())
                );
                println!();
                false
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    /// Answer one question. Ctrl+C while it runs cancels only this question.
    async fn process_question(&self, question: &str) {
        println!();

        let token = CancellationToken::new();
        let input = AnswerQuestionInput::new(question).with_cancellation(token.clone());

        let reporter = ProgressReporter::new();
        let progress: &dyn ProgressNotifier = if self.config.show_progress {
            &reporter
        } else {
            &NoProgress
        };

        let interrupt_watcher = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            }
        });
        let result = self.use_case.execute_with_progress(input, progress).await;
        interrupt_watcher.abort();

        match result {
            Ok(result) => println!("{}", ConsoleFormatter::format(&result)),
            Err(e) if e.is_cancelled() => println!("{}", "Cancelled.".yellow()),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
    }
}
