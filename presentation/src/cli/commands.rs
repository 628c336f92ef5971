//! CLI command definitions

use clap::{Parser, ValueEnum};
use ragloop_domain::OutputFormat as DomainOutputFormat;
use std::path::PathBuf;

/// Output format for answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer with a short source summary
    Text,
    /// JSON object with question, answer and source count
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => DomainOutputFormat::Text,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for ragloop
#[derive(Parser, Debug)]
#[command(name = "ragloop")]
#[command(author, version, about = "Retrieval-augmented answers with a self-critique loop")]
#[command(long_about = r#"
ragloop answers questions from a knowledge base and checks its own work.

Each question goes through:
1. Retrieval: passages are fetched from the configured search endpoint
2. Draft: an answer is generated from the passages and recent conversation
3. Critique: the answer is graded and revised until approved or out of budget

Configuration files are loaded from (in priority order):
1. RAGLOOP_* environment variables
2. --config <path>     Explicit config file
3. ./ragloop.toml      Project-level config
4. ~/.config/ragloop/config.toml   Global config

Example:
  ragloop "What is aspirin used for?"
  ragloop --chat
  ragloop --serve --port 5000
"#)]
pub struct Cli {
    /// The question to answer (not required in chat or serve mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long, conflicts_with = "serve")]
    pub chat: bool,

    /// Serve the HTTP API
    #[arg(long)]
    pub serve: bool,

    /// Address to bind in serve mode (overrides [server] host)
    #[arg(long, value_name = "HOST", requires = "serve")]
    pub host: Option<String>,

    /// Port to bind in serve mode (overrides [server] port)
    #[arg(long, value_name = "PORT", requires = "serve")]
    pub port: Option<u16>,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Maximum critique passes per question
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Passages retrieved per question
    #[arg(short = 'k', long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip discovered config files and RAGLOOP_* variables (--config is still read)
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
