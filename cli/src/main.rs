//! CLI entrypoint for ragloop
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context as _, Result, bail};
use clap::Parser;
use ragloop_application::{AnswerQuestionInput, AnswerQuestionUseCase};
use ragloop_domain::{ConfigIssue, OutputFormat};
use ragloop_infrastructure::{
    ConfigLoader, FileConfig, HttpRetriever, JsonlConversationLogger, OpenAiChatGenerator,
};
use ragloop_presentation::{
    AppState, ChatRepl, Cli, ConsoleFormatter, OutputConfig, ReplConfig, progress_for_stderr,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, filter::LevelFilter, fmt, prelude::*};

/// Level for the rotating file log: everything from our own crates.
const FILE_LOG_FILTER: &str = "warn,ragloop=debug,ragloop_domain=debug,ragloop_application=debug,ragloop_infrastructure=debug,ragloop_presentation=debug";

/// File layers for `dir`: `agent.log` gets our crates' debug output and
/// `errors.log` only errors, both rotated daily.
///
/// The returned guards must stay alive for buffered file logs to be written.
fn file_layers(dir: &Path) -> (Box<dyn Layer<Registry> + Send + Sync>, Vec<WorkerGuard>) {
    let (agent_writer, agent_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "agent.log"));
    let agent_layer = fmt::layer()
        .with_writer(agent_writer)
        .with_ansi(false)
        .with_filter(EnvFilter::new(FILE_LOG_FILTER));

    let (error_writer, error_guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "errors.log"));
    let error_layer = fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    (
        agent_layer.and_then(error_layer).boxed(),
        vec![agent_guard, error_guard],
    )
}

/// Initialize tracing: console on stderr, plus log files when `log_dir` is set.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Vec<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file_layer, guards) = match log_dir {
        Some(dir) => {
            let (layer, guards) = file_layers(dir);
            (Some(layer), guards)
        }
        None => (None, Vec::new()),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guards
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    // --no-config skips discovered files and the environment; an explicit --config is still read
    let mut config = match (cli.no_config, cli.config.as_ref()) {
        (true, Some(path)) => ConfigLoader::load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (true, None) => ConfigLoader::load_defaults(),
        (false, explicit) => {
            ConfigLoader::load(explicit).context("failed to load configuration")?
        }
    };

    // Command-line overrides
    if let Some(max_iterations) = cli.max_iterations {
        config.agent.max_iterations = max_iterations;
    }
    if let Some(k) = cli.top_k {
        config.retriever.k = k;
    }
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    Ok(config)
}

/// Log every issue; fail if any of them is fatal.
fn check_config(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        warn!("{}", issue.message);
    }

    let errors: Vec<&str> = issues
        .iter()
        .filter(|i| i.is_error())
        .map(|i| i.message.as_str())
        .collect();
    if !errors.is_empty() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

fn build_use_case(config: &FileConfig) -> Result<AnswerQuestionUseCase> {
    let retriever = HttpRetriever::from_config(&config.retriever)?;
    let generator = OpenAiChatGenerator::from_config(&config.generator)?;
    info!(
        "Using model {} and {} passage(s) per question",
        config.generator.model,
        retriever.k()
    );

    let mut use_case = AnswerQuestionUseCase::new(
        Arc::new(retriever),
        Arc::new(generator),
        config.agent_params(),
    );

    if let Some(path) = config.logging.transcript_path() {
        match JsonlConversationLogger::open(&path) {
            Ok(logger) => {
                info!("Writing conversation transcript to {}", logger.path().display());
                use_case = use_case.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!(
                "Could not open conversation transcript {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(use_case)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref(), !cli.no_config);
        return Ok(());
    }

    let config = load_config(&cli)?;
    let _log_guards = init_tracing(cli.verbose, config.logging.dir_path().as_deref());

    info!("Starting ragloop");
    check_config(&config.validate())?;

    let output = OutputConfig {
        format: cli
            .output
            .map(OutputFormat::from)
            .or(config.output.format)
            .unwrap_or_default(),
        color: config.output.color,
        show_progress: config.output.show_progress && !cli.quiet,
    };
    output.apply();

    // === Dependency Injection ===
    let use_case = Arc::new(build_use_case(&config)?);

    // Serve mode
    if cli.serve {
        ragloop_presentation::serve(
            AppState::new(use_case),
            &config.server.host,
            config.server.port,
        )
        .await
        .with_context(|| {
            format!(
                "HTTP server on {}:{} failed",
                config.server.host, config.server.port
            )
        })?;
        return Ok(());
    }

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(use_case).with_config(ReplConfig {
            show_progress: output.show_progress,
            ..ReplConfig::default()
        });
        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let Some(question) = cli.question else {
        bail!("Question is required. Use --chat for interactive mode or --serve for the HTTP API.");
    };

    let input = AnswerQuestionInput::new(question);
    let result = if output.progress_enabled() {
        let progress = progress_for_stderr();
        use_case.execute_with_progress(input, progress.as_ref()).await?
    } else {
        use_case.execute(input).await?
    };

    let rendered = match output.format {
        OutputFormat::Text => ConsoleFormatter::format(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };
    println!("{}", rendered);

    Ok(())
}
