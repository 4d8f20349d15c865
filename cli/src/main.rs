//! CLI entrypoint for Expense Agent
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use clap::Parser;
use expense_application::{
    Agent, AgentManager, EventLogger, NoEventLogger, Oracle, ToolExecutorPort, UnavailableOracle,
};
use expense_domain::AgentInput;
use expense_infrastructure::{
    ConfigLoader, FileConfig, FileLoggingConfig, JsonlEventLogger, default_registry,
};
use expense_presentation::{Cli, ConsoleFormatter, OutputFormat};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "expense-agent.log";

/// Console logging plus an optional daily file; the guard flushes the file on drop.
fn init_tracing(cli: &Cli, logging: &FileLoggingConfig) -> Option<WorkerGuard> {
    let level = cli
        .log_level()
        .or(logging.level.as_deref())
        .unwrap_or("warn");

    let (file_layer, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(feature = "gemini")]
fn build_oracle(config: &FileConfig) -> Arc<dyn Oracle> {
    match expense_infrastructure::GeminiOracle::new(&config.oracle) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            warn!("Gemini oracle unavailable: {}", e);
            Arc::new(UnavailableOracle::new(e.to_string()))
        }
    }
}

#[cfg(not(feature = "gemini"))]
fn build_oracle(_config: &FileConfig) -> Arc<dyn Oracle> {
    Arc::new(UnavailableOracle::new("built without the gemini feature"))
}

fn build_event_logger(logging: &FileLoggingConfig) -> Arc<dyn EventLogger> {
    match logging.event_log.as_ref().and_then(JsonlEventLogger::new) {
        Some(logger) => Arc::new(logger),
        None => Arc::new(NoEventLogger),
    }
}

fn build_input(cli: &Cli) -> Result<AgentInput> {
    let mut input = if let Some(text) = &cli.text {
        AgentInput::text(text.clone())
    } else if let Some(path) = &cli.image {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        AgentInput::image(STANDARD.encode(bytes))
    } else {
        bail!("Nothing to process. Pass --text, --image or --status.");
    };

    if let Some(date) = &cli.date {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{}', expected YYYY-MM-DD", date))?;
        input = input.with_message_date(date.clone());
    }
    Ok(input)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };

    let _guard = init_tracing(&cli, &config.logging);
    for issue in config.validate() {
        warn!("Configuration: {}", issue);
    }

    info!("Starting Expense Agent");

    // === Dependency Injection ===
    let oracle = build_oracle(&config);
    let tools: Arc<dyn ToolExecutorPort> = Arc::new(default_registry(oracle.clone(), &config));
    let logger = build_event_logger(&config.logging);
    let behavior = config.behavior();

    let receipt_agent = Agent::receipt_processing(oracle.clone(), tools.clone())
        .with_config(behavior.clone())
        .with_event_logger(logger.clone());
    let text_agent = Agent::text_expense(oracle.clone(), tools)
        .with_config(behavior.clone())
        .with_event_logger(logger.clone());

    let mut manager = AgentManager::with_config(oracle, behavior).with_event_logger(logger);
    manager.register_agent(Arc::new(receipt_agent));
    manager.register_agent(Arc::new(text_agent));

    if cli.status {
        let status = manager.system_status().await;
        let output = match cli.output {
            OutputFormat::Human => ConsoleFormatter::format_status(&status),
            OutputFormat::Json => ConsoleFormatter::format_json(&status),
        };
        println!("{}", output);
        return Ok(ExitCode::SUCCESS);
    }

    let input = build_input(&cli)?;
    let outcome = match &cli.agent {
        Some(name) => manager.execute_agent(name, input).await,
        None => manager.route(input).await,
    };

    let output = match cli.output {
        OutputFormat::Human => ConsoleFormatter::format(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", output);

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
