//! lecli - Command-line client for the Logentries REST API

mod commands;
mod render;
mod settings;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::Cli;

const DEFAULT_LOG_FILTER: &str = "lecli=warn,lecli_core=warn,lecli_infra_http=warn";

/// Logging goes to stderr so command output on stdout stays clean
fn init_tracing() -> Result<()> {
    let log_format = std::env::var("LECLI_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
