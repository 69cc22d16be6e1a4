//! Command tree: `lecli <verb> <noun> [args]`

mod create;
mod delete;
mod get;
mod query;
mod rename;
mod replace;
mod tail;
mod update;

use crate::settings::{self, Loaded};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use lecli_core::application::ApiClient;
use lecli_core::domain::{DomainError, QueryOptions};
use lecli_core::port::SystemClock;
use lecli_infra_http::{ReqwestTransport, DEFAULT_TIMEOUT};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub use query::QueryArgs;

#[derive(Parser)]
#[command(name = "lecli")]
#[command(about = "Logentries Command Line Interface", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "LECLI_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum Commands {
    /// Get resources, events and usage
    Get {
        #[command(subcommand)]
        noun: get::GetCommand,
    },

    /// Create resources
    Create {
        #[command(subcommand)]
        noun: create::CreateCommand,
    },

    /// Delete resources
    Delete {
        #[command(subcommand)]
        noun: delete::DeleteCommand,
    },

    /// Update resources
    Update {
        #[command(subcommand)]
        noun: update::UpdateCommand,
    },

    /// Rename resources
    Rename {
        #[command(subcommand)]
        noun: rename::RenameCommand,
    },

    /// Replace resources with the content of a JSON file
    Replace {
        #[command(subcommand)]
        noun: replace::ReplaceCommand,
    },

    /// Query logs using LEQL
    Query(QueryArgs),

    /// Live tail
    Tail {
        #[command(subcommand)]
        noun: tail::TailCommand,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let client = connect(cli.config.as_deref())?;

    match cli.command {
        Commands::Get { noun } => get::run(client, noun).await,
        Commands::Create { noun } => create::run(client, noun).await,
        Commands::Delete { noun } => delete::run(client, noun).await,
        Commands::Update { noun } => update::run(client, noun).await,
        Commands::Rename { noun } => rename::run(client, noun).await,
        Commands::Replace { noun } => replace::run(client, noun).await,
        Commands::Query(args) => query::run(client, args).await,
        Commands::Tail { noun } => tail::run(client, noun).await,
    }
}

/// Load the configuration and wire the API client
fn connect(config_path: Option<&Path>) -> Result<ApiClient> {
    let config = match settings::load(config_path)? {
        Loaded::Ready(config) => config,
        Loaded::TemplateWritten(path) => bail!(settings::template_message(&path)),
    };
    debug!(source = ?config.source, "Configuration loaded");

    let transport = ReqwestTransport::new(DEFAULT_TIMEOUT).context("Failed to build HTTP client")?;

    Ok(ApiClient::new(
        Arc::new(transport),
        Arc::new(config),
        Arc::new(SystemClock),
    ))
}

/// Read a JSON document from a file
pub(crate) fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Ask a yes/no question on stdin; anything but y/yes declines
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| anyhow!("Failed to read confirmation: {}", e))?;

    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Print example invocations after an invalid flag combination
pub(crate) fn print_examples(examples: &[&str]) {
    for example in examples {
        println!("Example usage: {}", example);
    }
}

/// Validate query options before any request is made
///
/// Returns `Ok(false)` after printing the examples when input is merely
/// missing. Conflicting options print the examples and fail.
pub(crate) fn check_query_options(options: &QueryOptions, examples: &[&str]) -> Result<bool> {
    match options.validate() {
        Ok(()) => Ok(true),
        Err(DomainError::IncompleteOptions(missing)) => {
            debug!(?missing, "Incomplete query options");
            print_examples(examples);
            Ok(false)
        }
        Err(err) => {
            print_examples(examples);
            Err(err.into())
        }
    }
}
