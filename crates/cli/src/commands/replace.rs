use super::read_json_file;
use crate::render;
use anyhow::{Context, Result};
use clap::Subcommand;
use lecli_core::application::{ApiClient, LogService, LogsetService};
use std::path::PathBuf;

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum ReplaceCommand {
    /// Replace a log with the JSON document in FILENAME
    Log { log_id: String, filename: PathBuf },
    /// Replace a logset with the JSON document in FILENAME
    Logset { logset_id: String, filename: PathBuf },
}

pub async fn run(client: ApiClient, noun: ReplaceCommand) -> Result<()> {
    let replaced = match noun {
        ReplaceCommand::Log { log_id, filename } => {
            let params = read_json_file(&filename)?;
            LogService::new(client)
                .replace(&log_id, &params)
                .await
                .context("Replace log failed")?
        }
        ReplaceCommand::Logset {
            logset_id,
            filename,
        } => {
            let params = read_json_file(&filename)?;
            LogsetService::new(client)
                .replace(&logset_id, &params)
                .await
                .context("Replace logset failed")?
        }
    };

    render::print_json(&replaced);
    Ok(())
}
