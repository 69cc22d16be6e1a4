use crate::render;
use anyhow::{Context, Result};
use clap::Subcommand;
use lecli_core::application::{ApiClient, LogService, LogsetService, TeamService};

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum RenameCommand {
    /// Rename a log
    Log { log_id: String, name: String },
    /// Rename a logset
    Logset { logset_id: String, name: String },
    /// Rename a team
    Team { team_id: String, name: String },
}

pub async fn run(client: ApiClient, noun: RenameCommand) -> Result<()> {
    let renamed = match noun {
        RenameCommand::Log { log_id, name } => LogService::new(client)
            .rename(&log_id, &name)
            .await
            .context("Rename log failed")?,
        RenameCommand::Logset { logset_id, name } => LogsetService::new(client)
            .rename(&logset_id, &name)
            .await
            .context("Rename logset failed")?,
        RenameCommand::Team { team_id, name } => {
            let team = TeamService::new(client)
                .rename(&team_id, &name)
                .await
                .context("Rename team failed")?;
            render::print_lines(&render::teams_lines(&team));
            return Ok(());
        }
    };

    render::print_json(&renamed);
    Ok(())
}
