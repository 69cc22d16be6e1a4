use super::{print_examples, read_json_file};
use crate::render;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use lecli_core::application::{
    ApiClient, ApiKeyService, LogService, LogsetService, SavedQueryFields, SavedQueryService,
    TeamService,
};
use std::path::PathBuf;

const API_KEY_EXAMPLES: &[&str] = &[
    "lecli update apikey 12345678-aaaa-bbbb-1234-1234cb123456 --enable",
    "lecli update apikey 12345678-aaaa-bbbb-1234-1234cb123456 --disable",
];

#[derive(Subcommand, Debug)]
pub enum LogsetChange {
    /// Add a log to a logset
    #[command(name = "add_log")]
    AddLog { logset_id: String, log_id: String },
    /// Remove a log from a logset
    #[command(name = "delete_log")]
    DeleteLog { logset_id: String, log_id: String },
}

#[derive(Subcommand, Debug)]
pub enum TeamChange {
    /// Add a user to a team
    #[command(name = "add_user")]
    AddUser { team_id: String, user_key: String },
    /// Remove a user from a team
    #[command(name = "delete_user")]
    DeleteUser { team_id: String, user_key: String },
}

#[derive(Args, Debug)]
pub struct SavedQueryChanges {
    pub query_id: String,

    /// New name
    #[arg(short, long)]
    pub name: Option<String>,

    /// New LEQL statement
    #[arg(short, long)]
    pub statement: Option<String>,

    /// Time to query from (unix epoch)
    #[arg(short = 'f', long = "timefrom")]
    pub time_from: Option<i64>,

    /// Time to query to (unix epoch)
    #[arg(short = 't', long = "timeto")]
    pub time_to: Option<i64>,

    /// Relative time range, e.g. "last 2 hours"
    #[arg(short = 'r', long = "relative_range")]
    pub relative_range: Option<String>,

    /// Log keys, colon separated
    #[arg(short = 'l', long)]
    pub logs: Option<String>,
}

impl SavedQueryChanges {
    fn fields(&self) -> SavedQueryFields {
        SavedQueryFields {
            name: self.name.clone(),
            statement: self.statement.clone(),
            from: self.time_from,
            to: self.time_to,
            time_range: self.relative_range.clone(),
            logs: self.logs.clone(),
        }
    }
}

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum UpdateCommand {
    /// Merge the JSON document in FILENAME into a log
    Log { log_id: String, filename: PathBuf },
    /// Add or remove logs of a logset
    Logset {
        #[command(subcommand)]
        change: LogsetChange,
    },
    /// Add or remove team members
    Team {
        #[command(subcommand)]
        change: TeamChange,
    },
    /// Enable or disable an API key
    ApiKey {
        api_key_id: String,
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
    /// Change attributes of a saved query
    SavedQuery(SavedQueryChanges),
}

pub async fn run(client: ApiClient, noun: UpdateCommand) -> Result<()> {
    let updated = match noun {
        UpdateCommand::Log { log_id, filename } => {
            let params = read_json_file(&filename)?;
            LogService::new(client)
                .update(&log_id, params)
                .await
                .context("Update log failed")?
        }
        UpdateCommand::Logset { change } => {
            let logsets = LogsetService::new(client);
            match change {
                LogsetChange::AddLog { logset_id, log_id } => logsets
                    .add_log(&logset_id, &log_id)
                    .await
                    .context("Add log to logset failed")?,
                LogsetChange::DeleteLog { logset_id, log_id } => logsets
                    .remove_log(&logset_id, &log_id)
                    .await
                    .context("Delete log from logset failed")?,
            }
        }
        UpdateCommand::Team { change } => {
            let teams = TeamService::new(client);
            let team = match change {
                TeamChange::AddUser { team_id, user_key } => teams
                    .add_user(&team_id, &user_key)
                    .await
                    .context("Add user to team failed")?,
                TeamChange::DeleteUser { team_id, user_key } => teams
                    .remove_user(&team_id, &user_key)
                    .await
                    .context("Delete user from team failed")?,
            };
            render::print_lines(&render::teams_lines(&team));
            return Ok(());
        }
        UpdateCommand::ApiKey {
            api_key_id,
            enable,
            disable,
        } => {
            if !enable && !disable {
                print_examples(API_KEY_EXAMPLES);
                return Ok(());
            }
            ApiKeyService::new(client)
                .set_active(&api_key_id, enable)
                .await
                .context("Update api key failed")?
        }
        UpdateCommand::SavedQuery(changes) => {
            let query = SavedQueryService::new(client)
                .update(&changes.query_id, &changes.fields())
                .await
                .context("Update saved query failed")?;
            render::print_lines(&render::saved_queries_lines(&query));
            return Ok(());
        }
    };

    render::print_json(&updated);
    Ok(())
}
