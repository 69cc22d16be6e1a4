use super::print_examples;
use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use lecli_core::application::{
    ApiClient, ApiKeyService, LogService, LogsetService, SavedQueryService, TeamService,
    UserService,
};

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum DeleteCommand {
    /// Delete a log
    Log { log_id: String },
    /// Delete a logset
    Logset { logset_id: String },
    /// Delete a team
    Team { team_id: String },
    /// Remove a user from the account
    User {
        /// User key of the user to remove
        #[arg(short = 'u', long = "userkey")]
        user_key: Option<String>,
    },
    /// Delete an API key
    ApiKey { api_key_id: String },
    /// Delete a saved query
    SavedQuery { query_id: String },
}

fn deleted(message: String) {
    println!("{}", format!("✓ {}", message).green().bold());
}

pub async fn run(client: ApiClient, noun: DeleteCommand) -> Result<()> {
    match noun {
        DeleteCommand::Log { log_id } => {
            LogService::new(client)
                .delete(&log_id)
                .await
                .context("Delete log failed")?;
            deleted(format!("Deleted log with id: {}", log_id));
        }
        DeleteCommand::Logset { logset_id } => {
            LogsetService::new(client)
                .delete(&logset_id)
                .await
                .context("Delete logset failed")?;
            deleted(format!("Deleted logset with id: {}", logset_id));
        }
        DeleteCommand::Team { team_id } => {
            TeamService::new(client)
                .delete(&team_id)
                .await
                .context("Delete team failed")?;
            deleted(format!("Deleted team with id: {}", team_id));
        }
        DeleteCommand::User { user_key } => match user_key {
            Some(user_key) => {
                UserService::new(client)
                    .delete(&user_key)
                    .await
                    .context("Delete user failed")?;
                deleted(format!("Deleted user with key: {}", user_key));
            }
            None => print_examples(&["lecli delete user -u 12345678-aaaa-bbbb-1234-1234cb123456"]),
        },
        DeleteCommand::ApiKey { api_key_id } => {
            ApiKeyService::new(client)
                .delete(&api_key_id)
                .await
                .context("Delete api key failed")?;
            deleted(format!("Deleted api key with id: {}", api_key_id));
        }
        DeleteCommand::SavedQuery { query_id } => {
            SavedQueryService::new(client)
                .delete(&query_id)
                .await
                .context("Delete saved query failed")?;
            deleted(format!("Deleted saved query with id: {}", query_id));
        }
    }

    Ok(())
}
