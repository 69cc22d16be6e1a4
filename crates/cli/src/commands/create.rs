use super::{confirm, print_examples, read_json_file};
use crate::render;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use lecli_core::application::{
    ApiClient, ApiKeyService, LogService, LogsetService, NewResource, NewUser, SavedQueryFields,
    SavedQueryService, TeamService, UserService,
};
use std::path::PathBuf;

const LOG_EXAMPLES: &[&str] = &[
    "lecli create log -n new_log_name",
    "lecli create log -f path_to_file.json",
];

const LOGSET_EXAMPLES: &[&str] = &[
    "lecli create logset -n new_logset_name",
    "lecli create logset -f path_to_file.json",
];

const USER_EXAMPLES: &[&str] = &[
    "lecli create user -f John -l Smith -e john.smith@email.com",
    "lecli create user -u 12345678-aaaa-bbbb-1234-1234cb123456",
];

/// Name or JSON file for a new log / logset; the file wins when both are given
#[derive(Args, Debug)]
pub struct NewResourceArgs {
    /// Name of the new resource
    #[arg(short, long)]
    pub name: Option<String>,

    /// Path to a file containing the JSON resource
    #[arg(short = 'f', long)]
    pub filename: Option<PathBuf>,
}

impl NewResourceArgs {
    fn resource(&self) -> Result<Option<NewResource>> {
        if let Some(path) = &self.filename {
            return Ok(Some(NewResource::Params(read_json_file(path)?)));
        }
        Ok(self.name.clone().map(NewResource::Name))
    }
}

#[derive(Args, Debug)]
pub struct NewUserArgs {
    /// First name of the user to add
    #[arg(short = 'f', long)]
    pub first: Option<String>,

    /// Last name of the user to add
    #[arg(short = 'l', long)]
    pub last: Option<String>,

    /// Email address of the user to add
    #[arg(short = 'e', long)]
    pub email: Option<String>,

    /// User key of an existing user to add
    #[arg(short = 'u', long = "userkey")]
    pub user_key: Option<String>,

    /// Add without asking for confirmation
    #[arg(long)]
    pub force: bool,
}

/// Which kind of user addition the flags describe
#[derive(Debug, PartialEq, Eq)]
enum UserAddition {
    New(NewUser),
    Existing(String),
    Invalid,
}

impl NewUserArgs {
    fn addition(&self) -> UserAddition {
        let given = [
            self.first.is_some(),
            self.last.is_some(),
            self.email.is_some(),
            self.user_key.is_some(),
        ];
        if given.iter().all(|g| *g) || !given.iter().any(|g| *g) {
            return UserAddition::Invalid;
        }

        match (&self.first, &self.last, &self.email, &self.user_key) {
            (Some(first), Some(last), Some(email), None) => UserAddition::New(NewUser {
                email: email.clone(),
                first_name: first.clone(),
                last_name: last.clone(),
            }),
            (_, _, _, Some(user_key)) => UserAddition::Existing(user_key.clone()),
            _ => UserAddition::Invalid,
        }
    }
}

#[derive(Args, Debug)]
pub struct NewSavedQueryArgs {
    /// Name of the saved query
    pub name: String,

    /// LEQL statement
    pub statement: String,

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

impl From<NewSavedQueryArgs> for SavedQueryFields {
    fn from(args: NewSavedQueryArgs) -> Self {
        SavedQueryFields {
            name: Some(args.name),
            statement: Some(args.statement),
            from: args.time_from,
            to: args.time_to,
            time_range: args.relative_range,
            logs: args.logs,
        }
    }
}

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum CreateCommand {
    /// Create a log from a name or a JSON file
    Log(NewResourceArgs),
    /// Create a logset from a name or a JSON file
    Logset(NewResourceArgs),
    /// Create a team
    Team { name: String },
    /// Add a new or existing user to the account
    User(NewUserArgs),
    /// Create an API key from a JSON file
    ApiKey { filename: PathBuf },
    /// Create a saved query
    SavedQuery(NewSavedQueryArgs),
}

pub async fn run(client: ApiClient, noun: CreateCommand) -> Result<()> {
    match noun {
        CreateCommand::Log(args) => match args.resource()? {
            Some(resource) => {
                let log = LogService::new(client)
                    .create(resource)
                    .await
                    .context("Create log failed")?;
                render::print_json(&log);
            }
            None => print_examples(LOG_EXAMPLES),
        },
        CreateCommand::Logset(args) => match args.resource()? {
            Some(resource) => {
                let logset = LogsetService::new(client)
                    .create(resource)
                    .await
                    .context("Create logset failed")?;
                render::print_json(&logset);
            }
            None => print_examples(LOGSET_EXAMPLES),
        },
        CreateCommand::Team { name } => {
            let team = TeamService::new(client)
                .create(&name)
                .await
                .context("Create team failed")?;
            println!("{}", format!("✓ Team created with name: {}", name).green().bold());
            render::print_lines(&render::teams_lines(&team));
        }
        CreateCommand::User(args) => create_user(client, args).await?,
        CreateCommand::ApiKey { filename } => {
            let payload = read_json_file(&filename)?;
            let key = ApiKeyService::new(client)
                .create(&payload)
                .await
                .context("Create api key failed")?;
            render::print_json(&key);
        }
        CreateCommand::SavedQuery(args) => {
            let fields = SavedQueryFields::from(args);
            let query = SavedQueryService::new(client)
                .create(&fields)
                .await
                .context("Create saved query failed")?;
            render::print_lines(&render::saved_queries_lines(&query));
        }
    }

    Ok(())
}

async fn create_user(client: ApiClient, args: NewUserArgs) -> Result<()> {
    let users = UserService::new(client);

    let added = match args.addition() {
        UserAddition::New(user) => {
            let prompt = format!(
                "Please confirm you want to add user {} {}",
                user.first_name, user.last_name
            );
            if !args.force && !confirm(&prompt)? {
                return Ok(());
            }
            users.add_new(&user).await.context("Add user failed")?
        }
        UserAddition::Existing(user_key) => {
            let prompt = format!(
                "Please confirm you want to add user with User Key {}",
                user_key
            );
            if !args.force && !confirm(&prompt)? {
                return Ok(());
            }
            users
                .add_existing(&user_key)
                .await
                .context("Add user failed")?
        }
        UserAddition::Invalid => {
            print_examples(USER_EXAMPLES);
            return Ok(());
        }
    };

    render::print_lines(&render::added_user_lines(&added));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_args(first: bool, last: bool, email: bool, user_key: bool) -> NewUserArgs {
        NewUserArgs {
            first: first.then(|| "John".to_string()),
            last: last.then(|| "Smith".to_string()),
            email: email.then(|| "john@example.com".to_string()),
            user_key: user_key.then(|| "u1".to_string()),
            force: false,
        }
    }

    #[test]
    fn test_user_addition_kinds() {
        assert_eq!(
            user_args(true, true, true, false).addition(),
            UserAddition::New(NewUser {
                email: "john@example.com".to_string(),
                first_name: "John".to_string(),
                last_name: "Smith".to_string(),
            })
        );
        assert_eq!(
            user_args(false, false, false, true).addition(),
            UserAddition::Existing("u1".to_string())
        );
        assert_eq!(user_args(false, false, false, false).addition(), UserAddition::Invalid);
        assert_eq!(user_args(true, true, true, true).addition(), UserAddition::Invalid);
        assert_eq!(user_args(true, false, true, false).addition(), UserAddition::Invalid);
    }

    #[test]
    fn test_file_wins_over_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"log": {"name": "from-file"}}"#).unwrap();

        let args = NewResourceArgs {
            name: Some("from-flag".to_string()),
            filename: Some(path),
        };

        match args.resource().unwrap() {
            Some(NewResource::Params(params)) => assert_eq!(params["log"]["name"], "from-file"),
            other => panic!("expected params, got {:?}", other),
        }
    }

    #[test]
    fn test_saved_query_fields() {
        let fields = SavedQueryFields::from(NewSavedQueryArgs {
            name: "errors".to_string(),
            statement: "where(error)".to_string(),
            time_from: None,
            time_to: None,
            relative_range: Some("last 1 day".to_string()),
            logs: Some("a:b".to_string()),
        });

        assert_eq!(fields.name.as_deref(), Some("errors"));
        assert_eq!(fields.time_range.as_deref(), Some("last 1 day"));
        assert_eq!(fields.logs.as_deref(), Some("a:b"));
    }
}
