use super::{check_query_options, print_examples};
use crate::render;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use lecli_core::application::{
    ApiClient, ApiKeyService, LogSelection, LogService, LogsetService, QueryService, RecentWindow,
    SavedQueryService, TeamService, UsageService, UserService, DEFAULT_RECENT_SECONDS,
};
use lecli_core::domain::QueryOptions;
use serde_json::Value;

const EVENTS_EXAMPLES: &[&str] = &[
    "lecli get events 12345678-aaaa-bbbb-1234-1234cb123456 -f 1465370400 -t 1465370500",
    "lecli get events 12345678-aaaa-bbbb-1234-1234cb123456 --datefrom '2016-05-18 11:04:00' --dateto '2016-05-18 11:09:59'",
    "lecli get events --loggroup myloggroup --datefrom '2016-05-18 11:04:00' --dateto '2016-05-18 11:09:59'",
    "lecli get events --lognick mynicknamedlog --datefrom '2016-05-18 11:04:00' --dateto '2016-05-18 11:09:59'",
    "lecli get events --lognick mynicknamedlog -r 'last 3 hours'",
];

const RECENT_EVENTS_EXAMPLES: &[&str] = &[
    "lecli get recentevents 12345678-aaaa-bbbb-1234-1234cb123456 -l 200",
    "lecli get recentevents -n mynicknamedlog -l 200",
    "lecli get recentevents -g myloggroup -l 200",
    "lecli get recentevents -g myloggroup -r 'last 50 mins'",
];

const USAGE_EXAMPLES: &[&str] = &["lecli get usage -s '2016-01-01' -e '2016-06-01'"];

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum GetCommand {
    /// All logs of the account
    Logs,
    /// A single log
    Log { log_id: String },
    /// All logsets of the account
    Logsets,
    /// A single logset
    Logset { logset_id: String },
    /// All teams of the account
    Teams,
    /// A single team
    Team { team_id: String },
    /// Users of the account
    Users,
    /// Owner of the account
    Owner,
    /// API keys of the account
    ApiKeys {
        /// Only owner API keys
        #[arg(long)]
        owner: bool,
    },
    /// A single API key
    ApiKey { api_key_id: String },
    /// All saved queries
    SavedQueries,
    /// A single saved query
    SavedQuery { query_id: String },
    /// Account usage between two dates
    Usage {
        /// Start date (YYYY-MM-DD)
        #[arg(short, long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(short, long)]
        end: Option<String>,
    },
    /// Log events within a time range
    Events(EventsArgs),
    /// Log events leading up to now
    RecentEvents(RecentEventsArgs),
}

/// Log selection shared by the event commands
#[derive(Args, Debug, Clone, Default)]
pub struct LogArgs {
    /// Log keys
    pub log_keys: Vec<String>,

    /// Nickname of a log in the config file
    #[arg(short = 'n', long = "lognick")]
    pub log_nick: Option<String>,

    /// Name of a log group in the config file
    #[arg(short = 'g', long = "loggroup")]
    pub log_group: Option<String>,
}

impl LogArgs {
    pub fn is_empty(&self) -> bool {
        self.log_keys.is_empty() && self.log_nick.is_none() && self.log_group.is_none()
    }

    pub fn selection(self) -> LogSelection {
        LogSelection {
            log_keys: self.log_keys,
            log_nick: self.log_nick,
            log_group: self.log_group,
        }
    }
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    #[command(flatten)]
    pub logs: LogArgs,

    /// Time to get events from (unix epoch)
    #[arg(short = 'f', long = "timefrom")]
    pub time_from: Option<i64>,

    /// Time to get events to (unix epoch)
    #[arg(short = 't', long = "timeto")]
    pub time_to: Option<i64>,

    /// Date/Time to get events from (YYYY-MM-DD HH:MM:SS)
    #[arg(long = "datefrom")]
    pub date_from: Option<String>,

    /// Date/Time to get events to (YYYY-MM-DD HH:MM:SS)
    #[arg(long = "dateto")]
    pub date_to: Option<String>,

    /// Relative range until now, e.g. "last 2 hours"
    #[arg(short = 'r', long = "relative_range")]
    pub relative_range: Option<String>,
}

impl EventsArgs {
    fn options(&self) -> QueryOptions {
        QueryOptions {
            log_keys: self.logs.log_keys.clone(),
            log_nick: self.logs.log_nick.clone(),
            log_group: self.logs.log_group.clone(),
            time_from: self.time_from,
            time_to: self.time_to,
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            relative_range: self.relative_range.clone(),
            ..QueryOptions::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct RecentEventsArgs {
    #[command(flatten)]
    pub logs: LogArgs,

    /// Seconds before now to return events for
    #[arg(short = 'l', long, default_value_t = DEFAULT_RECENT_SECONDS)]
    pub last: i64,

    /// Relative range until now, e.g. "last 50 mins"
    #[arg(short = 'r', long = "relative_range")]
    pub relative_range: Option<String>,
}

impl RecentEventsArgs {
    fn window(&self) -> RecentWindow {
        match &self.relative_range {
            Some(range) => RecentWindow::Relative(range.clone()),
            None => RecentWindow::LastSeconds(self.last),
        }
    }
}

pub async fn run(client: ApiClient, noun: GetCommand) -> Result<()> {
    match noun {
        GetCommand::Logs => {
            let logs = LogService::new(client).list().await.context("Get logs failed")?;
            render::print_json(&logs);
        }
        GetCommand::Log { log_id } => {
            let log = LogService::new(client)
                .get(&log_id)
                .await
                .context("Get log failed")?;
            render::print_json(&log);
        }
        GetCommand::Logsets => {
            let logsets = LogsetService::new(client)
                .list()
                .await
                .context("Get logsets failed")?;
            render::print_json(&logsets);
        }
        GetCommand::Logset { logset_id } => {
            let logset = LogsetService::new(client)
                .get(&logset_id)
                .await
                .context("Get logset failed")?;
            render::print_json(&logset);
        }
        GetCommand::Teams => {
            let teams = TeamService::new(client)
                .list()
                .await
                .context("Get teams failed")?;
            render::print_lines(&render::teams_lines(&teams));
        }
        GetCommand::Team { team_id } => {
            let team = TeamService::new(client)
                .get(&team_id)
                .await
                .context("Get team failed")?;
            render::print_lines(&render::teams_lines(&team));
        }
        GetCommand::Users => {
            let users = UserService::new(client)
                .list()
                .await
                .context("Get users failed")?;
            print_users(&users);
        }
        GetCommand::Owner => {
            let owner = UserService::new(client)
                .owner()
                .await
                .context("Get owner failed")?;
            print_users(&owner);
        }
        GetCommand::ApiKeys { owner } => {
            let keys = ApiKeyService::new(client)
                .list(owner)
                .await
                .context("Get api keys failed")?;
            render::print_json(&keys);
        }
        GetCommand::ApiKey { api_key_id } => {
            let key = ApiKeyService::new(client)
                .get(&api_key_id)
                .await
                .context("Get api key failed")?;
            render::print_json(&key);
        }
        GetCommand::SavedQueries => {
            let queries = SavedQueryService::new(client)
                .list()
                .await
                .context("Get saved queries failed")?;
            render::print_lines(&render::saved_queries_lines(&queries));
        }
        GetCommand::SavedQuery { query_id } => {
            let query = SavedQueryService::new(client)
                .get(&query_id)
                .await
                .context("Get saved query failed")?;
            render::print_lines(&render::saved_queries_lines(&query));
        }
        GetCommand::Usage { start, end } => match (start, end) {
            (Some(start), Some(end)) => {
                let usage = UsageService::new(client)
                    .get(&start, &end)
                    .await
                    .context("Get usage failed")?;
                render::print_lines(&render::usage_lines(&usage));
            }
            _ => {
                print_examples(USAGE_EXAMPLES);
                println!("Note: Start and end dates should be in ISO-8601 format: YYYY-MM-DD");
            }
        },
        GetCommand::Events(args) => events(client, args).await?,
        GetCommand::RecentEvents(args) => recent_events(client, args).await?,
    }

    Ok(())
}

fn print_users(body: &Value) {
    match render::users_table(body) {
        Some(table) => println!("{}", table),
        None => render::print_json(body),
    }
}

async fn events(client: ApiClient, args: EventsArgs) -> Result<()> {
    let options = args.options();
    if !check_query_options(&options, EVENTS_EXAMPLES)? {
        return Ok(());
    }
    let Some(range) = options.time_range()? else {
        print_examples(EVENTS_EXAMPLES);
        return Ok(());
    };

    let mut observer = render::TerminalObserver::with_progress();
    QueryService::new(client)
        .events(args.logs.selection(), range, &mut observer)
        .await
        .context("Get events failed")
}

async fn recent_events(client: ApiClient, args: RecentEventsArgs) -> Result<()> {
    if args.logs.is_empty() {
        print_examples(RECENT_EVENTS_EXAMPLES);
        return Ok(());
    }

    let window = args.window();
    let mut observer = render::TerminalObserver::with_progress();
    QueryService::new(client)
        .recent_events(args.logs.selection(), window, &mut observer)
        .await
        .context("Get recent events failed")
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Commands};
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> GetCommand {
        let mut argv = vec!["lecli", "get"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Get { noun } => noun,
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_lowercase_nouns() {
        assert!(matches!(parse(&["apikeys", "--owner"]), GetCommand::ApiKeys { owner: true }));
        assert!(matches!(parse(&["savedqueries"]), GetCommand::SavedQueries));
        assert!(matches!(parse(&["owner"]), GetCommand::Owner));
    }

    #[test]
    fn test_events_arguments() {
        match parse(&["events", "k1", "k2", "-f", "1465370400", "-t", "1465370500"]) {
            GetCommand::Events(args) => {
                let options = args.options();
                assert_eq!(options.log_keys, vec!["k1", "k2"]);
                assert_eq!(options.time_from, Some(1_465_370_400));
                assert!(options.validate().is_ok());
            }
            _ => panic!("expected events"),
        }
    }

    #[test]
    fn test_recent_events_window() {
        match parse(&["recentevents", "-n", "web"]) {
            GetCommand::RecentEvents(args) => {
                assert_eq!(args.window(), RecentWindow::LastSeconds(1200));
                assert_eq!(args.logs.log_nick.as_deref(), Some("web"));
            }
            _ => panic!("expected recentevents"),
        }

        match parse(&["recentevents", "k1", "-r", "last 50 mins"]) {
            GetCommand::RecentEvents(args) => {
                assert_eq!(args.window(), RecentWindow::Relative("last 50 mins".to_string()));
            }
            _ => panic!("expected recentevents"),
        }
    }

    #[test]
    fn test_usage_dates() {
        match parse(&["usage", "-s", "2016-01-01", "-e", "2016-06-01"]) {
            GetCommand::Usage { start, end } => {
                assert_eq!(start.as_deref(), Some("2016-01-01"));
                assert_eq!(end.as_deref(), Some("2016-06-01"));
            }
            _ => panic!("expected usage"),
        }
    }
}
