use super::get::LogArgs;
use super::check_query_options;
use crate::render;
use anyhow::{Context, Result};
use clap::Args;
use lecli_core::application::{ApiClient, QueryService};
use lecli_core::domain::QueryOptions;

const QUERY_EXAMPLES: &[&str] = &[
    "lecli query 12345678-aaaa-bbbb-1234-1234cb123456 -l 'where(method=GET) calculate(count)' -f 1465370400 -t 1465370500",
    "lecli query 12345678-aaaa-bbbb-1234-1234cb123456 -q mysavednick --datefrom '2016-05-18 11:04:00' --dateto '2016-05-18 11:09:59'",
    "lecli query --loggroup myloggroup --leql 'where(method=GET) calculate(count)' --datefrom '2016-05-18 11:04:00' --dateto '2016-05-18 11:09:59'",
    "lecli query --lognick mynicknamedlog --leql 'where(method=GET) calculate(count)' -r 'last 3 days'",
    "lecli query --saved_query 12345678-aaaa-bbbb-1234-1234cb123456 -r 'last 3 days'",
];

#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub logs: LogArgs,

    /// LEQL statement
    #[arg(short = 'l', long)]
    pub leql: Option<String>,

    /// Nickname of a query in the config file
    #[arg(short = 'q', long = "querynick")]
    pub query_nick: Option<String>,

    /// ID of a saved query to run
    #[arg(short = 's', long = "saved_query")]
    pub saved_query: Option<String>,

    /// Time to query from (unix epoch)
    #[arg(short = 'f', long = "timefrom")]
    pub time_from: Option<i64>,

    /// Time to query to (unix epoch)
    #[arg(short = 't', long = "timeto")]
    pub time_to: Option<i64>,

    /// Date/Time to query from (YYYY-MM-DD HH:MM:SS)
    #[arg(long = "datefrom")]
    pub date_from: Option<String>,

    /// Date/Time to query to (YYYY-MM-DD HH:MM:SS)
    #[arg(long = "dateto")]
    pub date_to: Option<String>,

    /// Relative range until now, e.g. "last 10 min" or "yesterday"
    #[arg(short = 'r', long = "relative_range")]
    pub relative_range: Option<String>,
}

impl From<QueryArgs> for QueryOptions {
    fn from(args: QueryArgs) -> Self {
        QueryOptions {
            log_keys: args.logs.log_keys,
            log_nick: args.logs.log_nick,
            log_group: args.logs.log_group,
            leql: args.leql,
            query_nick: args.query_nick,
            saved_query_id: args.saved_query,
            time_from: args.time_from,
            time_to: args.time_to,
            date_from: args.date_from,
            date_to: args.date_to,
            relative_range: args.relative_range,
        }
    }
}

pub async fn run(client: ApiClient, args: QueryArgs) -> Result<()> {
    let options = QueryOptions::from(args);
    if !check_query_options(&options, QUERY_EXAMPLES)? {
        return Ok(());
    }

    let mut observer = render::TerminalObserver::with_progress();
    QueryService::new(client)
        .query(options, &mut observer)
        .await
        .context("Query failed")
}
