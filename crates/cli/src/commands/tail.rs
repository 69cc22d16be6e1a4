use super::get::LogArgs;
use super::print_examples;
use crate::render;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use lecli_core::application::{ApiClient, QueryService, TailOptions};
use std::time::Duration;

const TAIL_EXAMPLES: &[&str] = &[
    "lecli tail events 12345678-aaaa-bbbb-1234-1234cb123456",
    "lecli tail events -n mynicknamedlog -l 'where(method=GET)' -i 2.5",
    "lecli tail events -s 12345678-aaaa-bbbb-1234-1234cb123456",
];

#[derive(Args, Debug)]
pub struct TailArgs {
    #[command(flatten)]
    pub logs: LogArgs,

    /// LEQL statement to filter events
    #[arg(short = 'l', long)]
    pub leql: Option<String>,

    /// Seconds between live tail requests
    #[arg(short = 'i', long = "poll_interval", default_value_t = 1.0)]
    pub poll_interval: f64,

    /// ID of a saved query to tail
    #[arg(short = 's', long = "saved_query")]
    pub saved_query: Option<String>,
}

impl TailArgs {
    fn options(self) -> Result<TailOptions> {
        let poll_interval = match Duration::try_from_secs_f64(self.poll_interval) {
            Ok(interval) => interval,
            Err(_) => bail!(
                "Poll interval must be a non-negative number of seconds, got {}",
                self.poll_interval
            ),
        };

        Ok(TailOptions {
            logs: self.logs.selection(),
            leql: self.leql,
            poll_interval,
            saved_query_id: self.saved_query,
            ..TailOptions::default()
        })
    }
}

#[derive(Subcommand)]
#[command(rename_all = "lower")]
pub enum TailCommand {
    /// Tail events of the given logs
    Events(TailArgs),
}

pub async fn run(client: ApiClient, noun: TailCommand) -> Result<()> {
    let TailCommand::Events(args) = noun;

    if args.logs.is_empty() && args.saved_query.is_none() {
        print_examples(TAIL_EXAMPLES);
        return Ok(());
    }

    let options = args.options()?;
    let mut observer = render::TerminalObserver::pages_only();
    QueryService::new(client)
        .tail(options, &mut observer)
        .await
        .context("Live tail failed")
}
